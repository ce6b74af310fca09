//! End-to-end coverage of the WebM/Matroska pipeline, driven entirely
//! through `demux_core::webm`'s public surface and element ID table:
//! dual audio/video track discovery (including the first-wins policy
//! for a duplicate track of the same type) and content-encryption DRM
//! init data delivery.

use std::collections::HashMap;

use demux_core::error::{ExtractorError, Result};
use demux_core::input::{ExtractorInput, ExtractorOutput, PositionHolder, ReadResult, TrackOutput};
use demux_core::media::MediaFormat;
use demux_core::sample::SampleFlags;
use demux_core::webm::{ids, ChunkIndex, WebmExtractor};
use pretty_assertions::assert_eq;

struct SeekableInput {
    data: Vec<u8>,
    pos: usize,
}

impl SeekableInput {
    fn new(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    fn seek_to(&mut self, pos: u64) {
        self.pos = pos as usize;
    }
}

impl ExtractorInput for SeekableInput {
    fn read_fully(&mut self, buf: &mut [u8], offset: usize, len: usize) -> Result<()> {
        if self.pos + len > self.data.len() {
            return Err(ExtractorError::NeedMoreData);
        }
        buf[offset..offset + len].copy_from_slice(&self.data[self.pos..self.pos + len]);
        self.pos += len;
        Ok(())
    }

    fn skip_fully(&mut self, len: u64) -> Result<()> {
        let len = len as usize;
        if self.pos + len > self.data.len() {
            return Err(ExtractorError::NeedMoreData);
        }
        self.pos += len;
        Ok(())
    }

    fn get_position(&self) -> u64 {
        self.pos as u64
    }
}

#[derive(Default)]
struct RecordingTrack {
    formats: Vec<MediaFormat>,
    data: Vec<u8>,
    samples: Vec<(i64, SampleFlags, u32)>,
}

impl TrackOutput for RecordingTrack {
    fn format(&mut self, format: &MediaFormat) {
        self.formats.push(format.clone());
    }

    fn sample_data(&mut self, src: &mut dyn ExtractorInput, len: usize) -> Result<()> {
        let mut buf = vec![0u8; len];
        src.read_fully(&mut buf, 0, len)?;
        self.data.extend(buf);
        Ok(())
    }

    fn sample_metadata(
        &mut self,
        time_us: i64,
        flags: SampleFlags,
        size: u32,
        _offset: u32,
        _encryption_key_id: Option<&[u8]>,
    ) {
        self.samples.push((time_us, flags, size));
    }
}

#[derive(Default)]
struct RecordingOutput {
    tracks: HashMap<i32, RecordingTrack>,
    end_tracks_calls: u32,
    seek_maps: Vec<ChunkIndex>,
    drm_calls: Vec<(String, Vec<u8>)>,
}

impl ExtractorOutput for RecordingOutput {
    type Track = RecordingTrack;

    fn track(&mut self, track_number: i32) -> &mut RecordingTrack {
        self.tracks.entry(track_number).or_default()
    }

    fn end_tracks(&mut self) {
        self.end_tracks_calls += 1;
    }

    fn seek_map(&mut self, index: ChunkIndex) {
        self.seek_maps.push(index);
    }

    fn drm_init_data(&mut self, scheme_type: &str, key_id: &[u8]) {
        self.drm_calls.push((scheme_type.to_string(), key_id.to_vec()));
    }
}

fn ebml_header(doc_type: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend(elem(ids::EBML_READ_VERSION, &[1]));
    body.extend(elem(ids::DOC_TYPE_READ_VERSION, &[1]));
    let mut doc_type_bytes = vec![0x42, 0x82];
    doc_type_bytes.push(0x80 | doc_type.len() as u8);
    doc_type_bytes.extend_from_slice(doc_type.as_bytes());
    body.extend(doc_type_bytes);

    let mut out = id_bytes(ids::EBML);
    out.extend(size_bytes(body.len() as u64));
    out.extend(body);
    out
}

fn id_bytes(id: u32) -> Vec<u8> {
    if id <= 0xFF {
        vec![id as u8]
    } else if id <= 0xFFFF {
        vec![(id >> 8) as u8, id as u8]
    } else if id <= 0xFF_FFFF {
        vec![(id >> 16) as u8, (id >> 8) as u8, id as u8]
    } else {
        vec![(id >> 24) as u8, (id >> 16) as u8, (id >> 8) as u8, id as u8]
    }
}

fn size_bytes(size: u64) -> Vec<u8> {
    assert!(size < 0x4000, "test helper only supports 2-byte sizes");
    let marker = 0x4000u64 | size;
    vec![(marker >> 8) as u8, marker as u8]
}

fn elem(id: u32, content: &[u8]) -> Vec<u8> {
    let mut out = id_bytes(id);
    out.extend(size_bytes(content.len() as u64));
    out.extend_from_slice(content);
    out
}

fn uint_bytes(value: u64) -> Vec<u8> {
    let mut bytes = value.to_be_bytes().to_vec();
    while bytes.len() > 1 && bytes[0] == 0 {
        bytes.remove(0);
    }
    bytes
}

fn master(id: u32, body: Vec<u8>) -> Vec<u8> {
    let mut out = id_bytes(id);
    out.extend(size_bytes(body.len() as u64));
    out.extend(body);
    out
}

fn codec_id_elem(codec_id: &str) -> Vec<u8> {
    let mut out = id_bytes(ids::CODEC_ID);
    out.extend(size_bytes(codec_id.len() as u64));
    out.extend_from_slice(codec_id.as_bytes());
    out
}

fn track_entry(number: u64, track_type: u64, codec_id: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend(elem(ids::TRACK_NUMBER, &uint_bytes(number)));
    body.extend(elem(ids::TRACK_TYPE, &uint_bytes(track_type)));
    body.extend(codec_id_elem(codec_id));
    master(ids::TRACK_ENTRY, body)
}

/// A video `TrackEntry` carrying a `ContentEncodings` -> `ContentEncoding`
/// -> `ContentEncryption` chain with a key ID, per the DRM validation
/// rules (order=0, scope=1, type=1, algo=5/AES, cipher_mode=1/CTR).
fn encrypted_track_entry(number: u64, codec_id: &str, key_id: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend(elem(ids::TRACK_NUMBER, &uint_bytes(number)));
    body.extend(elem(ids::TRACK_TYPE, &uint_bytes(1)));
    body.extend(codec_id_elem(codec_id));

    let aes_settings = master(ids::CONTENT_ENC_AES_SETTINGS, elem(ids::AES_SETTINGS_CIPHER_MODE, &uint_bytes(1)));
    let mut encryption_body = Vec::new();
    encryption_body.extend(elem(ids::CONTENT_ENC_ALGO, &uint_bytes(5)));
    encryption_body.extend(elem(ids::CONTENT_ENC_KEY_ID, key_id));
    encryption_body.extend(aes_settings);
    let encryption = master(ids::CONTENT_ENCRYPTION, encryption_body);

    let mut encoding_body = Vec::new();
    encoding_body.extend(elem(ids::CONTENT_ENCODING_ORDER, &uint_bytes(0)));
    encoding_body.extend(elem(ids::CONTENT_ENCODING_SCOPE, &uint_bytes(1)));
    encoding_body.extend(elem(ids::CONTENT_ENCODING_TYPE, &uint_bytes(1)));
    encoding_body.extend(encryption);
    let encoding = master(ids::CONTENT_ENCODING, encoding_body);

    body.extend(master(ids::CONTENT_ENCODINGS, encoding));
    master(ids::TRACK_ENTRY, body)
}

fn simple_block(track_number: u8, timecode: i16, flags: u8, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![0x80 | track_number];
    body.extend(timecode.to_be_bytes());
    body.push(flags);
    body.extend_from_slice(payload);
    master(ids::SIMPLE_BLOCK, body)
}

fn drive(extractor: &mut WebmExtractor<RecordingOutput>, input: &mut SeekableInput) {
    let mut seek_pos = PositionHolder::default();
    loop {
        match extractor.read(input, &mut seek_pos).unwrap() {
            ReadResult::EndOfInput => break,
            ReadResult::Seek => input.seek_to(seek_pos.position),
            ReadResult::Continue => {}
        }
    }
}

#[test]
fn keeps_first_video_track_and_skips_duplicate() {
    let mut tracks_body = Vec::new();
    tracks_body.extend(track_entry(1, 1, "V_VP9"));
    tracks_body.extend(track_entry(2, 1, "V_MPEG4/ISO/AVC")); // duplicate video, dropped
    tracks_body.extend(track_entry(3, 2, "A_OPUS"));
    let tracks = master(ids::TRACKS, tracks_body);

    let mut cluster_body = Vec::new();
    cluster_body.extend(elem(ids::TIMECODE, &uint_bytes(0)));
    cluster_body.extend(simple_block(1, 0, 0x80, &[0x11, 0x22]));
    cluster_body.extend(simple_block(3, 5, 0x80, &[0x33]));
    let cluster = master(ids::CLUSTER, cluster_body);

    let mut segment_body = Vec::new();
    segment_body.extend(tracks);
    segment_body.extend(cluster);
    let segment = master(ids::SEGMENT, segment_body);

    let mut data = ebml_header("webm");
    data.extend(segment);

    let mut extractor = WebmExtractor::new(RecordingOutput::default());
    let mut input = SeekableInput::new(data);
    drive(&mut extractor, &mut input);

    // The second video TrackEntry (number 2) never reaches `format`/
    // `sample_metadata`: only tracks 1 (first video) and 3 (first audio)
    // were ever registered as sinks.
    assert_eq!(extractor_output(&extractor).tracks.len(), 2);
    assert!(extractor_output(&extractor).tracks.contains_key(&1));
    assert!(extractor_output(&extractor).tracks.contains_key(&3));
    assert!(!extractor_output(&extractor).tracks.contains_key(&2));

    let video = &extractor_output(&extractor).tracks[&1];
    assert_eq!(video.formats[0].codec_id, "V_VP9");
    assert_eq!(video.samples.len(), 1);

    let audio = &extractor_output(&extractor).tracks[&3];
    assert_eq!(audio.formats[0].codec_id, "A_OPUS");
    assert_eq!(audio.samples.len(), 1);

    assert_eq!(extractor_output(&extractor).end_tracks_calls, 1);
}

#[test]
fn delivers_drm_init_data_once_for_encrypted_track() {
    let key_id = vec![0xDE, 0xAD, 0xBE, 0xEF];
    let tracks = master(ids::TRACKS, encrypted_track_entry(7, "V_VP9", &key_id));

    // Payload is just the content-encryption signal byte (bit 0 set means
    // "encrypted", extension bit clear): with no ciphertext following it
    // the sample carries zero plaintext bytes, which is fine here since
    // this test only asserts the DRM init-data delivery, not sample data.
    let mut cluster_body = Vec::new();
    cluster_body.extend(elem(ids::TIMECODE, &uint_bytes(0)));
    cluster_body.extend(simple_block(7, 0, 0x80, &[0x01]));
    let cluster = master(ids::CLUSTER, cluster_body);

    let mut segment_body = Vec::new();
    segment_body.extend(tracks);
    segment_body.extend(cluster);
    let segment = master(ids::SEGMENT, segment_body);

    let mut data = ebml_header("webm");
    data.extend(segment);

    let mut extractor = WebmExtractor::new(RecordingOutput::default());
    let mut input = SeekableInput::new(data);
    drive(&mut extractor, &mut input);

    assert_eq!(extractor_output(&extractor).drm_calls.len(), 1);
    assert_eq!(extractor_output(&extractor).drm_calls[0].1, key_id);
}

#[test]
fn rejects_encryption_missing_ctr_cipher_mode() {
    let mut body = Vec::new();
    body.extend(elem(ids::TRACK_NUMBER, &uint_bytes(7)));
    body.extend(elem(ids::TRACK_TYPE, &uint_bytes(1)));
    body.extend(codec_id_elem("V_VP9"));

    let mut encryption_body = Vec::new();
    encryption_body.extend(elem(ids::CONTENT_ENC_ALGO, &uint_bytes(5)));
    encryption_body.extend(elem(ids::CONTENT_ENC_KEY_ID, &[0xAA]));
    // No ContentEncAESSettings/AESSettingsCipherMode at all.
    let encryption = master(ids::CONTENT_ENCRYPTION, encryption_body);

    let mut encoding_body = Vec::new();
    encoding_body.extend(elem(ids::CONTENT_ENCODING_ORDER, &uint_bytes(0)));
    encoding_body.extend(elem(ids::CONTENT_ENCODING_SCOPE, &uint_bytes(1)));
    encoding_body.extend(elem(ids::CONTENT_ENCODING_TYPE, &uint_bytes(1)));
    encoding_body.extend(encryption);
    let encoding = master(ids::CONTENT_ENCODING, encoding_body);
    body.extend(master(ids::CONTENT_ENCODINGS, encoding));
    let tracks = master(ids::TRACKS, master(ids::TRACK_ENTRY, body));

    let segment = master(ids::SEGMENT, tracks);
    let mut data = ebml_header("webm");
    data.extend(segment);

    let mut extractor = WebmExtractor::new(RecordingOutput::default());
    let mut input = SeekableInput::new(data);
    let mut seek_pos = PositionHolder::default();
    let err = extractor.read(&mut input, &mut seek_pos).unwrap_err();
    assert!(matches!(err, ExtractorError::Unsupported(_)));
}

fn extractor_output(extractor: &WebmExtractor<RecordingOutput>) -> &RecordingOutput {
    extractor.output()
}
