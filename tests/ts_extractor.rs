//! End-to-end coverage of the MPEG-2 Transport Stream pipeline, driven
//! entirely through `demux_core::ts`'s public surface: PAT/PMT discovery,
//! multiple interleaved elementary streams, and `reset`.

use demux_core::error::Result;
use demux_core::input::NonBlockingInput;
use demux_core::sample::SampleFlags;
use demux_core::ts::{ReadFlags, SampleHolder, TsExtractor};
use pretty_assertions::assert_eq;

struct VecInput {
    data: Vec<u8>,
    pos: usize,
}

impl NonBlockingInput for VecInput {
    fn available_byte_count(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_into(&mut self, dst: &mut demux_core::bitcursor::BitCursor, n_bytes: usize) -> Result<usize> {
        let n = n_bytes.min(self.data.len() - self.pos);
        dst.extend(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

const STREAM_TYPE_H264: u8 = 0x1B;
const STREAM_TYPE_AAC: u8 = 0x0F;
const PID_PMT: u16 = 0x100;
const PID_VIDEO: u16 = 0x101;
const PID_AUDIO: u16 = 0x102;

fn ts_packet(pid: u16, payload_unit_start: bool, payload: &[u8]) -> Vec<u8> {
    let mut p = vec![0u8; 188];
    p[0] = 0x47;
    p[1] = (if payload_unit_start { 0x40 } else { 0 }) | (((pid >> 8) as u8) & 0x1F);
    p[2] = pid as u8;
    p[3] = 0x10;
    let n = payload.len().min(p.len() - 4);
    p[4..4 + n].copy_from_slice(&payload[..n]);
    p
}

fn pat_section(pmt_pid: u16) -> Vec<u8> {
    let mut out = vec![0u8, 0x00];
    let section_length: u16 = 13;
    out.push(0x80 | ((section_length >> 8) as u8));
    out.push(section_length as u8);
    out.extend_from_slice(&[0x00, 0x01, 0xC1, 0x00, 0x00, 0x00, 0x01]);
    out.push(0xE0 | ((pmt_pid >> 8) as u8));
    out.push(pmt_pid as u8);
    out.extend_from_slice(&[0, 0, 0, 0]);
    out
}

fn pmt_section(entries: &[(u8, u16)]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&[0x00, 0x01, 0xC1, 0x00, 0x00, 0xE1, 0x00, 0xF0, 0x00]);
    for (stream_type, pid) in entries {
        body.push(*stream_type);
        body.push(0xE0 | ((pid >> 8) as u8));
        body.push(*pid as u8);
        body.extend_from_slice(&[0xF0, 0x00]);
    }
    let section_length = (body.len() + 4) as u16;
    let mut out = vec![0u8, 0x02];
    out.push(0x80 | ((section_length >> 8) as u8));
    out.push(section_length as u8);
    out.extend_from_slice(&body);
    out.extend_from_slice(&[0, 0, 0, 0]);
    out
}

fn pes_packet(pts: Option<i64>, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0x00, 0x00, 0x01, 0xE0];
    let mut optional = Vec::new();
    let flags = if let Some(pts) = pts {
        optional.push(0x21 | (((pts >> 29) & 0x0E) as u8));
        optional.push(((pts >> 22) & 0xFF) as u8);
        optional.push((((pts >> 14) & 0xFE) as u8) | 0x01);
        optional.push(((pts >> 7) & 0xFF) as u8);
        optional.push((((pts << 1) & 0xFE) as u8) | 0x01);
        0x80
    } else {
        0x00
    };
    let packet_length = (3 + optional.len() + payload.len()) as u16;
    out.extend_from_slice(&packet_length.to_be_bytes());
    out.push(0x80);
    out.push(flags);
    out.push(optional.len() as u8);
    out.extend_from_slice(&optional);
    out.extend_from_slice(payload);
    out
}

/// Minimal MSB-first bit writer, mirroring the one the AAC reader's own
/// unit tests use to build exact ADTS headers without hand-computing
/// byte-level bit overlaps.
struct BitWriter {
    bytes: Vec<u8>,
    acc: u32,
    nbits: u32,
}

impl BitWriter {
    fn new() -> Self {
        Self { bytes: Vec::new(), acc: 0, nbits: 0 }
    }

    fn write(&mut self, value: u32, bits: u32) {
        self.acc = (self.acc << bits) | (value & ((1 << bits) - 1));
        self.nbits += bits;
        while self.nbits >= 8 {
            let shift = self.nbits - 8;
            self.bytes.push(((self.acc >> shift) & 0xFF) as u8);
            self.nbits -= 8;
            self.acc &= (1 << self.nbits) - 1;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            let pad = 8 - self.nbits;
            self.acc <<= pad;
            self.bytes.push((self.acc & 0xFF) as u8);
        }
        self.bytes
    }
}

/// Builds one ADTS frame (44.1kHz stereo) wrapping `payload_len` bytes of
/// filler, matching the wire format the AAC elementary reader expects.
fn adts_frame(payload_len: usize) -> Vec<u8> {
    let frame_size = (7 + payload_len) as u32;
    let mut w = BitWriter::new();
    w.write(0xFFF, 12); // sync word
    w.write(0, 1); // id
    w.write(0, 2); // layer
    w.write(1, 1); // protection_absent (no CRC)
    w.write(1, 2); // profile (object_type - 1)
    w.write(4, 4); // sample_rate_index -> 44100
    w.write(0, 1); // private_bit
    w.write(2, 3); // channel_config -> stereo
    w.write(0, 1); // original_copy
    w.write(0, 1); // home
    w.write(0, 1); // copyright_id_bit
    w.write(0, 1); // copyright_id_start
    w.write(frame_size, 13);
    w.write(0x7FF, 11); // buffer_fullness
    w.write(0, 2); // number_of_raw_data_blocks_in_frame
    let mut out = w.finish();
    out.extend(std::iter::repeat(0xAB).take(payload_len));
    out
}

#[test]
fn discovers_and_interleaves_video_and_audio_tracks() {
    let mut extractor = TsExtractor::new();

    let mut data = Vec::new();
    data.extend(ts_packet(0x0000, true, &pat_section(PID_PMT)));
    data.extend(ts_packet(
        PID_PMT,
        true,
        &pmt_section(&[(STREAM_TYPE_H264, PID_VIDEO), (STREAM_TYPE_AAC, PID_AUDIO)]),
    ));

    let mut h264_payload = vec![0x00, 0x00, 0x01, 0x09, 0xF0]; // AUD
    h264_payload.extend(&[0x00, 0x00, 0x01, 0x05, 0xAA]); // IDR slice
    data.extend(ts_packet(PID_VIDEO, true, &pes_packet(Some(90_000), &h264_payload)));
    // second AUD flushes the first video sample.
    data.extend(ts_packet(
        PID_VIDEO,
        true,
        &pes_packet(Some(180_000), &vec![0x00, 0x00, 0x01, 0x09, 0xF0]),
    ));

    data.extend(ts_packet(PID_AUDIO, true, &pes_packet(Some(90_000), &adts_frame(64))));

    let mut input = VecInput { data, pos: 0 };
    assert!(extractor.prepare(&mut input));
    assert_eq!(extractor.track_count(), 2);

    let mut video_holder = SampleHolder::new();
    let video_flags = extractor.read(&mut input, 0, &mut video_holder).unwrap();
    assert!(video_flags.contains(ReadFlags::READ_SAMPLE));
    assert_eq!(video_holder.time_us, 1_000_000);
    assert!(video_holder.flags.contains(SampleFlags::SYNC));

    let mut audio_holder = SampleHolder::new();
    let audio_flags = extractor.read(&mut input, 1, &mut audio_holder).unwrap();
    assert!(audio_flags.contains(ReadFlags::READ_SAMPLE));
    assert_eq!(audio_holder.size, 64);
    assert_eq!(audio_holder.time_us, 1_000_000);
}

#[test]
fn unknown_track_index_requests_sample_holder() {
    let mut extractor = TsExtractor::new();
    let mut input = VecInput { data: Vec::new(), pos: 0 };
    let mut holder = SampleHolder::new();
    let flags = extractor.read(&mut input, 3, &mut holder).unwrap();
    assert_eq!(flags, ReadFlags::NEED_SAMPLE_HOLDER);
}

#[test]
fn reset_drops_discovered_tracks_and_reuses_pat_pid() {
    let mut extractor = TsExtractor::new();
    let mut data = Vec::new();
    data.extend(ts_packet(0x0000, true, &pat_section(PID_PMT)));
    data.extend(ts_packet(
        PID_PMT,
        true,
        &pmt_section(&[(STREAM_TYPE_H264, PID_VIDEO)]),
    ));
    let mut input = VecInput { data, pos: 0 };
    assert!(extractor.prepare(&mut input));
    assert_eq!(extractor.track_count(), 1);

    extractor.reset();
    assert_eq!(extractor.track_count(), 0);

    // Same PAT PID works again after reset.
    let mut data = Vec::new();
    data.extend(ts_packet(0x0000, true, &pat_section(PID_PMT)));
    data.extend(ts_packet(
        PID_PMT,
        true,
        &pmt_section(&[(STREAM_TYPE_AAC, PID_AUDIO)]),
    ));
    let mut input = VecInput { data, pos: 0 };
    assert!(extractor.prepare(&mut input));
    assert_eq!(extractor.track_count(), 1);
}
