//! # WebM Extractor — State Machine & Public Surface
//!
//! Implements spec.md §4.9 (the per-element policy table), §4.10/§4.11
//! (block/lacing and sample payload writing, delegated to
//! [`crate::webm::block`]), and the public `init`/`seek`/`read` surface from
//! §6. [`WebmExtractor`] is an [`EbmlProcessor`]; [`crate::webm::ebml::EbmlReader`]
//! drives it one element at a time, and this module turns those typed
//! callbacks into track discovery, the `Cues` seek index, and laced sample
//! output — without ever building a DOM of the document.
//!
//! The one piece of control flow that doesn't fit a single linear pass is
//! the `Cues` seek loop (§4.9's "Seek controller"): `Cues` is usually placed
//! after the `Cluster`s it indexes, but a `SeekHead` entry earlier in the
//! stream names its byte position. The first time a `Cluster` is seen with
//! `Cues` not yet built, [`WebmExtractor::read`] asks the caller to jump
//! there, parses `Cues` to completion, then asks the caller to jump back to
//! resume the cluster it interrupted — at most once each, per §8's
//! "Seek loop termination" property.

use crate::error::{ExtractorError, Result};
use crate::input::{ExtractorInput, ExtractorOutput, PositionHolder, ReadResult, TrackOutput};
use crate::media::{MediaFormat, TrackType};
use crate::sample::SampleFlags;
use crate::webm::block::{BlockHeader, BlockHeaderParser, SamplePayloadWriter};
use crate::webm::cues::CuesBuilder;
use crate::webm::ebml::{EbmlProcessor, EbmlReader, ElementType, UNKNOWN_SIZE_END};
use crate::webm::ids;
use crate::webm::track::{TrackBuilder, TrackDescriptor};

/// Converts a nanosecond duration to microseconds, per spec.md's
/// `ns_to_us` used throughout §4.9 for `TimecodeScale`-derived values.
const fn ns_to_us(ns: i64) -> i64 {
    ns / 1_000
}

/// Default `TimecodeScale`: one tick is 1,000,000 ns (1 ms), per §4.9.
const DEFAULT_TIMECODE_SCALE: u64 = 1_000_000;

#[derive(Debug, Default, Clone)]
struct PendingEncoding {
    order: Option<u64>,
    scope: Option<u64>,
    enc_type: Option<u64>,
    algo: Option<u64>,
    cipher_mode: Option<u64>,
    key_id: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackSlot {
    Audio,
    Video,
}

#[derive(Debug)]
struct PendingSample {
    time_us: i64,
    flags: SampleFlags,
    size: u32,
    track_number: i32,
    key_id: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
enum BlockPhase {
    #[default]
    Idle,
    Writing {
        header: BlockHeader,
        sizes: Vec<u32>,
        index: usize,
        writer: SamplePayloadWriter,
        is_simple: bool,
        track_slot: TrackSlot,
    },
}

/// Owns every piece of mutable state the element-dispatch table in §4.9
/// needs, and implements [`EbmlProcessor`] so [`EbmlReader`] can drive it.
/// Split out from [`WebmExtractor`] so the reader and the processor are
/// separate fields of the outer struct — letting `ebml.read(input, &mut
/// state)` borrow them independently instead of trying to pass `self`
/// through a trait object it's also a field of.
struct ExtractorState<O: ExtractorOutput> {
    output: O,

    timecode_scale: u64,
    duration_us: Option<i64>,

    ebml_read_version_seen: Option<u64>,
    doc_type_seen: Option<String>,
    doc_type_read_version_seen: Option<u64>,

    segment_content_position: Option<u64>,
    /// `None` means the `Segment`'s declared size was the EBML
    /// "unknown, extends to end of stream" sentinel.
    segment_content_size: Option<u64>,

    seeking_seek_id: Option<u32>,
    seeking_seek_position: Option<u64>,

    cues_content_position: Option<u64>,
    cues_seek_triggered: bool,
    cues_built: bool,
    cues_builder: Option<CuesBuilder>,

    /// Set when `read()` should hand `ReadResult::Seek` back to the caller
    /// on its next iteration; cleared once consumed. Used for both legs of
    /// the seek-for-cues round trip (§4.9's "Seek loop for cues").
    pending_seek_target: Option<u64>,
    /// The position to return to once `Cues` has been built, captured at
    /// the `Cluster` whose processing the cues seek interrupted.
    saved_return_position: Option<u64>,

    current_track: Option<TrackBuilder>,
    pending_encoding: Option<PendingEncoding>,
    audio_track: Option<TrackDescriptor>,
    video_track: Option<TrackDescriptor>,
    tracks_ended: bool,
    drm_emitted: bool,

    cluster_timecode_us: i64,
    block_header_parser: BlockHeaderParser,
    block_phase: BlockPhase,
    reference_block_seen: bool,
    pending_block_group_samples: Vec<PendingSample>,
}

impl<O: ExtractorOutput> ExtractorState<O> {
    fn new(output: O) -> Self {
        Self {
            output,
            timecode_scale: DEFAULT_TIMECODE_SCALE,
            duration_us: None,
            ebml_read_version_seen: None,
            doc_type_seen: None,
            doc_type_read_version_seen: None,
            segment_content_position: None,
            segment_content_size: None,
            seeking_seek_id: None,
            seeking_seek_position: None,
            cues_content_position: None,
            cues_seek_triggered: false,
            cues_built: false,
            cues_builder: None,
            pending_seek_target: None,
            saved_return_position: None,
            current_track: None,
            pending_encoding: None,
            audio_track: None,
            video_track: None,
            tracks_ended: false,
            drm_emitted: false,
            cluster_timecode_us: 0,
            block_header_parser: BlockHeaderParser::new(),
            block_phase: BlockPhase::Idle,
            reference_block_seen: false,
            pending_block_group_samples: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.timecode_scale = DEFAULT_TIMECODE_SCALE;
        self.duration_us = None;
        self.ebml_read_version_seen = None;
        self.doc_type_seen = None;
        self.doc_type_read_version_seen = None;
        self.segment_content_position = None;
        self.segment_content_size = None;
        self.seeking_seek_id = None;
        self.seeking_seek_position = None;
        self.cues_content_position = None;
        self.cues_seek_triggered = false;
        self.cues_built = false;
        self.cues_builder = None;
        self.pending_seek_target = None;
        self.saved_return_position = None;
        self.current_track = None;
        self.pending_encoding = None;
        self.audio_track = None;
        self.video_track = None;
        self.tracks_ended = false;
        self.drm_emitted = false;
        self.cluster_timecode_us = 0;
        self.block_header_parser.reset();
        self.block_phase = BlockPhase::Idle;
        self.reference_block_seen = false;
        self.pending_block_group_samples.clear();
    }

    fn take_pending_seek(&mut self) -> Option<u64> {
        self.pending_seek_target.take()
    }

    fn validate_ebml_header(&self) -> Result<()> {
        if self.ebml_read_version_seen != Some(1) {
            return Err(ExtractorError::unsupported("EBMLReadVersion must be 1"));
        }
        match self.doc_type_seen.as_deref() {
            Some("webm") | Some("matroska") => {}
            _ => return Err(ExtractorError::unsupported("unsupported DocType")),
        }
        match self.doc_type_read_version_seen {
            Some(1) | Some(2) => {}
            _ => return Err(ExtractorError::unsupported("DocTypeReadVersion must be 1 or 2")),
        }
        Ok(())
    }

    fn resolve_track(&self, track_number: i64) -> Option<TrackSlot> {
        if self
            .audio_track
            .as_ref()
            .is_some_and(|t| t.number as i64 == track_number)
        {
            Some(TrackSlot::Audio)
        } else if self
            .video_track
            .as_ref()
            .is_some_and(|t| t.number as i64 == track_number)
        {
            Some(TrackSlot::Video)
        } else {
            None
        }
    }

    /// `(track_number, codec_id, nal_length_field_length, has_content_encryption,
    /// default_sample_duration_ns, encryption_key_id)` for the matched track.
    fn track_params(&self, slot: TrackSlot) -> (i32, String, Option<u8>, bool, Option<i64>, Option<Vec<u8>>) {
        let d = match slot {
            TrackSlot::Audio => self.audio_track.as_ref(),
            TrackSlot::Video => self.video_track.as_ref(),
        }
        .expect("resolve_track only returns a slot backed by a retained track");
        (
            d.number,
            d.codec_id.clone(),
            d.nal_length_field_length,
            d.has_content_encryption,
            d.default_sample_duration_ns,
            d.encryption_key_id.clone(),
        )
    }

    fn finish_track_entry(&mut self) -> Result<()> {
        let builder = self
            .current_track
            .take()
            .ok_or_else(|| ExtractorError::parse("unexpected end of TrackEntry"))?;

        if builder.track_type.is_none() {
            log::warn!("webm: TrackEntry with unrecognized TrackType, skipping");
            return Ok(());
        }

        let descriptor = builder.build()?;
        let is_audio = matches!(descriptor.track_type, TrackType::Audio);
        let is_video = matches!(descriptor.track_type, TrackType::Video);
        if !is_audio && !is_video {
            log::warn!("webm: TrackEntry of unsupported track type, skipping");
            return Ok(());
        }

        let already_have = if is_audio {
            self.audio_track.is_some()
        } else {
            self.video_track.is_some()
        };
        if already_have {
            log::warn!(
                "webm: duplicate {} TrackEntry (number {}), keeping the first",
                if is_audio { "audio" } else { "video" },
                descriptor.number
            );
            return Ok(());
        }

        if descriptor.has_content_encryption && !self.drm_emitted {
            if let Some(key_id) = descriptor.encryption_key_id.as_ref() {
                self.output.drm_init_data("cenc", key_id);
                self.drm_emitted = true;
            }
        }

        let format = descriptor.to_media_format();
        let number = descriptor.number;
        if is_audio {
            self.audio_track = Some(descriptor);
        } else {
            self.video_track = Some(descriptor);
        }
        self.output.track(number).format(&format);
        Ok(())
    }

    fn flush_block_group(&mut self) {
        let add_sync = !self.reference_block_seen;
        let pending = std::mem::take(&mut self.pending_block_group_samples);
        for p in pending {
            let mut flags = p.flags;
            if add_sync {
                flags |= SampleFlags::SYNC;
            }
            self.output
                .track(p.track_number)
                .sample_metadata(p.time_us, flags, p.size, 0, p.key_id.as_deref());
        }
        self.reference_block_seen = false;
    }

    /// Drives [`BlockHeaderParser`]/[`SamplePayloadWriter`] across as many
    /// `read()` calls as it takes, resuming from `self.block_phase` rather
    /// than losing progress on `NeedMoreData`. `block_phase` is taken out
    /// of `self` for the duration of each step so this can freely call
    /// `self.output.track(..)` without a double-borrow of `self`.
    fn handle_block(&mut self, is_simple: bool, remaining: u64, input: &mut dyn ExtractorInput) -> Result<()> {
        loop {
            let phase = std::mem::take(&mut self.block_phase);
            match phase {
                BlockPhase::Idle => {
                    let parsed = self.block_header_parser.read(input, is_simple, remaining)?;
                    match self.resolve_track(parsed.header.track_number) {
                        None => {
                            // Track doesn't match either retained track: leave
                            // `block_phase` idle and let `EbmlReader::resume_binary`
                            // auto-skip whatever payload remains, per §4.10 START.
                            return Ok(());
                        }
                        Some(track_slot) => {
                            self.block_phase = BlockPhase::Writing {
                                header: parsed.header,
                                sizes: parsed.sample_sizes,
                                index: 0,
                                writer: SamplePayloadWriter::new(),
                                is_simple,
                                track_slot,
                            };
                        }
                    }
                }
                BlockPhase::Writing {
                    header,
                    sizes,
                    index,
                    mut writer,
                    is_simple,
                    track_slot,
                } => {
                    if index >= sizes.len() {
                        self.block_phase = BlockPhase::Idle;
                        return Ok(());
                    }

                    let sample_size = sizes[index];
                    let (number, codec_id, nal_len, has_enc, default_dur_ns, key_id) =
                        self.track_params(track_slot);

                    let write_result = {
                        let sink = self.output.track(number);
                        writer.write(input, sink, sample_size, &codec_id, nal_len, has_enc)
                    };

                    match write_result {
                        Ok((forwarded, encrypted)) => {
                            let per_sample_us = default_dur_ns.unwrap_or(0) / 1_000;
                            let time_us = self.cluster_timecode_us
                                + ns_to_us(header.timecode as i64 * self.timecode_scale as i64)
                                + index as i64 * per_sample_us;

                            let mut flags = SampleFlags::empty();
                            if header.decode_only_bit() {
                                flags |= SampleFlags::DECODE_ONLY;
                            }
                            if encrypted {
                                flags |= SampleFlags::ENCRYPTED;
                            }

                            if is_simple {
                                if header.keyframe_bit() {
                                    flags |= SampleFlags::SYNC;
                                }
                                self.output
                                    .track(number)
                                    .sample_metadata(time_us, flags, forwarded, 0, key_id.as_deref());
                            } else {
                                self.pending_block_group_samples.push(PendingSample {
                                    time_us,
                                    flags,
                                    size: forwarded,
                                    track_number: number,
                                    key_id,
                                });
                            }

                            self.block_phase = BlockPhase::Writing {
                                header,
                                sizes,
                                index: index + 1,
                                writer,
                                is_simple,
                                track_slot,
                            };
                        }
                        Err(ExtractorError::NeedMoreData) => {
                            self.block_phase = BlockPhase::Writing {
                                header,
                                sizes,
                                index,
                                writer,
                                is_simple,
                                track_slot,
                            };
                            return Err(ExtractorError::NeedMoreData);
                        }
                        Err(e) => {
                            self.block_phase = BlockPhase::Idle;
                            return Err(e);
                        }
                    }
                }
            }
        }
    }
}

impl<O: ExtractorOutput> EbmlProcessor for ExtractorState<O> {
    fn element_type(&self, id: u32) -> ElementType {
        ids::element_type(id)
    }

    fn start_master(&mut self, id: u32, content_position: u64, content_size: u64) -> Result<()> {
        match id {
            ids::SEGMENT => {
                if self.segment_content_position.is_some() {
                    return Err(ExtractorError::unsupported("multiple Segment elements"));
                }
                self.segment_content_position = Some(content_position);
                self.segment_content_size = if content_size == UNKNOWN_SIZE_END {
                    None
                } else {
                    Some(content_size)
                };
            }
            ids::SEEK => {
                self.seeking_seek_id = None;
                self.seeking_seek_position = None;
            }
            ids::CUES => {
                self.cues_builder = Some(CuesBuilder::new());
            }
            ids::CUE_POINT => {
                if let Some(b) = self.cues_builder.as_mut() {
                    b.start_cue_point();
                }
            }
            ids::TRACK_ENTRY => {
                self.current_track = Some(TrackBuilder::new());
            }
            ids::CONTENT_ENCODING => {
                self.pending_encoding = Some(PendingEncoding::default());
            }
            ids::CLUSTER => {
                if !self.cues_built && !self.cues_seek_triggered {
                    if let Some(cues_pos) = self.cues_content_position {
                        log::debug!("webm: cluster reached before Cues built, requesting seek to {cues_pos}");
                        self.pending_seek_target = Some(cues_pos);
                        self.saved_return_position = Some(content_position);
                        self.cues_seek_triggered = true;
                    }
                }
            }
            ids::BLOCK_GROUP => {
                self.reference_block_seen = false;
                self.pending_block_group_samples.clear();
            }
            _ => {}
        }
        Ok(())
    }

    fn end_master(&mut self, id: u32) -> Result<()> {
        match id {
            ids::EBML => self.validate_ebml_header()?,
            ids::SEEK => {
                if self.seeking_seek_id == Some(ids::CUES) {
                    let pos = self
                        .seeking_seek_position
                        .ok_or_else(|| ExtractorError::parse("SeekHead: Seek for Cues missing SeekPosition"))?;
                    let segment_pos = self.segment_content_position.unwrap_or(0);
                    self.cues_content_position = Some(segment_pos + pos);
                }
            }
            ids::CUE_POINT => {
                if let Some(b) = self.cues_builder.as_mut() {
                    b.end_cue_point()?;
                }
            }
            ids::CUES => {
                if let Some(builder) = self.cues_builder.take() {
                    let segment_pos = self.segment_content_position.unwrap_or(0);
                    let segment_size = self
                        .segment_content_size
                        .ok_or_else(|| ExtractorError::parse("Cues: Segment size unknown, cannot size final chunk"))?;
                    let index = builder.build(segment_pos, segment_size, self.duration_us.unwrap_or(0))?;
                    self.output.seek_map(index);
                    self.cues_built = true;
                    log::debug!("webm: cues built");
                    if let Some(saved) = self.saved_return_position.take() {
                        self.pending_seek_target = Some(saved);
                    }
                }
            }
            ids::CONTENT_ENCRYPTION => {
                let pending = self
                    .pending_encoding
                    .as_ref()
                    .ok_or_else(|| ExtractorError::parse("ContentEncryption outside ContentEncoding"))?;
                if pending.key_id.is_none() {
                    return Err(ExtractorError::parse("ContentEncryption missing ContentEncKeyID"));
                }
            }
            ids::CONTENT_ENCODING => {
                let pending = self
                    .pending_encoding
                    .take()
                    .ok_or_else(|| ExtractorError::parse("unexpected end of ContentEncoding"))?;
                if pending.order != Some(0) {
                    return Err(ExtractorError::unsupported("ContentEncodingOrder must be 0"));
                }
                if pending.scope != Some(1) {
                    return Err(ExtractorError::unsupported("ContentEncodingScope must be 1"));
                }
                if pending.enc_type != Some(1) {
                    return Err(ExtractorError::unsupported("ContentEncodingType must be 1 (encryption)"));
                }
                if pending.algo != Some(5) {
                    return Err(ExtractorError::unsupported("ContentEncAlgo must be 5 (AES)"));
                }
                if pending.cipher_mode != Some(1) {
                    return Err(ExtractorError::unsupported("AESSettingsCipherMode must be 1 (CTR)"));
                }
                if let Some(track) = self.current_track.as_mut() {
                    track.has_content_encryption = true;
                    track.encryption_key_id = pending.key_id;
                }
            }
            ids::TRACK_ENTRY => self.finish_track_entry()?,
            ids::TRACKS => {
                if !self.tracks_ended {
                    self.output.end_tracks();
                    self.tracks_ended = true;
                }
            }
            ids::BLOCK_GROUP => self.flush_block_group(),
            _ => {}
        }
        Ok(())
    }

    fn unsigned_int(&mut self, id: u32, value: u64) -> Result<()> {
        match id {
            ids::EBML_READ_VERSION => self.ebml_read_version_seen = Some(value),
            ids::DOC_TYPE_READ_VERSION => self.doc_type_read_version_seen = Some(value),
            ids::TIMECODE_SCALE => self.timecode_scale = value,
            ids::TRACK_NUMBER => {
                if let Some(t) = self.current_track.as_mut() {
                    t.number = Some(value as i32);
                }
            }
            ids::TRACK_TYPE => {
                if let Some(t) = self.current_track.as_mut() {
                    t.set_track_type(value);
                }
            }
            ids::DEFAULT_DURATION => {
                if let Some(t) = self.current_track.as_mut() {
                    t.default_sample_duration_ns = Some(value as i64);
                }
            }
            ids::CODEC_DELAY => {
                if let Some(t) = self.current_track.as_mut() {
                    t.codec_delay_ns = Some(value as i64);
                }
            }
            ids::SEEK_PRE_ROLL => {
                if let Some(t) = self.current_track.as_mut() {
                    t.seek_preroll_ns = Some(value as i64);
                }
            }
            ids::CHANNELS => {
                if let Some(t) = self.current_track.as_mut() {
                    t.channels = Some(value as u32);
                }
            }
            ids::PIXEL_WIDTH => {
                if let Some(t) = self.current_track.as_mut() {
                    t.pixel_width = Some(value as u32);
                }
            }
            ids::PIXEL_HEIGHT => {
                if let Some(t) = self.current_track.as_mut() {
                    t.pixel_height = Some(value as u32);
                }
            }
            ids::CONTENT_ENCODING_ORDER => {
                if let Some(p) = self.pending_encoding.as_mut() {
                    p.order = Some(value);
                }
            }
            ids::CONTENT_ENCODING_SCOPE => {
                if let Some(p) = self.pending_encoding.as_mut() {
                    p.scope = Some(value);
                }
            }
            ids::CONTENT_ENCODING_TYPE => {
                if let Some(p) = self.pending_encoding.as_mut() {
                    p.enc_type = Some(value);
                }
            }
            ids::CONTENT_ENC_ALGO => {
                if let Some(p) = self.pending_encoding.as_mut() {
                    p.algo = Some(value);
                }
            }
            ids::AES_SETTINGS_CIPHER_MODE => {
                if let Some(p) = self.pending_encoding.as_mut() {
                    p.cipher_mode = Some(value);
                }
            }
            ids::CUE_TIME => {
                if let Some(b) = self.cues_builder.as_mut() {
                    b.set_cue_time_us(ns_to_us(value as i64 * self.timecode_scale as i64));
                }
            }
            ids::CUE_CLUSTER_POSITION => {
                if let Some(b) = self.cues_builder.as_mut() {
                    b.set_cue_cluster_position(value);
                }
            }
            ids::TIMECODE => {
                self.cluster_timecode_us = ns_to_us(value as i64 * self.timecode_scale as i64);
            }
            ids::SEEK_POSITION => self.seeking_seek_position = Some(value),
            ids::REFERENCE_BLOCK => self.reference_block_seen = true,
            _ => {}
        }
        Ok(())
    }

    fn float(&mut self, id: u32, value: f64) -> Result<()> {
        match id {
            ids::DURATION => {
                let ns = (value * self.timecode_scale as f64) as i64;
                self.duration_us = Some(ns_to_us(ns));
            }
            ids::SAMPLING_FREQUENCY => {
                if let Some(t) = self.current_track.as_mut() {
                    t.sample_rate = Some(value);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn string(&mut self, id: u32, value: &str) -> Result<()> {
        match id {
            ids::DOC_TYPE => self.doc_type_seen = Some(value.to_string()),
            ids::CODEC_ID => {
                if let Some(t) = self.current_track.as_mut() {
                    t.codec_id = Some(value.to_string());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn binary(&mut self, id: u32, size: u64, input: &mut dyn ExtractorInput) -> Result<()> {
        match id {
            ids::SEEK_ID => {
                let n = size as usize;
                if n > 4 {
                    return Err(ExtractorError::parse("SeekID wider than 4 bytes"));
                }
                let mut buf = [0u8; 4];
                input.read_fully(&mut buf[4 - n..], 0, n)?;
                self.seeking_seek_id = Some(u32::from_be_bytes(buf));
                Ok(())
            }
            ids::CODEC_PRIVATE => {
                let mut buf = vec![0u8; size as usize];
                input.read_fully(&mut buf, 0, size as usize)?;
                if let Some(t) = self.current_track.as_mut() {
                    t.codec_private = Some(buf);
                }
                Ok(())
            }
            ids::CONTENT_ENC_KEY_ID => {
                let mut buf = vec![0u8; size as usize];
                input.read_fully(&mut buf, 0, size as usize)?;
                if let Some(p) = self.pending_encoding.as_mut() {
                    p.key_id = Some(buf);
                }
                Ok(())
            }
            ids::SIMPLE_BLOCK => self.handle_block(true, size, input),
            ids::BLOCK => self.handle_block(false, size, input),
            _ => {
                input.skip_fully(size)?;
                Ok(())
            }
        }
    }
}

/// Public entry point for the WebM/Matroska pipeline: `new` (spec.md §6's
/// `init(output)`), `seek` (full state reset), and `read` (the seek-aware
/// pull loop). Generic over the caller's [`ExtractorOutput`] implementation
/// so the parser never allocates a trait object for its own sink.
pub struct WebmExtractor<O: ExtractorOutput> {
    ebml: EbmlReader,
    state: ExtractorState<O>,
}

impl<O: ExtractorOutput> WebmExtractor<O> {
    /// Creates a fresh extractor bound to `output`, matching spec.md §6's
    /// `init(output)`.
    pub fn new(output: O) -> Self {
        Self {
            ebml: EbmlReader::new(),
            state: ExtractorState::new(output),
        }
    }

    /// Fully reinitializes internal state (EBML stack, track tables, cues
    /// builder, block state machine) so the instance can be reused against
    /// a new position or stream, per §5's "reset()/seek()" contract.
    pub fn seek(&mut self) {
        self.ebml.reset();
        self.state.reset();
    }

    /// Borrows the caller-supplied output sink, mainly useful for hosts
    /// that want to inspect accumulated track state between `read` calls.
    pub fn output(&self) -> &O {
        &self.state.output
    }

    /// Advances the parse by one step. Returns [`ReadResult::Seek`] exactly
    /// twice over the lifetime of a stream with a `Cues` element reachable
    /// from `SeekHead` (once to jump to `Cues`, once to return), per §8's
    /// "Seek loop termination" property; [`ReadResult::EndOfInput`] once the
    /// input is exhausted; [`ReadResult::Continue`] otherwise.
    pub fn read(&mut self, input: &mut dyn ExtractorInput, seek_position: &mut PositionHolder) -> Result<ReadResult> {
        match self.ebml.read(input, &mut self.state)? {
            ReadResult::EndOfInput => return Ok(ReadResult::EndOfInput),
            ReadResult::Continue | ReadResult::Seek => {}
        }

        if let Some(pos) = self.state.take_pending_seek() {
            seek_position.position = pos;
            return Ok(ReadResult::Seek);
        }

        Ok(ReadResult::Continue)
    }
}
