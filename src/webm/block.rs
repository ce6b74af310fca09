//! # Block / SimpleBlock Parser and Sample Payload Writer
//!
//! §4.10's header/lacing state machine (`START → HEADER → DATA → START`)
//! and §4.11's payload translation, kept as two separate resumable
//! pieces: [`BlockHeaderParser`] never touches a sink (so an unmatched
//! track number can be discarded by letting [`crate::webm::ebml::EbmlReader`]
//! auto-skip the remaining content, with no wasted forwarding work), and
//! [`SamplePayloadWriter`] only runs once a sink has been resolved.

use crate::error::{ExtractorError, Result};
use crate::input::{ExtractorInput, TrackOutput};
use crate::webm::ebml::PendingVarint;
use crate::webm::track::CODEC_AVC;

const ENCRYPTION_IV_SIZE: u8 = 8;
const AVC_START_CODE: [u8; 4] = [0, 0, 0, 1];
const VORBIS_POSTFIX: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// A byte source backed by an in-memory literal, used to hand
/// synthesized bytes (an Annex-B start code, the Vorbis page-count
/// postfix, the rewritten encryption signal byte) to [`TrackOutput`],
/// whose `sample_data` contract only knows how to forward from an
/// `ExtractorInput`.
struct LiteralInput<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> LiteralInput<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl<'a> ExtractorInput for LiteralInput<'a> {
    fn read_fully(&mut self, buf: &mut [u8], offset: usize, len: usize) -> Result<()> {
        if self.pos + len > self.data.len() {
            return Err(ExtractorError::parse("literal input: short read"));
        }
        buf[offset..offset + len].copy_from_slice(&self.data[self.pos..self.pos + len]);
        self.pos += len;
        Ok(())
    }

    fn skip_fully(&mut self, len: u64) -> Result<()> {
        self.pos += len as usize;
        Ok(())
    }

    fn get_position(&self) -> u64 {
        self.pos as u64
    }
}

/// Lacing mode, decoded from a block's flags byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lacing {
    /// One sample fills the whole block content.
    None,
    /// Xiph-style lacing: each size but the last is a byte-run-length value.
    Xiph,
    /// All but the last sample share one size, dividing the remainder evenly.
    FixedSize,
    /// Each size but the first is a signed delta from the previous one,
    /// EBML-varint encoded.
    Ebml,
}

impl Lacing {
    fn from_flags(flags: u8) -> Self {
        match (flags >> 1) & 0x03 {
            0 => Lacing::None,
            1 => Lacing::Xiph,
            2 => Lacing::FixedSize,
            _ => Lacing::Ebml,
        }
    }
}

/// Fixed fields common to every lacing mode.
#[derive(Debug, Clone)]
pub struct BlockHeader {
    /// Decoded `TrackNumber`, matched against a track's descriptor.
    pub track_number: i64,
    /// Signed timecode, relative to the enclosing `Cluster`'s `Timecode`.
    pub timecode: i16,
    /// Raw flags byte (keyframe bit, lacing bits, invisible bit, discardable bit).
    pub flags: u8,
    /// Decoded lacing mode.
    pub lacing: Lacing,
}

impl BlockHeader {
    /// `flags & 0x80`, the keyframe signal bit; only meaningful on a
    /// `SimpleBlock` per spec.md §4.10.
    pub fn keyframe_bit(&self) -> bool {
        self.flags & 0x80 != 0
    }

    /// `flags & 0x08`, the discardable/decode-only signal bit.
    pub fn decode_only_bit(&self) -> bool {
        self.flags & 0x08 != 0
    }
}

/// Result of a completed header parse: the header fields plus the
/// per-sample size table, derived once the full lacing table (if any)
/// has been read.
#[derive(Debug, Clone)]
pub struct ParsedHeader {
    /// The block's fixed header fields.
    pub header: BlockHeader,
    /// Per-sample byte sizes, one entry for `Lacing::None`, one per laced
    /// sample otherwise.
    pub sample_sizes: Vec<u32>,
}

#[derive(Debug)]
enum Phase {
    TrackNumber(PendingVarint),
    FixedHeader {
        track_number: i64,
        track_number_len: u32,
    },
    LaceCount {
        track_number: i64,
        track_number_len: u32,
        timecode: i16,
        flags: u8,
    },
    XiphSizes {
        track_number: i64,
        track_number_len: u32,
        timecode: i16,
        flags: u8,
        remaining_entries: usize,
        sizes: Vec<u32>,
        entry_scratch: u32,
    },
    EbmlSizes {
        track_number: i64,
        track_number_len: u32,
        timecode: i16,
        flags: u8,
        remaining_entries: usize,
        sizes: Vec<i64>,
        varint: PendingVarint,
        byte_index_in_entry: u32,
    },
}

/// Resumable parser for a `SimpleBlock`/`Block` element's header and
/// lacing table, per §4.10's `START`/`HEADER` states. Never touches a
/// sink; once [`BlockHeaderParser::read`] returns `Ok`, the caller
/// resolves the matched track and, if none matches, simply discards the
/// result — the EBML reader auto-skips whatever payload bytes remain.
#[derive(Debug)]
pub struct BlockHeaderParser {
    phase: Phase,
    total_content_size: Option<u64>,
}

impl BlockHeaderParser {
    /// Creates a parser at the start of a fresh block.
    pub fn new() -> Self {
        Self {
            phase: Phase::TrackNumber(PendingVarint::default()),
            total_content_size: None,
        }
    }

    /// Drops any partially parsed header, returning to the fresh state.
    pub fn reset(&mut self) {
        self.phase = Phase::TrackNumber(PendingVarint::default());
        self.total_content_size = None;
    }

    /// Parses (or resumes parsing) a `Block`/`SimpleBlock`'s header and
    /// lacing table. `remaining_size` is the element's total content size,
    /// supplied on the first call and ignored on resumption.
    pub fn read(
        &mut self,
        input: &mut dyn ExtractorInput,
        is_simple_block: bool,
        remaining_size: u64,
    ) -> Result<ParsedHeader> {
        if self.total_content_size.is_none() {
            self.total_content_size = Some(remaining_size);
        }
        let total = self.total_content_size.expect("set above");

        loop {
            match &mut self.phase {
                Phase::TrackNumber(varint) => {
                    // Decoded the same way as an element size (marker
                    // stripped): the value must equal the track's real
                    // TrackNumber to be matchable against it.
                    let (track_number, len) = varint.try_read(input, false, true)?;
                    self.phase = Phase::FixedHeader {
                        track_number: track_number as i64,
                        track_number_len: len,
                    };
                }
                Phase::FixedHeader {
                    track_number,
                    track_number_len,
                } => {
                    let (track_number, track_number_len) = (*track_number, *track_number_len);
                    let mut buf = [0u8; 3];
                    input.read_fully(&mut buf, 0, 3)?;
                    let timecode = i16::from_be_bytes([buf[0], buf[1]]);
                    let flags = buf[2];
                    self.phase = Phase::LaceCount {
                        track_number,
                        track_number_len,
                        timecode,
                        flags,
                    };
                }
                Phase::LaceCount {
                    track_number,
                    track_number_len,
                    timecode,
                    flags,
                } => {
                    let (track_number, track_number_len, timecode, flags) =
                        (*track_number, *track_number_len, *timecode, *flags);
                    let lacing = Lacing::from_flags(flags);

                    if lacing != Lacing::None && !is_simple_block {
                        return Err(ExtractorError::unsupported(
                            "lacing is not permitted on a Block (only SimpleBlock)",
                        ));
                    }

                    if lacing == Lacing::None {
                        let sample_size = total
                            .checked_sub(track_number_len as u64 + 3)
                            .ok_or_else(|| ExtractorError::parse("block: content shorter than fixed header"))?
                            as u32;
                        self.reset_to_fresh();
                        return Ok(ParsedHeader {
                            header: BlockHeader {
                                track_number,
                                timecode,
                                flags,
                                lacing,
                            },
                            sample_sizes: vec![sample_size],
                        });
                    }

                    let mut count_byte = [0u8; 1];
                    input.read_fully(&mut count_byte, 0, 1)?;
                    let count = count_byte[0] as usize + 1;

                    match lacing {
                        Lacing::FixedSize => {
                            let header_bytes = track_number_len as u64 + 4;
                            let usable = total
                                .checked_sub(header_bytes)
                                .ok_or_else(|| ExtractorError::parse("block: content shorter than fixed-size lacing header"))?;
                            let size = (usable / count as u64) as u32;
                            let mut sizes = vec![size; count];
                            if let Some(last) = sizes.last_mut() {
                                let accounted = size as u64 * (count as u64 - 1);
                                *last = (usable - accounted) as u32;
                            }
                            self.reset_to_fresh();
                            return Ok(ParsedHeader {
                                header: BlockHeader {
                                    track_number,
                                    timecode,
                                    flags,
                                    lacing,
                                },
                                sample_sizes: sizes,
                            });
                        }
                        Lacing::Xiph => {
                            self.phase = Phase::XiphSizes {
                                track_number,
                                track_number_len,
                                timecode,
                                flags,
                                remaining_entries: count - 1,
                                sizes: Vec::with_capacity(count),
                                entry_scratch: 0,
                            };
                        }
                        Lacing::Ebml => {
                            self.phase = Phase::EbmlSizes {
                                track_number,
                                track_number_len,
                                timecode,
                                flags,
                                remaining_entries: count - 1,
                                sizes: Vec::with_capacity(count),
                                varint: PendingVarint::default(),
                                byte_index_in_entry: 0,
                            };
                        }
                        Lacing::None => unreachable!(),
                    }
                }
                Phase::XiphSizes {
                    track_number,
                    track_number_len,
                    timecode,
                    flags,
                    remaining_entries,
                    sizes,
                    entry_scratch,
                } => {
                    if *remaining_entries == 0 {
                        let header_bytes = *track_number_len as u64 + 3 + 1;
                        let accounted: u64 = sizes.iter().map(|&s| s as u64).sum();
                        let last = total
                            .checked_sub(header_bytes + accounted)
                            .ok_or_else(|| ExtractorError::parse("block: xiph lacing sizes exceed content"))?;
                        sizes.push(last as u32);

                        let (track_number, timecode, flags) = (*track_number, *timecode, *flags);
                        let sample_sizes = std::mem::take(sizes);
                        self.reset_to_fresh();
                        return Ok(ParsedHeader {
                            header: BlockHeader {
                                track_number,
                                timecode,
                                flags,
                                lacing: Lacing::Xiph,
                            },
                            sample_sizes,
                        });
                    }

                    let mut byte = [0u8; 1];
                    input.read_fully(&mut byte, 0, 1)?;
                    *entry_scratch += byte[0] as u32;
                    if byte[0] != 0xFF {
                        sizes.push(*entry_scratch);
                        *entry_scratch = 0;
                        *remaining_entries -= 1;
                    }
                }
                Phase::EbmlSizes {
                    track_number,
                    track_number_len,
                    timecode,
                    flags,
                    remaining_entries,
                    sizes,
                    varint,
                    byte_index_in_entry,
                } => {
                    if *remaining_entries == 0 {
                        let header_bytes = *track_number_len as u64 + 3 + 1;
                        let accounted: i64 = sizes.iter().sum();
                        let last = total as i64 - header_bytes as i64 - accounted;
                        if last < 0 {
                            return Err(ExtractorError::parse("block: ebml lacing sizes exceed content"));
                        }

                        let (track_number, timecode, flags) = (*track_number, *timecode, *flags);
                        let sample_sizes: Vec<u32> = sizes.iter().map(|&s| s as u32).chain(std::iter::once(last as u32)).collect();
                        self.reset_to_fresh();
                        return Ok(ParsedHeader {
                            header: BlockHeader {
                                track_number,
                                timecode,
                                flags,
                                lacing: Lacing::Ebml,
                            },
                            sample_sizes,
                        });
                    }

                    let is_first = sizes.is_empty() && *byte_index_in_entry == 0;
                    // First entry: unsigned EBML varint, mask stripped.
                    // Subsequent entries: signed delta from the previous
                    // size, encoded the same way, biased by
                    // `(1 << (6 + 7*k)) - 1` where k counts payload bytes
                    // beyond the first.
                    let (value, length) = varint.try_read(input, true, true)?;
                    *byte_index_in_entry = 0;
                    if is_first {
                        sizes.push(value as i64);
                    } else {
                        let k = length - 1;
                        let bias = (1i64 << (6 + 7 * k)) - 1;
                        let delta = value as i64 - bias;
                        let previous = *sizes.last().expect("non-first entry implies a previous size");
                        let next = previous + delta;
                        if next < i32::MIN as i64 || next > i32::MAX as i64 {
                            return Err(ExtractorError::unsupported("ebml lacing: delta size outside signed 32-bit range"));
                        }
                        sizes.push(next);
                    }
                    *remaining_entries -= 1;
                }
            }
        }
    }

    fn reset_to_fresh(&mut self) {
        self.phase = Phase::TrackNumber(PendingVarint::default());
        self.total_content_size = None;
    }
}

impl Default for BlockHeaderParser {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
enum SampleCursor {
    #[default]
    Idle,
    Encryption,
    Avc {
        consumed_source: u32,
        nal: NalCursor,
    },
    Passthrough {
        consumed_source: u32,
    },
    VorbisPostfix,
}

#[derive(Debug, Clone, Copy)]
enum NalCursor {
    AwaitLength,
    AwaitStartCode { nal_len: u32 },
    CopyingPayload { remaining: u32 },
}

/// Forwards one laced sample's payload to its track's sink, per §4.11.
/// Persists enough state (`SampleCursor`) that a `NeedMoreData` midway
/// through a multi-step translation (an H.264 NAL's length field sent
/// but its start code or payload not yet forwarded) resumes without
/// re-forwarding bytes the sink has already received.
#[derive(Debug, Default)]
pub struct SamplePayloadWriter {
    cursor: SampleCursor,
    encrypted: bool,
    forwarded: u32,
}

impl SamplePayloadWriter {
    /// Creates a writer with no sample in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops any partially written sample, returning to the idle state.
    pub fn reset(&mut self) {
        self.cursor = SampleCursor::Idle;
        self.encrypted = false;
        self.forwarded = 0;
    }

    /// Writes the next unwritten portion of one sample. `sample_size` is
    /// the lace's declared size per §4.10 (the *source* byte count,
    /// before encryption-signal removal or H.264 start-code expansion).
    /// Returns `(bytes_forwarded_to_sink, encrypted)` once the whole
    /// sample has been written.
    pub fn write(
        &mut self,
        input: &mut dyn ExtractorInput,
        sink: &mut dyn TrackOutput,
        sample_size: u32,
        codec_id: &str,
        nal_length_field_length: Option<u8>,
        has_content_encryption: bool,
    ) -> Result<(u32, bool)> {
        let mut source_size = sample_size;
        if has_content_encryption {
            source_size -= 1;
        }

        if matches!(self.cursor, SampleCursor::Idle) {
            self.cursor = if has_content_encryption {
                SampleCursor::Encryption
            } else if codec_id == CODEC_AVC {
                SampleCursor::Avc {
                    consumed_source: 0,
                    nal: NalCursor::AwaitLength,
                }
            } else {
                SampleCursor::Passthrough { consumed_source: 0 }
            };
        }

        if let SampleCursor::Encryption = self.cursor {
            let mut signal = [0u8; 1];
            input.read_fully(&mut signal, 0, 1)?;
            if signal[0] & 0x80 != 0 {
                return Err(ExtractorError::parse("content encryption signal byte: extension bit set"));
            }
            if signal[0] & 0x01 != 0 {
                self.encrypted = true;
                let mut literal = LiteralInput::new(&[ENCRYPTION_IV_SIZE]);
                sink.sample_data(&mut literal, 1)?;
                self.forwarded += 1;
            }
            self.cursor = if codec_id == CODEC_AVC {
                SampleCursor::Avc {
                    consumed_source: 0,
                    nal: NalCursor::AwaitLength,
                }
            } else {
                SampleCursor::Passthrough { consumed_source: 0 }
            };
        }

        loop {
            match &mut self.cursor {
                SampleCursor::Avc { consumed_source, nal } => {
                    if *consumed_source >= source_size {
                        self.cursor = SampleCursor::VorbisPostfix;
                        break;
                    }
                    match *nal {
                        NalCursor::AwaitLength => {
                            let length_field = nal_length_field_length.unwrap_or(4) as usize;
                            let mut buf = [0u8; 4];
                            input.read_fully(&mut buf[4 - length_field..], 0, length_field)?;
                            let nal_len = u32::from_be_bytes(buf);
                            *consumed_source += length_field as u32;
                            *nal = NalCursor::AwaitStartCode { nal_len };
                        }
                        NalCursor::AwaitStartCode { nal_len } => {
                            let mut literal = LiteralInput::new(&AVC_START_CODE);
                            sink.sample_data(&mut literal, 4)?;
                            self.forwarded += 4;
                            *nal = NalCursor::CopyingPayload { remaining: nal_len };
                        }
                        NalCursor::CopyingPayload { remaining } => {
                            sink.sample_data(input, remaining as usize)?;
                            self.forwarded += remaining;
                            *consumed_source += remaining;
                            *nal = NalCursor::AwaitLength;
                        }
                    }
                }
                SampleCursor::Passthrough { consumed_source } => {
                    let remaining = source_size - *consumed_source;
                    if remaining > 0 {
                        sink.sample_data(input, remaining as usize)?;
                        self.forwarded += remaining;
                        *consumed_source += remaining;
                    }
                    self.cursor = SampleCursor::VorbisPostfix;
                }
                SampleCursor::VorbisPostfix => {
                    if codec_id == "A_VORBIS" {
                        let mut literal = LiteralInput::new(&VORBIS_POSTFIX);
                        sink.sample_data(&mut literal, 4)?;
                        self.forwarded += 4;
                    }
                    let encrypted = self.encrypted;
                    let forwarded = self.forwarded;
                    self.reset();
                    return Ok((forwarded, encrypted));
                }
                SampleCursor::Idle | SampleCursor::Encryption => unreachable!("resolved above"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct VecInput {
        bytes: VecDeque<u8>,
        pos: u64,
    }

    impl VecInput {
        fn new(data: Vec<u8>) -> Self {
            Self {
                bytes: data.into(),
                pos: 0,
            }
        }
    }

    impl ExtractorInput for VecInput {
        fn read_fully(&mut self, buf: &mut [u8], offset: usize, len: usize) -> Result<()> {
            if self.bytes.len() < len {
                return Err(ExtractorError::NeedMoreData);
            }
            for i in 0..len {
                buf[offset + i] = self.bytes.pop_front().unwrap();
            }
            self.pos += len as u64;
            Ok(())
        }

        fn skip_fully(&mut self, len: u64) -> Result<()> {
            for _ in 0..len {
                self.bytes.pop_front();
            }
            self.pos += len;
            Ok(())
        }

        fn get_position(&self) -> u64 {
            self.pos
        }
    }

    struct RecordingSink {
        data: Vec<u8>,
        metadata_calls: u32,
    }

    impl TrackOutput for RecordingSink {
        fn format(&mut self, _format: &crate::media::MediaFormat) {}

        fn sample_data(&mut self, src: &mut dyn ExtractorInput, len: usize) -> Result<()> {
            let mut buf = vec![0u8; len];
            src.read_fully(&mut buf, 0, len)?;
            self.data.extend(buf);
            Ok(())
        }

        fn sample_metadata(
            &mut self,
            _time_us: i64,
            _flags: crate::sample::SampleFlags,
            _size: u32,
            _offset: u32,
            _encryption_key_id: Option<&[u8]>,
        ) {
            self.metadata_calls += 1;
        }
    }

    fn single_byte_track_number(n: u8) -> u8 {
        0x80 | n
    }

    #[test]
    fn none_lacing_computes_single_sample_size() {
        let mut data = vec![single_byte_track_number(1)];
        data.extend([0, 0, 0x00]); // timecode=0, flags=0 (lacing=NONE)
        data.extend([1, 2, 3, 4, 5]);
        let total = data.len() as u64;

        let mut input = VecInput::new(data);
        let mut parser = BlockHeaderParser::new();
        let parsed = parser.read(&mut input, true, total).unwrap();
        assert_eq!(parsed.sample_sizes, vec![5]);
        assert_eq!(parsed.header.track_number, 1);
        assert_eq!(parsed.header.lacing, Lacing::None);
    }

    #[test]
    fn xiph_lacing_splits_into_declared_sizes() {
        let mut data = vec![single_byte_track_number(1)];
        data.extend([0, 0, 0x02]); // lacing = XIPH (bits 1..2 = 01)
        data.push(1); // count - 1 = 1 => 2 samples
        data.push(3); // first sample size = 3
        data.extend([9, 9, 9]); // first sample payload
        data.extend([7, 7]); // second (remainder) sample payload, size 2
        let total = data.len() as u64;

        let mut input = VecInput::new(data);
        let mut parser = BlockHeaderParser::new();
        let parsed = parser.read(&mut input, true, total).unwrap();
        assert_eq!(parsed.sample_sizes, vec![3, 2]);
    }

    #[test]
    fn fixed_size_lacing_divides_evenly() {
        let mut data = vec![single_byte_track_number(1)];
        data.extend([0, 0, 0x04]); // lacing = FIXED_SIZE (bits 01 -> value 2 -> 0x04)
        data.push(2); // count - 1 = 2 => 3 samples
        data.extend(std::iter::repeat(0xAA).take(9));
        let total = data.len() as u64;

        let mut input = VecInput::new(data);
        let mut parser = BlockHeaderParser::new();
        let parsed = parser.read(&mut input, true, total).unwrap();
        assert_eq!(parsed.sample_sizes, vec![3, 3, 3]);
    }

    #[test]
    fn lacing_on_block_group_is_rejected() {
        let mut data = vec![single_byte_track_number(1)];
        data.extend([0, 0, 0x02]);
        let total = data.len() as u64 + 10;

        let mut input = VecInput::new(data);
        let mut parser = BlockHeaderParser::new();
        assert!(parser.read(&mut input, false, total).is_err());
    }

    #[test]
    fn passthrough_payload_forwards_verbatim() {
        let mut writer = SamplePayloadWriter::new();
        let mut input = VecInput::new(vec![1, 2, 3, 4]);
        let mut sink = RecordingSink {
            data: Vec::new(),
            metadata_calls: 0,
        };
        let (size, encrypted) = writer.write(&mut input, &mut sink, 4, "A_OPUS", None, false).unwrap();
        assert_eq!(size, 4);
        assert!(!encrypted);
        assert_eq!(sink.data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn avc_payload_rewrites_length_prefix_to_start_code() {
        let mut writer = SamplePayloadWriter::new();
        let mut data = vec![0, 0, 0, 2]; // 4-byte length prefix = 2
        data.extend([0xAA, 0xBB]);
        let total = data.len() as u32;
        let mut input = VecInput::new(data);
        let mut sink = RecordingSink {
            data: Vec::new(),
            metadata_calls: 0,
        };
        let (_, _) = writer.write(&mut input, &mut sink, total, CODEC_AVC, Some(4), false).unwrap();
        assert_eq!(sink.data, vec![0, 0, 0, 1, 0xAA, 0xBB]);
    }

    #[test]
    fn vorbis_payload_gets_four_byte_postfix() {
        let mut writer = SamplePayloadWriter::new();
        let mut input = VecInput::new(vec![9, 9]);
        let mut sink = RecordingSink {
            data: Vec::new(),
            metadata_calls: 0,
        };
        let (size, _) = writer.write(&mut input, &mut sink, 2, "A_VORBIS", None, false).unwrap();
        assert_eq!(size, 6);
        assert_eq!(sink.data, vec![9, 9, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn encryption_signal_byte_rewritten_to_iv_size() {
        let mut writer = SamplePayloadWriter::new();
        let mut input = VecInput::new(vec![0x01, 1, 2, 3]);
        let mut sink = RecordingSink {
            data: Vec::new(),
            metadata_calls: 0,
        };
        let (forwarded, encrypted) = writer.write(&mut input, &mut sink, 4, "A_OPUS", None, true).unwrap();
        assert!(encrypted);
        assert_eq!(sink.data, vec![ENCRYPTION_IV_SIZE, 1, 2, 3]);
        assert_eq!(forwarded, sink.data.len() as u32);
    }

    #[test]
    fn unencrypted_signal_byte_forwards_nothing_extra() {
        let mut writer = SamplePayloadWriter::new();
        let mut input = VecInput::new(vec![0x00, 1, 2, 3]);
        let mut sink = RecordingSink {
            data: Vec::new(),
            metadata_calls: 0,
        };
        let (forwarded, encrypted) = writer.write(&mut input, &mut sink, 4, "A_OPUS", None, true).unwrap();
        assert!(!encrypted);
        assert_eq!(sink.data, vec![1, 2, 3]);
        assert_eq!(forwarded, sink.data.len() as u32);
    }

    #[test]
    fn resumed_encrypted_sample_reports_full_size() {
        let mut writer = SamplePayloadWriter::new();
        let mut sink = RecordingSink {
            data: Vec::new(),
            metadata_calls: 0,
        };

        // Only the signal byte is available on the first call; the rest of
        // the sample arrives later, forcing a suspend-and-resume.
        let mut input = VecInput::new(vec![0x01]);
        match writer.write(&mut input, &mut sink, 4, "A_OPUS", None, true) {
            Err(ExtractorError::NeedMoreData) => {}
            other => panic!("expected NeedMoreData, got {other:?}"),
        }
        assert_eq!(sink.data, vec![ENCRYPTION_IV_SIZE]);

        let mut input = VecInput::new(vec![1, 2, 3]);
        let (forwarded, encrypted) = writer.write(&mut input, &mut sink, 4, "A_OPUS", None, true).unwrap();
        assert!(encrypted);
        assert_eq!(sink.data, vec![ENCRYPTION_IV_SIZE, 1, 2, 3]);
        assert_eq!(forwarded, sink.data.len() as u32);
    }

}
