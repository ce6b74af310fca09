//! # ADTS/AAC Elementary Reader
//!
//! Frames self-synchronizing ADTS AAC into one sample per frame. Unlike the
//! H.264 reader, ADTS framing doesn't need PES-header PTS per frame — the
//! first frame of a PES packet uses the PES PTS, and every following frame
//! in the same (or a later) PES packet advances by one frame duration,
//! derived from the sample rate once the first header is parsed.

use crate::bitcursor::BitCursor;
use crate::error::{ExtractorError, Result};
use crate::media::{MediaFormat, TrackType};
use crate::sample::{Sample, SampleFlags, SamplePool};
use std::collections::VecDeque;

const ADTS_SAMPLE_RATES: [u32; 13] = [
    96_000, 88_200, 64_000, 48_000, 44_100, 32_000, 24_000, 22_050, 16_000, 12_000, 11_025, 8_000,
    7_350,
];

/// Frames ADTS/AAC frames into samples with per-frame derived timestamps.
#[derive(Debug)]
pub struct AacReader {
    format: Option<MediaFormat>,
    buffer: BitCursor,
    queue: VecDeque<Sample>,
}

impl AacReader {
    /// Creates a reader with no format known yet (AAC's sample rate and
    /// channel count are only known once the first ADTS header is parsed).
    pub fn new() -> Self {
        Self {
            format: None,
            buffer: BitCursor::new(),
            queue: VecDeque::new(),
        }
    }

    /// The track's format, once the first ADTS header has been parsed.
    pub fn format(&self) -> Option<&MediaFormat> {
        self.format.as_ref()
    }

    /// Pops the next queued frame, if any.
    pub fn pop_sample(&mut self) -> Option<Sample> {
        self.queue.pop_front()
    }

    /// Consumes one PES packet's reassembled payload.
    pub fn consume(&mut self, payload: &[u8], pes_time_us: i64, pool: &mut SamplePool) -> Result<()> {
        self.buffer.extend(payload);

        let frame_duration_us = match self.format.as_ref().and_then(|f| f.sample_rate) {
            Some(sample_rate) if sample_rate > 0 => 1_000_000i64 * 1024 / sample_rate as i64,
            _ => 0,
        };

        let mut i = 0i64;
        loop {
            let time_us = pes_time_us + i * frame_duration_us;
            if !self.try_emit_frame(time_us, pool)? {
                break;
            }
            i += 1;
        }
        Ok(())
    }

    /// Attempts to emit one ADTS frame starting at the next sync word.
    /// Returns `Ok(false)` (not an error) when there isn't enough data yet;
    /// the already-scanned prefix up to the sync word is dropped so the
    /// next call's scan restarts at the retained sync word.
    fn try_emit_frame(&mut self, time_us: i64, pool: &mut SamplePool) -> Result<bool> {
        let sync_offset = match self.buffer.find_next_adts_sync_word() {
            Some(offset) => offset,
            None => return Ok(false),
        };
        self.buffer.skip_bytes(sync_offset - self.buffer.byte_position())?;

        if self.buffer.bytes_left() < 7 {
            self.buffer.clear_read_data();
            return Ok(false);
        }

        self.buffer.save_offset();
        match self.parse_and_emit(time_us, pool) {
            Ok(emitted) => Ok(emitted),
            Err(ExtractorError::NeedMoreData) => {
                self.buffer.restore_offset();
                self.buffer.clear_read_data();
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn parse_and_emit(&mut self, time_us: i64, pool: &mut SamplePool) -> Result<bool> {
        self.buffer.skip_bits(15)?; // sync_word(12) + id(1) + layer(2)
        // Bound directly to the wire's protection_absent bit: 0 means the
        // frame carries a trailing CRC.
        let has_crc = self.buffer.read_bits(1)?;

        if self.format.is_none() {
            let object_type = self.buffer.read_bits(2)? + 1;
            let sample_rate_index = self.buffer.read_bits(4)?;
            self.buffer.skip_bits(1)?; // private_bit
            let channel_config = self.buffer.read_bits(3)?;

            let sample_rate = ADTS_SAMPLE_RATES
                .get(sample_rate_index as usize)
                .copied()
                .unwrap_or(0);
            let channels = if channel_config == 7 { 8 } else { channel_config };

            let asc = [
                ((object_type as u8) << 3) | ((sample_rate_index as u8) >> 1),
                (((sample_rate_index as u8) & 0x01) << 7) | ((channel_config as u8) << 3),
            ];

            let mut format = MediaFormat::new("aac", TrackType::Audio);
            format.sample_rate = Some(sample_rate);
            format.channels = Some(channels);
            format.codec_private = vec![asc.to_vec()];
            self.format = Some(format);
        } else {
            self.buffer.skip_bits(10)?;
        }

        self.buffer.skip_bits(4)?; // original_copy + home + copyright_id_bit + copyright_id_start
        let frame_size_raw = self.buffer.read_bits(13)?;
        self.buffer.skip_bits(13)?; // buffer_fullness(11) + number_of_raw_data_blocks(2)

        let frame_size = if has_crc == 0 {
            self.buffer.skip_bytes(2)?;
            frame_size_raw.saturating_sub(9)
        } else {
            frame_size_raw.saturating_sub(7)
        } as usize;

        if frame_size > self.buffer.bytes_left() {
            self.buffer.restore_offset();
            self.buffer.clear_read_data();
            return Ok(false);
        }

        let mut sample = pool.checkout();
        sample.append(&self.buffer.remaining()[..frame_size]);
        sample.add_flags(SampleFlags::SYNC);
        sample.set_time_us(time_us);
        self.buffer.skip_bytes(frame_size)?;
        self.buffer.clear_read_data();
        self.queue.push_back(sample);
        Ok(true)
    }
}

impl Default for AacReader {
    fn default() -> Self {
        Self::new()
    }
}
