//! # PES Reassembler
//!
//! One instance per elementary PID. Concatenates TS packet payloads into a
//! persistent cursor, slicing a complete PES packet whenever a new
//! `payload_unit_start` arrives; the previous packet's header is parsed and
//! its payload handed to the elementary reader at that point.

use crate::bitcursor::BitCursor;
use crate::error::{ExtractorError, Result};
use crate::ts::types::pts_to_time_us;

/// A parsed PES header plus the byte range of its payload within the
/// cursor it was parsed from.
#[derive(Debug)]
pub struct PesPayload {
    /// Presentation timestamp derived from the PES header's PTS, if present.
    pub time_us: Option<i64>,
    /// Payload bytes with the PES header stripped.
    pub payload: Vec<u8>,
}

/// Accumulates TS packet payloads for one elementary PID and slices complete
/// PES packets on payload-unit-start boundaries.
#[derive(Debug, Default)]
pub struct PesReassembler {
    buffer: BitCursor,
}

impl PesReassembler {
    /// Creates an empty reassembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one TS packet's payload bytes. On `payload_unit_start` with a
    /// non-empty buffer, the previously accumulated PES packet is parsed
    /// and returned before the new payload is appended.
    pub fn push(&mut self, payload_unit_start: bool, payload: &[u8]) -> Result<Option<PesPayload>> {
        let mut flushed = None;
        if payload_unit_start && !self.buffer.is_empty() {
            flushed = Some(parse_pes(&mut self.buffer)?);
            self.buffer.reset();
        }
        self.buffer.extend(payload);
        Ok(flushed)
    }

    /// Resets reassembly state, discarding any partially accumulated PES
    /// packet.
    pub fn reset(&mut self) {
        self.buffer.reset();
    }
}

/// Parses one complete PES packet out of `cursor`, which must hold exactly
/// one PES packet's bytes starting at `start_code_prefix`.
fn parse_pes(cursor: &mut BitCursor) -> Result<PesPayload> {
    let start_code_prefix = cursor.read_bits(24)?;
    if start_code_prefix != 0x000001 {
        return Err(ExtractorError::parse("pes: bad start code prefix"));
    }
    let _stream_id = cursor.read_bits(8)?;
    let packet_length = cursor.read_bits(16)? as usize;

    cursor.skip_bits(8)?; // scrambling_control, priority, data_alignment, copyright, original
    let pts_dts_flags = cursor.read_bits(2)?;
    cursor.skip_bits(6)?; // escr, es_rate, dsm_trick_mode, additional_copy_info, crc, extension
    let header_data_length = cursor.read_bits(8)? as usize;

    let mut time_us = None;
    let mut consumed = 0usize;
    if pts_dts_flags & 0b10 != 0 {
        let pts = read_timestamp_33(cursor)?;
        time_us = Some(pts_to_time_us(pts));
        consumed += 5;
        if pts_dts_flags == 0b11 {
            // Fixes the upstream bug of only ever consuming the PTS field:
            // when both PTS and DTS are signaled, the 5-byte DTS field
            // must also be consumed so the optional header is fully
            // skipped before the payload begins.
            let _dts = read_timestamp_33(cursor)?;
            consumed += 5;
        }
    }
    cursor.skip_bytes(header_data_length.saturating_sub(consumed))?;

    let payload_size = if packet_length == 0 {
        cursor.bytes_left()
    } else {
        packet_length.saturating_sub(header_data_length).saturating_sub(3)
    };

    let available = cursor.bytes_left();
    let take = payload_size.min(available);
    let payload = cursor.remaining()[..take].to_vec();
    cursor.skip_bytes(take)?;

    Ok(PesPayload { time_us, payload })
}

/// Reads a 33-bit PTS/DTS timestamp encoded as 4+3+1+15+1+15+1 bits (the
/// leading 4-bit field is the marker nibble: `0010` for PTS-only, `0011`/
/// `0001` for PTS/DTS pairs — not re-validated here since the caller
/// already knows from `pts_dts_flags` which field it's reading).
fn read_timestamp_33(cursor: &mut BitCursor) -> Result<i64> {
    cursor.skip_bits(4)?;
    let high = cursor.read_bits(3)? as i64;
    cursor.skip_bits(1)?;
    let mid = cursor.read_bits(15)? as i64;
    cursor.skip_bits(1)?;
    let low = cursor.read_bits(15)? as i64;
    cursor.skip_bits(1)?;
    Ok((high << 30) | (mid << 15) | low)
}
