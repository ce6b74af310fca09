//! # PAT / PMT Readers
//!
//! Program Specific Information readers. Both are installed at well-known
//! or discovered PIDs by [`crate::ts::extractor::TsExtractor`] and consume
//! one PSI section per call to `consume`.
//!
//! Per §4.2: on `payload_unit_start`, a PSI payload begins with a one-byte
//! pointer field giving the number of stuffing bytes before the section
//! proper starts; both readers skip it the same way. CRC_32 at the end of
//! each section is present on the wire but never checked (§1 Non-goals).

use crate::bitcursor::BitCursor;
use crate::error::Result;
use crate::ts::types::ElementaryStreamInfo;
use smallvec::SmallVec;

/// Reads the Program Association Table and discovers the first program's
/// PMT PID. Only the first PAT section that yields a program is honored;
/// subsequent PAT packets are parsed but ignored once a PMT PID is known,
/// matching §4.2 ("Only the first program is taken").
#[derive(Debug, Default)]
pub struct PatReader {
    pmt_pid: Option<u16>,
}

impl PatReader {
    /// Creates a reader with no PMT PID discovered yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one TS packet's payload for the PAT PID. Returns the PMT
    /// PID the first time one is discovered; `None` on every other call
    /// (including once a PMT PID is already known).
    pub fn consume(&mut self, payload_unit_start: bool, payload: &[u8]) -> Result<Option<u16>> {
        if self.pmt_pid.is_some() {
            return Ok(None);
        }

        let mut cursor = BitCursor::from_bytes(payload.to_vec());
        if payload_unit_start {
            let pointer_field = cursor.read_bits(8)?;
            cursor.skip_bytes(pointer_field as usize)?;
        }

        // table_id(8) + section_syntax(1) + reserved(3) + section_length(12)
        // + transport_stream_id(16) + reserved(2) + version(5) + current_next(1)
        // + section_number(8) + last_section_number(8) = 64 bits total.
        cursor.skip_bits(64)?;

        // reserved(3) + program_number is read as 16 bits program_number
        // followed by reserved(3) + PID(13); per §4.2 we skip 19 bits then
        // read the 13-bit PID directly, which folds the program_number's
        // own 16 bits plus the 3 reserved bits preceding the PID into the
        // single skip (we only care about the first program entry).
        cursor.skip_bits(19)?;
        let pid = cursor.read_bits(13)? as u16;

        self.pmt_pid = Some(pid);
        Ok(Some(pid))
    }
}

/// Reads the Program Map Table for the program selected by [`PatReader`]
/// and reports the elementary streams it enumerates.
#[derive(Debug, Default)]
pub struct PmtReader {
    parsed: bool,
}

impl PmtReader {
    /// Creates a reader that hasn't parsed a section yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one TS packet's payload for the PMT PID. Returns the
    /// enumerated elementary streams the first time a section is parsed;
    /// `None` on subsequent calls.
    pub fn consume(
        &mut self,
        payload_unit_start: bool,
        payload: &[u8],
    ) -> Result<Option<SmallVec<[ElementaryStreamInfo; 4]>>> {
        if self.parsed {
            return Ok(None);
        }

        let mut cursor = BitCursor::from_bytes(payload.to_vec());
        if payload_unit_start {
            let pointer_field = cursor.read_bits(8)?;
            cursor.skip_bytes(pointer_field as usize)?;
        }

        cursor.skip_bits(12)?;
        let section_length = cursor.read_bits(12)? as usize;
        // table_id + section_syntax/reserved/section_length already consumed
        // 24 bits; section_length counts everything from here to the end of
        // the section including the trailing CRC_32.
        let section_end_bit = cursor.byte_position() * 8 + section_length * 8;

        // program_number(16) + reserved(2) + version(5) + current_next(1)
        // + section_number(8) + last_section_number(8) + reserved(3)
        // + PCR_PID(13) = 60 bits.
        cursor.skip_bits(60)?;

        let program_info_length = cursor.read_bits(12)? as usize;
        cursor.skip_bytes(program_info_length)?;

        let mut streams = SmallVec::new();
        loop {
            let remaining_bits = section_end_bit.saturating_sub(cursor.byte_position() * 8);
            // 4 trailing bytes are the CRC_32, never parsed as an entry.
            if remaining_bits < (5 * 8) + (4 * 8) {
                break;
            }

            let stream_type = cursor.read_bits(8)? as u8;
            cursor.skip_bits(3)?;
            let elementary_pid = cursor.read_bits(13)? as u16;
            cursor.skip_bits(4)?;
            let es_info_length = cursor.read_bits(12)? as usize;
            cursor.skip_bytes(es_info_length)?;

            streams.push(ElementaryStreamInfo {
                stream_type,
                elementary_pid,
            });
        }

        self.parsed = true;
        Ok(Some(streams))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::types::{STREAM_TYPE_AAC, STREAM_TYPE_H264};

    fn build_pat_section(pmt_pid: u16) -> Vec<u8> {
        let mut out = vec![0u8];
        out.push(0x00); // table_id
        let section_length: u16 = 13;
        out.push(0x80 | ((section_length >> 8) as u8));
        out.push(section_length as u8);
        out.extend_from_slice(&[0x00, 0x01]); // transport_stream_id
        out.push(0xC1); // version/current_next
        out.extend_from_slice(&[0x00, 0x00]); // section/last_section
        out.extend_from_slice(&[0x00, 0x01]); // program_number = 1
        out.push(0xE0 | ((pmt_pid >> 8) as u8));
        out.push(pmt_pid as u8);
        out.extend_from_slice(&[0, 0, 0, 0]); // CRC placeholder
        out
    }

    fn build_pmt_section(entries: &[(u8, u16)]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&[0x00, 0x01]); // program_number
        body.push(0xC1);
        body.extend_from_slice(&[0x00, 0x00]);
        body.extend_from_slice(&[0xE1, 0x00]); // PCR PID
        body.extend_from_slice(&[0xF0, 0x00]); // program_info_length = 0
        for (stream_type, pid) in entries {
            body.push(*stream_type);
            body.push(0xE0 | ((pid >> 8) as u8));
            body.push(*pid as u8);
            body.extend_from_slice(&[0xF0, 0x00]);
        }

        let section_length = (body.len() + 4) as u16;
        let mut out = vec![0u8];
        out.push(0x02); // table_id
        out.push(0x80 | ((section_length >> 8) as u8));
        out.push(section_length as u8);
        out.extend_from_slice(&body);
        out.extend_from_slice(&[0, 0, 0, 0]); // CRC placeholder
        out
    }

    #[test]
    fn pat_discovers_first_program_pmt_pid() {
        let mut reader = PatReader::new();
        let payload = build_pat_section(0x1000);
        let pmt_pid = reader.consume(true, &payload).unwrap();
        assert_eq!(pmt_pid, Some(0x1000));
        // Second call with pmt already known is a no-op.
        assert_eq!(reader.consume(true, &payload).unwrap(), None);
    }

    #[test]
    fn pmt_enumerates_elementary_streams() {
        let mut reader = PmtReader::new();
        let payload = build_pmt_section(&[(STREAM_TYPE_H264, 0x100), (STREAM_TYPE_AAC, 0x101)]);
        let streams = reader.consume(true, &payload).unwrap().unwrap();
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].stream_type, STREAM_TYPE_H264);
        assert_eq!(streams[0].elementary_pid, 0x100);
        assert_eq!(streams[1].stream_type, STREAM_TYPE_AAC);
        assert_eq!(streams[1].elementary_pid, 0x101);
    }
}
