//! # Bit Cursor
//!
//! A mutable, owned, growable byte buffer with a bit-granularity read
//! cursor. Both extractors use it to stage bytes arriving from the input
//! abstraction and to read fixed-width and variable-width fields out of
//! them without copying into a fresh scratch slice for every field.
//!
//! Unlike a plain `&[u8]` reader, a `BitCursor` owns its storage so PES
//! payloads (TS) and EBML scratch reads (WebM) can be appended to across
//! suspension points and have their already-consumed prefix dropped once
//! a full element has been read.

use crate::error::{ExtractorError, Result};
use bytes::BytesMut;

/// A growable byte buffer with a bit-addressed read cursor.
#[derive(Debug, Default)]
pub struct BitCursor {
    data: BytesMut,
    byte_pos: usize,
    bit_pos: u8,
    saved_byte_pos: Option<usize>,
}

impl BitCursor {
    /// Creates an empty cursor.
    pub fn new() -> Self {
        Self {
            data: BytesMut::new(),
            byte_pos: 0,
            bit_pos: 0,
            saved_byte_pos: None,
        }
    }

    /// Wraps existing bytes, with the read cursor at the start.
    pub fn from_bytes(bytes: impl Into<BytesMut>) -> Self {
        Self {
            data: bytes.into(),
            byte_pos: 0,
            bit_pos: 0,
            saved_byte_pos: None,
        }
    }

    /// Appends raw bytes to the end of the buffer without moving the read
    /// cursor. Used when new input bytes arrive for an element already in
    /// progress.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Number of whole bytes available to read from the cursor's current
    /// position to the end of the buffer.
    pub fn bytes_left(&self) -> usize {
        self.data.len().saturating_sub(self.byte_pos)
    }

    /// Total buffered length, irrespective of read position.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the buffer holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current byte offset of the read cursor.
    pub fn byte_position(&self) -> usize {
        self.byte_pos
    }

    /// Raw bytes from the current read position to the end of the buffer.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.byte_pos..]
    }

    /// Raw bytes of the whole buffer, irrespective of read position.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Reads `n` bits (1..=32), MSB-first, advancing the cursor.
    pub fn read_bits(&mut self, n: u32) -> Result<u32> {
        debug_assert!(n >= 1 && n <= 32);
        Ok(self.read_bits_long(n)? as u32)
    }

    /// Reads `n` bits (1..=64), MSB-first, advancing the cursor.
    pub fn read_bits_long(&mut self, n: u32) -> Result<u64> {
        debug_assert!(n >= 1 && n <= 64);
        let mut result: u64 = 0;
        let mut bits_left = n;

        while bits_left > 0 {
            if self.byte_pos >= self.data.len() {
                return Err(ExtractorError::NeedMoreData);
            }
            let byte = self.data[self.byte_pos];
            let bits_in_byte = 8 - self.bit_pos as u32;
            let bits_to_read = bits_in_byte.min(bits_left);

            let shift = bits_in_byte - bits_to_read;
            let mask = ((1u16 << bits_to_read) - 1) as u8;
            let chunk = (byte >> shift) & mask;

            result = (result << bits_to_read) | chunk as u64;

            self.bit_pos += bits_to_read as u8;
            if self.bit_pos >= 8 {
                self.byte_pos += 1;
                self.bit_pos = 0;
            }
            bits_left -= bits_to_read;
        }

        Ok(result)
    }

    /// Skips `n` bits without returning them.
    pub fn skip_bits(&mut self, n: u32) -> Result<()> {
        let total_bits = self.byte_pos as u64 * 8 + self.bit_pos as u64 + n as u64;
        let new_byte_pos = (total_bits / 8) as usize;
        if new_byte_pos > self.data.len() {
            return Err(ExtractorError::NeedMoreData);
        }
        self.byte_pos = new_byte_pos;
        self.bit_pos = (total_bits % 8) as u8;
        Ok(())
    }

    /// Skips `n` whole bytes. The cursor must already be byte-aligned.
    pub fn skip_bytes(&mut self, n: usize) -> Result<()> {
        debug_assert_eq!(self.bit_pos, 0, "skip_bytes requires byte alignment");
        if self.byte_pos + n > self.data.len() {
            return Err(ExtractorError::NeedMoreData);
        }
        self.byte_pos += n;
        Ok(())
    }

    /// Byte-aligned copy of `n_bytes` from `source`'s current read position,
    /// advancing both cursors. Used by the PES reassembler to move a TS
    /// packet's payload into the per-PID staging buffer.
    pub fn append(&mut self, source: &mut BitCursor, n_bytes: usize) -> Result<()> {
        debug_assert_eq!(source.bit_pos, 0, "append requires byte alignment");
        if source.byte_pos + n_bytes > source.data.len() {
            return Err(ExtractorError::NeedMoreData);
        }
        self.data
            .extend_from_slice(&source.data[source.byte_pos..source.byte_pos + n_bytes]);
        source.byte_pos += n_bytes;
        Ok(())
    }

    /// Resets the cursor to an empty state, discarding all buffered bytes.
    pub fn reset(&mut self) {
        self.data.clear();
        self.byte_pos = 0;
        self.bit_pos = 0;
        self.saved_byte_pos = None;
    }

    /// Drops the already-consumed prefix of the buffer, shifting the read
    /// cursor back to its start. Used once a whole element has been parsed
    /// out of a cursor that keeps accumulating bytes across calls.
    pub fn clear_read_data(&mut self) {
        if self.byte_pos == 0 {
            return;
        }
        let _ = self.data.split_to(self.byte_pos);
        self.byte_pos = 0;
        self.bit_pos = 0;
    }

    /// Saves the current byte offset so it can be restored with
    /// `restore_offset`. A second call overwrites the previously saved
    /// offset; there is no stack.
    pub fn save_offset(&mut self) {
        self.saved_byte_pos = Some(self.byte_pos);
    }

    /// Restores the byte offset saved by `save_offset`, dropping any
    /// partial within-byte position. No-op if nothing was saved.
    pub fn restore_offset(&mut self) {
        if let Some(pos) = self.saved_byte_pos.take() {
            self.byte_pos = pos;
            self.bit_pos = 0;
        }
    }

    /// Scans forward from `start_offset` for a three-byte Annex-B start
    /// code (`00 00 01`) followed by a NAL header whose low 5 bits equal
    /// `nal_type`. Returns the byte offset of the start of the start code,
    /// or `None` if no match is found before the end of the buffer.
    pub fn find_next_nal_unit(&self, nal_type: u8, start_offset: usize) -> Option<usize> {
        let data = &self.data[..];
        if data.len() < 4 {
            return None;
        }
        let mut i = start_offset;
        while i + 3 < data.len() {
            if data[i] == 0x00 && data[i + 1] == 0x00 && data[i + 2] == 0x01 {
                if (data[i + 3] & 0x1F) == nal_type {
                    return Some(i);
                }
            }
            i += 1;
        }
        None
    }

    /// Scans forward from the cursor's current read position for the
    /// 12-bit ADTS sync word (`0xFFF`), byte-aligned. Returns the byte
    /// offset of the first sync byte, or `None` if not found.
    pub fn find_next_adts_sync_word(&self) -> Option<usize> {
        let data = &self.data[self.byte_pos..];
        if data.len() < 2 {
            return None;
        }
        for i in 0..data.len() - 1 {
            if data[i] == 0xFF && (data[i + 1] & 0xF0) == 0xF0 {
                return Some(self.byte_pos + i);
            }
        }
        None
    }
}
