//! # EBML Varint Reader
//!
//! EBML element IDs and content sizes are both encoded as variable-length
//! integers: the number of leading zero bits in the first byte before the
//! first set bit gives the encoded length, and the set bit itself is a
//! length marker that element IDs keep (it disambiguates IDs of different
//! byte-lengths that would otherwise collide) but sizes strip.

use crate::error::{ExtractorError, Result};

/// Maximum length in bytes of an EBML varint this reader accepts (the
/// format theoretically allows up to 8; element IDs in practice use at
/// most 4).
const MAX_LENGTH: u32 = 8;

/// Decodes one EBML variable-length unsigned integer from the front of
/// `data`. Returns `(value, length_in_bytes)`.
///
/// `remove_length_mask`: when true (content sizes), the leading marker bit
/// is cleared from the value; when false (element IDs), it's kept so IDs
/// of different encoded lengths never collide.
///
/// `allow_oversize`: per the Matroska "unknown size" convention, a size
/// field that is all-ones within its length marker's data bits (e.g.
/// `0x01FFFFFFFFFFFFFF` at length 8) means "unknown, extends to end of
/// parent" rather than a literal value of that magnitude. Callers that
/// don't expect an unknown size (element IDs) pass `false` and get a
/// `ParseError` if every data bit is set.
pub fn read_varint(data: &[u8], allow_oversize: bool, remove_length_mask: bool) -> Result<(u64, u32)> {
    if data.is_empty() {
        return Err(ExtractorError::NeedMoreData);
    }

    let first = data[0];
    let mut length = 0u32;
    for k in 0..8 {
        if first & (0x80 >> k) != 0 {
            length = k + 1;
            break;
        }
    }
    if length == 0 {
        return Err(ExtractorError::parse("ebml varint: no length marker bit set"));
    }
    if length > MAX_LENGTH {
        return Err(ExtractorError::unsupported("ebml varint: length exceeds 8 bytes"));
    }
    if (data.len() as u32) < length {
        return Err(ExtractorError::NeedMoreData);
    }

    let mut value: u64 = if remove_length_mask {
        (first & !(0x80u8 >> (length - 1))) as u64
    } else {
        first as u64
    };
    for &b in &data[1..length as usize] {
        value = (value << 8) | b as u64;
    }

    if !allow_oversize {
        let data_bits = 7 * length;
        let all_ones = if data_bits >= 64 { u64::MAX } else { (1u64 << data_bits) - 1 };
        let masked = if remove_length_mask {
            value
        } else {
            value & all_ones
        };
        if masked == all_ones {
            return Err(ExtractorError::parse("ebml varint: oversize (unknown-size) value not allowed here"));
        }
    }

    Ok((value, length))
}

/// Stateful wrapper used by callers (the EBML tree reader, the block
/// lacing parser) that need `get_last_length()` after the fact rather
/// than threading the length through every call site.
#[derive(Debug, Default)]
pub struct VarintReader {
    last_length: u32,
}

impl VarintReader {
    /// Creates a reader with no varint read yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads one varint from the front of `data`, recording its encoded
    /// length for `get_last_length()`.
    pub fn read(&mut self, data: &[u8], allow_oversize: bool, remove_length_mask: bool) -> Result<u64> {
        let (value, length) = read_varint(data, allow_oversize, remove_length_mask)?;
        self.last_length = length;
        Ok(value)
    }

    /// The encoded length in bytes of the most recently read varint.
    pub fn get_last_length(&self) -> u32 {
        self.last_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte_varint() {
        let (value, len) = read_varint(&[0x81], false, true).unwrap();
        assert_eq!(value, 1);
        assert_eq!(len, 1);
    }

    #[test]
    fn two_byte_varint_strips_mask() {
        // length marker is bit 6 (second byte length); 0x40 | 0x01 => value 1
        let (value, len) = read_varint(&[0x40 | 0x01, 0xFF], false, true).unwrap();
        assert_eq!(len, 2);
        assert_eq!(value, (1u64 << 8) | 0xFF);
    }

    #[test]
    fn element_id_keeps_length_mask() {
        let (value, len) = read_varint(&[0x1A, 0x45, 0xDF, 0xA3], false, false).unwrap();
        assert_eq!(len, 4);
        assert_eq!(value, 0x1A45DFA3);
    }

    #[test]
    fn needs_more_data_when_truncated() {
        match read_varint(&[0x10], false, true) {
            Err(ExtractorError::NeedMoreData) => {}
            other => panic!("expected NeedMoreData, got {other:?}"),
        }
    }

    #[test]
    fn no_marker_bit_is_parse_error() {
        match read_varint(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], false, true) {
            Err(ExtractorError::Parse(_)) => {}
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn oversize_size_rejected_unless_allowed() {
        let data = [0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert!(read_varint(&data, false, true).is_err());
        let (value, len) = read_varint(&data, true, true).unwrap();
        assert_eq!(len, 8);
        assert_eq!(value, (1u64 << 56) - 1);
    }

    #[quickcheck_macros::quickcheck]
    fn roundtrip_single_byte(n: u8) -> bool {
        let masked = n & 0x7F;
        let byte = 0x80 | masked;
        matches!(read_varint(&[byte], false, true), Ok((v, 1)) if v == masked as u64)
    }
}
