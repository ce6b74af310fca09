//! # Codec Private Parsers
//!
//! `CodecPrivate` is an opaque binary blob whose layout depends entirely
//! on `CodecID`; §4.12 specifies three of them. Each returns the list of
//! initialization blobs the track's `MediaFormat::codec_private` carries
//! forward to the decoder, in the order a decoder expects them.

use crate::error::{ExtractorError, Result};

/// Parses an H.264 `AVCDecoderConfigurationRecord` (the `V_MPEG4/ISO/AVC`
/// `CodecPrivate` layout). Returns `(nal_length_field_length, nal_units)`
/// where `nal_units` is the SPS list followed by the PPS list, each a
/// bare NAL unit (no start code, no length prefix).
pub fn parse_avc_config_record(data: &[u8]) -> Result<(u8, Vec<Vec<u8>>)> {
    if data.len() < 6 {
        return Err(ExtractorError::parse("avcC: record shorter than fixed header"));
    }

    let length_size_minus_one = data[4] & 0x03;
    let nal_length_field_length = length_size_minus_one + 1;
    if nal_length_field_length == 3 {
        return Err(ExtractorError::parse("avcC: nal_unit_length_field_length of 3 is invalid"));
    }

    let mut pos = 5usize;
    let mut nal_units = Vec::new();

    let num_sps = (*data.get(pos).ok_or_else(too_short)? & 0x1F) as usize;
    pos += 1;
    for _ in 0..num_sps {
        pos = read_length_prefixed_nal(data, pos, &mut nal_units)?;
    }

    let num_pps = *data.get(pos).ok_or_else(too_short)? as usize;
    pos += 1;
    for _ in 0..num_pps {
        pos = read_length_prefixed_nal(data, pos, &mut nal_units)?;
    }

    Ok((nal_length_field_length, nal_units))
}

fn read_length_prefixed_nal(data: &[u8], pos: usize, out: &mut Vec<Vec<u8>>) -> Result<usize> {
    let len_bytes = data.get(pos..pos + 2).ok_or_else(too_short)?;
    let len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
    let start = pos + 2;
    let nal = data.get(start..start + len).ok_or_else(too_short)?;
    out.push(nal.to_vec());
    Ok(start + len)
}

fn too_short() -> ExtractorError {
    ExtractorError::parse("avcC: truncated SPS/PPS table")
}

/// Parses a Vorbis `CodecPrivate` blob (`A_VORBIS`): the identification
/// and setup headers bundled with a discarded comment header in between,
/// per the `xiph_lacing`-style three-header packing. Returns
/// `(identification_header, setup_header)`.
pub fn parse_vorbis_codec_private(data: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    if data.first() != Some(&0x02) {
        return Err(ExtractorError::parse("vorbis codec private: expected magic byte 0x02"));
    }

    let mut pos = 1usize;
    let (info_length, consumed) = read_lacing_length(&data[pos..])?;
    pos += consumed;
    let (skip_length, consumed) = read_lacing_length(&data[pos..])?;
    pos += consumed;

    if data.get(pos) != Some(&0x01) {
        return Err(ExtractorError::parse(
            "vorbis codec private: identification header missing packet type 0x01",
        ));
    }
    let info_end = pos + info_length;
    let identification = data
        .get(pos..info_end)
        .ok_or_else(|| ExtractorError::parse("vorbis codec private: truncated identification header"))?
        .to_vec();

    let skip_end = info_end + skip_length;
    if data.len() < skip_end {
        return Err(ExtractorError::parse("vorbis codec private: truncated comment header"));
    }

    if data.get(skip_end) != Some(&0x05) {
        return Err(ExtractorError::parse(
            "vorbis codec private: setup header missing packet type 0x05",
        ));
    }
    let setup = data[skip_end..].to_vec();

    Ok((identification, setup))
}

/// Reads a Xiph-style length: successive `0xFF` bytes each contributing
/// 255 plus one final non-`0xFF` byte, returning `(total, bytes_consumed)`.
fn read_lacing_length(data: &[u8]) -> Result<(usize, usize)> {
    let mut total = 0usize;
    let mut consumed = 0usize;
    loop {
        let b = *data
            .get(consumed)
            .ok_or_else(|| ExtractorError::parse("vorbis codec private: truncated length field"))?;
        total += b as usize;
        consumed += 1;
        if b != 0xFF {
            break;
        }
    }
    Ok((total, consumed))
}

/// Assembles the Opus track's three initialization blobs: the raw
/// `CodecPrivate` (an OpusHead structure), then `CodecDelay`/`SeekPreRoll`
/// each as 8 big-endian bytes — the layout a decoder expects for
/// `A_OPUS`.
pub fn opus_init_data(codec_private: &[u8], codec_delay_ns: i64, seek_preroll_ns: i64) -> Vec<Vec<u8>> {
    vec![
        codec_private.to_vec(),
        codec_delay_ns.to_be_bytes().to_vec(),
        seek_preroll_ns.to_be_bytes().to_vec(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_avcc(nal_len_minus_one: u8, sps: &[&[u8]], pps: &[&[u8]]) -> Vec<u8> {
        let mut out = vec![1, 0x64, 0, 0x1F];
        out.push(0xFC | nal_len_minus_one);
        out.push(0xE0 | sps.len() as u8);
        for s in sps {
            out.extend_from_slice(&(s.len() as u16).to_be_bytes());
            out.extend_from_slice(s);
        }
        out.push(pps.len() as u8);
        for p in pps {
            out.extend_from_slice(&(p.len() as u16).to_be_bytes());
            out.extend_from_slice(p);
        }
        out
    }

    #[test]
    fn parses_avcc_sps_pps() {
        let data = build_avcc(3, &[&[0x67, 0xAA]], &[&[0x68, 0xBB]]);
        let (nal_len, nals) = parse_avc_config_record(&data).unwrap();
        assert_eq!(nal_len, 4);
        assert_eq!(nals, vec![vec![0x67, 0xAA], vec![0x68, 0xBB]]);
    }

    #[test]
    fn rejects_length_field_of_three() {
        let data = build_avcc(2, &[&[0x67]], &[&[0x68]]);
        assert!(parse_avc_config_record(&data).is_err());
    }

    #[test]
    fn vorbis_two_blobs_with_expected_lengths() {
        let info_length = 30usize;
        let skip_length = 3749usize;

        let mut data = vec![0x02];
        data.extend(lace(info_length));
        data.extend(lace(skip_length));
        let varint_bytes = data.len() - 1;

        data.push(0x01);
        data.extend(std::iter::repeat(0xAA).take(info_length - 1));
        data.push(0x03);
        data.extend(std::iter::repeat(0xBB).take(skip_length - 1));
        data.push(0x05);
        data.extend(std::iter::repeat(0xCC).take(40));

        let (identification, setup) = parse_vorbis_codec_private(&data).unwrap();
        assert_eq!(identification.len(), info_length);
        assert_eq!(setup.len(), data.len() - 1 - varint_bytes - info_length - skip_length);
    }

    fn lace(mut n: usize) -> Vec<u8> {
        let mut out = Vec::new();
        while n >= 0xFF {
            out.push(0xFF);
            n -= 0xFF;
        }
        out.push(n as u8);
        out
    }

    #[test]
    fn opus_produces_three_blobs() {
        let blobs = opus_init_data(&[1, 2, 3], 6_500_000, 3_000_000);
        assert_eq!(blobs.len(), 3);
        assert_eq!(blobs[0], vec![1, 2, 3]);
        assert_eq!(blobs[1], 6_500_000i64.to_be_bytes().to_vec());
        assert_eq!(blobs[2], 3_000_000i64.to_be_bytes().to_vec());
    }
}
