//! # Media Format
//!
//! A single format descriptor shared by both pipelines' output contract
//! (`TrackOutput::format`). Not every field applies to every codec; unused
//! fields stay `None`/empty.

/// Broad track kind, independent of container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackType {
    /// Audio track.
    Audio,
    /// Video track.
    Video,
    /// Timed metadata (e.g. ID3-in-PES), not decodable media.
    Metadata,
}

/// Decoder configuration for one track.
#[derive(Debug, Clone)]
pub struct MediaFormat {
    /// Codec identifier. TS elementary readers use short labels (`"h264"`,
    /// `"aac"`, `"id3"`); WebM tracks carry the Matroska `CodecID` string
    /// (e.g. `"V_MPEG4/ISO/AVC"`, `"A_OPUS"`).
    pub codec_id: String,
    /// Broad track kind.
    pub track_type: TrackType,
    /// Codec-specific initialization blobs, e.g. AVC SPS/PPS NAL units, or
    /// the Vorbis identification+setup headers.
    pub codec_private: Vec<Vec<u8>>,
    /// Coded picture width in pixels, for video tracks.
    pub pixel_width: Option<u32>,
    /// Coded picture height in pixels, for video tracks.
    pub pixel_height: Option<u32>,
    /// Channel count, for audio tracks.
    pub channels: Option<u32>,
    /// Sample rate in Hz, for audio tracks.
    pub sample_rate: Option<u32>,
    /// Codec delay in nanoseconds (e.g. Opus pre-skip), if any.
    pub codec_delay_ns: Option<i64>,
    /// Seek pre-roll in nanoseconds (e.g. Opus), if any.
    pub seek_preroll_ns: Option<i64>,
    /// NAL unit length-field width for length-prefixed AVC streams (1, 2 or 4).
    pub nal_length_field_length: Option<u8>,
}

impl MediaFormat {
    /// Creates a format with `codec_id`/`track_type` set and every other
    /// field empty.
    pub fn new(codec_id: impl Into<String>, track_type: TrackType) -> Self {
        Self {
            codec_id: codec_id.into(),
            track_type,
            codec_private: Vec::new(),
            pixel_width: None,
            pixel_height: None,
            channels: None,
            sample_rate: None,
            codec_delay_ns: None,
            seek_preroll_ns: None,
            nal_length_field_length: None,
        }
    }
}
