//! # Track Descriptor
//!
//! Accumulates a `TrackEntry`'s scalar fields as the EBML reader emits
//! them, then converts to the crate-wide [`MediaFormat`] once the entry
//! closes and its codec private data can be parsed.

use crate::error::Result;
use crate::media::{MediaFormat, TrackType};
use crate::webm::codec_private::{opus_init_data, parse_avc_config_record, parse_vorbis_codec_private};

/// `CodecID` for length-prefixed H.264 (AVC) tracks.
pub const CODEC_AVC: &str = "V_MPEG4/ISO/AVC";
/// `CodecID` for Vorbis audio tracks.
pub const CODEC_VORBIS: &str = "A_VORBIS";
/// `CodecID` for Opus audio tracks.
pub const CODEC_OPUS: &str = "A_OPUS";

/// Matroska `TrackType` values relevant to this core (§3: "exactly one
/// audio and one video track retained").
const TRACK_TYPE_VIDEO: u64 = 1;
const TRACK_TYPE_AUDIO: u64 = 2;

/// Mutable accumulator for one `TrackEntry`, construction-scoped per
/// spec.md §3's Lifecycles note ("trackFormat is construction-scope
/// within `TrackEntry`").
#[derive(Debug, Default)]
pub struct TrackBuilder {
    /// `TrackNumber`, required.
    pub number: Option<i32>,
    /// `TrackType`, decoded to `Audio`/`Video`; required.
    pub track_type: Option<TrackType>,
    /// `CodecID`, required.
    pub codec_id: Option<String>,
    /// Raw `CodecPrivate` bytes, parsed into `codec_private` init blobs at [`TrackBuilder::build`].
    pub codec_private: Option<Vec<u8>>,
    /// `DefaultDuration`, in nanoseconds.
    pub default_sample_duration_ns: Option<i64>,
    /// `ContentEncKeyID`, if the track is encrypted.
    pub encryption_key_id: Option<Vec<u8>>,
    /// Whether a `ContentEncoding` validated as single-stage AES encryption
    /// was seen.
    pub has_content_encryption: bool,
    /// `PixelWidth`, for video tracks.
    pub pixel_width: Option<u32>,
    /// `PixelHeight`, for video tracks.
    pub pixel_height: Option<u32>,
    /// `Channels`, for audio tracks.
    pub channels: Option<u32>,
    /// `SamplingFrequency`, for audio tracks.
    pub sample_rate: Option<f64>,
    /// `CodecDelay`, in nanoseconds.
    pub codec_delay_ns: Option<i64>,
    /// `SeekPreRoll`, in nanoseconds.
    pub seek_preroll_ns: Option<i64>,
}

impl TrackBuilder {
    /// Creates a builder with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a raw `TrackType` value, leaving `track_type` unset for any
    /// value other than video (1) or audio (2).
    pub fn set_track_type(&mut self, value: u64) {
        self.track_type = match value {
            TRACK_TYPE_VIDEO => Some(TrackType::Video),
            TRACK_TYPE_AUDIO => Some(TrackType::Audio),
            _ => None,
        };
    }

    /// Finalizes the entry into a [`TrackDescriptor`], deriving
    /// `nal_length_field_length` and the decoder init blobs from
    /// `codec_private` per spec.md §4.12.
    pub fn build(self) -> Result<TrackDescriptor> {
        let number = self
            .number
            .ok_or_else(|| crate::error::ExtractorError::parse("TrackEntry missing TrackNumber"))?;
        let track_type = self
            .track_type
            .ok_or_else(|| crate::error::ExtractorError::parse("TrackEntry missing TrackType"))?;
        let codec_id = self
            .codec_id
            .ok_or_else(|| crate::error::ExtractorError::parse("TrackEntry missing CodecID"))?;

        let mut nal_length_field_length = None;
        let mut init_blobs = Vec::new();

        if let Some(private) = &self.codec_private {
            match codec_id.as_str() {
                CODEC_AVC => {
                    let (len, nals) = parse_avc_config_record(private)?;
                    nal_length_field_length = Some(len);
                    init_blobs = nals;
                }
                CODEC_VORBIS => {
                    let (identification, setup) = parse_vorbis_codec_private(private)?;
                    init_blobs = vec![identification, setup];
                }
                CODEC_OPUS => {
                    init_blobs = opus_init_data(
                        private,
                        self.codec_delay_ns.unwrap_or(0),
                        self.seek_preroll_ns.unwrap_or(0),
                    );
                }
                _ => init_blobs = vec![private.clone()],
            }
        }

        Ok(TrackDescriptor {
            number,
            track_type,
            codec_id,
            codec_private: init_blobs,
            default_sample_duration_ns: self.default_sample_duration_ns,
            encryption_key_id: self.encryption_key_id,
            has_content_encryption: self.has_content_encryption,
            pixel_width: self.pixel_width,
            pixel_height: self.pixel_height,
            channels: self.channels,
            sample_rate: self.sample_rate.map(|v| v as u32),
            codec_delay_ns: self.codec_delay_ns,
            seek_preroll_ns: self.seek_preroll_ns,
            nal_length_field_length,
        })
    }
}

/// A completed track descriptor: §3's "Track descriptor (WebM)" data
/// model.
#[derive(Debug, Clone)]
pub struct TrackDescriptor {
    /// `TrackNumber`, matched against `Block`/`SimpleBlock` track numbers.
    pub number: i32,
    /// Broad track kind.
    pub track_type: TrackType,
    /// `CodecID`.
    pub codec_id: String,
    /// Codec-specific initialization blobs, derived from `CodecPrivate`.
    pub codec_private: Vec<Vec<u8>>,
    /// Nominal per-sample duration, in nanoseconds.
    pub default_sample_duration_ns: Option<i64>,
    /// Encryption key identifier, if the track is encrypted.
    pub encryption_key_id: Option<Vec<u8>>,
    /// Whether this track's samples carry an encryption signal byte.
    pub has_content_encryption: bool,
    /// Coded picture width, for video tracks.
    pub pixel_width: Option<u32>,
    /// Coded picture height, for video tracks.
    pub pixel_height: Option<u32>,
    /// Channel count, for audio tracks.
    pub channels: Option<u32>,
    /// Sample rate in Hz, for audio tracks.
    pub sample_rate: Option<u32>,
    /// Codec delay in nanoseconds (e.g. Opus pre-skip).
    pub codec_delay_ns: Option<i64>,
    /// Seek pre-roll in nanoseconds (e.g. Opus).
    pub seek_preroll_ns: Option<i64>,
    /// NAL unit length-field width for length-prefixed AVC streams.
    pub nal_length_field_length: Option<u8>,
}

impl TrackDescriptor {
    /// Bridges this descriptor into the crate-wide [`MediaFormat`].
    pub fn to_media_format(&self) -> MediaFormat {
        let mut format = MediaFormat::new(self.codec_id.clone(), self.track_type);
        format.codec_private = self.codec_private.clone();
        format.pixel_width = self.pixel_width;
        format.pixel_height = self.pixel_height;
        format.channels = self.channels;
        format.sample_rate = self.sample_rate;
        format.codec_delay_ns = self.codec_delay_ns;
        format.seek_preroll_ns = self.seek_preroll_ns;
        format.nal_length_field_length = self.nal_length_field_length;
        format
    }
}
