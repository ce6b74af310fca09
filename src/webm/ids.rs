//! # WebM/Matroska Element ID Table
//!
//! The explicit tagged-dispatch table referenced by §9's design notes:
//! a flat map from 32-bit EBML element ID to its [`ElementType`], with
//! no virtual dispatch tree. Only elements [`crate::webm::extractor`]
//! actually interprets are listed; everything else resolves to
//! [`ElementType::Unknown`] and is skipped whole by the EBML reader.

use crate::webm::ebml::ElementType;

/// `EBML` master element: document header.
pub const EBML: u32 = 0x1A45DFA3;
/// `EBMLReadVersion`: required to be 1.
pub const EBML_READ_VERSION: u32 = 0x42F7;
/// `DocType`: `"webm"` or `"matroska"`.
pub const DOC_TYPE: u32 = 0x4282;
/// `DocTypeReadVersion`: required to be 1 or 2.
pub const DOC_TYPE_READ_VERSION: u32 = 0x4285;

/// `Segment` master element: the single top-level container for tracks,
/// clusters, and the seek index.
pub const SEGMENT: u32 = 0x1853_8067;

/// `SeekHead` master element: a table of `Seek` entries.
pub const SEEK_HEAD: u32 = 0x114D_9B74;
/// `Seek` master element: one `SeekHead` entry (id + position).
pub const SEEK: u32 = 0x4DBB;
/// `SeekID`: the element ID a `Seek` entry locates.
pub const SEEK_ID: u32 = 0x53AB;
/// `SeekPosition`: byte offset of the located element, relative to the
/// `Segment`'s content start.
pub const SEEK_POSITION: u32 = 0x53AC;

/// `Info` master element: segment-wide metadata.
pub const INFO: u32 = 0x1549_A966;
/// `TimecodeScale`: nanoseconds per timecode tick.
pub const TIMECODE_SCALE: u32 = 0x2AD7B1;
/// `Duration`: segment duration in `TimecodeScale` units.
pub const DURATION: u32 = 0x4489;

/// `Tracks` master element: the set of `TrackEntry` elements.
pub const TRACKS: u32 = 0x1654_AE6B;
/// `TrackEntry` master element: one track's descriptor.
pub const TRACK_ENTRY: u32 = 0xAE;
/// `TrackNumber`: the track's identifier, matched against `Block`/`SimpleBlock`.
pub const TRACK_NUMBER: u32 = 0xD7;
/// `TrackType`: 1 = video, 2 = audio (others unsupported).
pub const TRACK_TYPE: u32 = 0x83;
/// `DefaultDuration`: nominal per-sample duration in nanoseconds.
pub const DEFAULT_DURATION: u32 = 0x23E383;
/// `CodecID`: the Matroska codec identifier string.
pub const CODEC_ID: u32 = 0x86;
/// `CodecPrivate`: codec-specific initialization data.
pub const CODEC_PRIVATE: u32 = 0x63A2;
/// `CodecDelay`: codec delay in nanoseconds (e.g. Opus pre-skip).
pub const CODEC_DELAY: u32 = 0x56AA;
/// `SeekPreRoll`: seek pre-roll in nanoseconds (e.g. Opus).
pub const SEEK_PRE_ROLL: u32 = 0x56BB;
/// `Audio` master element: audio-specific track settings.
pub const AUDIO: u32 = 0xE1;
/// `Channels`: audio channel count.
pub const CHANNELS: u32 = 0x9F;
/// `SamplingFrequency`: audio sample rate in Hz.
pub const SAMPLING_FREQUENCY: u32 = 0xB5;
/// `Video` master element: video-specific track settings.
pub const VIDEO: u32 = 0xE0;
/// `PixelWidth`: coded picture width.
pub const PIXEL_WIDTH: u32 = 0xB0;
/// `PixelHeight`: coded picture height.
pub const PIXEL_HEIGHT: u32 = 0xBA;

/// `ContentEncodings` master element: a track's encoding/encryption pipeline.
pub const CONTENT_ENCODINGS: u32 = 0x6D80;
/// `ContentEncoding` master element: one pipeline stage.
pub const CONTENT_ENCODING: u32 = 0x6240;
/// `ContentEncodingOrder`: must be 0 (single stage supported).
pub const CONTENT_ENCODING_ORDER: u32 = 0x5031;
/// `ContentEncodingScope`: must be 1 (applies to frame contents only).
pub const CONTENT_ENCODING_SCOPE: u32 = 0x5032;
/// `ContentEncodingType`: must be 1 (encryption).
pub const CONTENT_ENCODING_TYPE: u32 = 0x5033;
/// `ContentEncryption` master element: encryption parameters.
pub const CONTENT_ENCRYPTION: u32 = 0x5035;
/// `ContentEncAlgo`: must be 5 (AES).
pub const CONTENT_ENC_ALGO: u32 = 0x47E1;
/// `ContentEncKeyID`: the encryption key identifier.
pub const CONTENT_ENC_KEY_ID: u32 = 0x47E2;
/// `ContentEncAESSettings` master element: AES-specific encryption parameters.
pub const CONTENT_ENC_AES_SETTINGS: u32 = 0x47E7;
/// `AESSettingsCipherMode`: must be 1 (AES-CTR).
pub const AES_SETTINGS_CIPHER_MODE: u32 = 0x47E8;

/// `Cues` master element: the seek-point index.
pub const CUES: u32 = 0x1C53_BB6B;
/// `CuePoint` master element: one indexed timestamp.
pub const CUE_POINT: u32 = 0xBB;
/// `CueTime`: the cue point's timecode.
pub const CUE_TIME: u32 = 0xB3;
/// `CueTrackPositions` master element: one track's position for a `CuePoint`.
pub const CUE_TRACK_POSITIONS: u32 = 0xB7;
/// `CueClusterPosition`: byte offset of the referenced `Cluster`, relative
/// to the `Segment`'s content start.
pub const CUE_CLUSTER_POSITION: u32 = 0xF1;

/// `Cluster` master element: a block of samples sharing a base timecode.
pub const CLUSTER: u32 = 0x1F43_B675;
/// `Timecode`: the cluster's base timecode.
pub const TIMECODE: u32 = 0xE7;
/// `SimpleBlock` binary element: one laced group of samples, self-contained.
pub const SIMPLE_BLOCK: u32 = 0xA3;
/// `BlockGroup` master element: wraps a `Block` with reference metadata.
pub const BLOCK_GROUP: u32 = 0xA0;
/// `Block` binary element: laced samples, metadata deferred to `BlockGroup`.
pub const BLOCK: u32 = 0xA1;
/// `ReferenceBlock`: presence marks the block as non-keyframe.
pub const REFERENCE_BLOCK: u32 = 0xFB;

/// Looks up the element type for `id` in the fixed tagged-dispatch table.
pub fn element_type(id: u32) -> ElementType {
    use ElementType::*;
    match id {
        EBML | SEGMENT | SEEK_HEAD | SEEK | INFO | TRACKS | TRACK_ENTRY | AUDIO | VIDEO
        | CONTENT_ENCODINGS | CONTENT_ENCODING | CONTENT_ENCRYPTION | CONTENT_ENC_AES_SETTINGS
        | CUES | CUE_POINT | CUE_TRACK_POSITIONS | CLUSTER | BLOCK_GROUP => Master,

        EBML_READ_VERSION | DOC_TYPE_READ_VERSION | TRACK_NUMBER | TRACK_TYPE
        | DEFAULT_DURATION | CODEC_DELAY | SEEK_PRE_ROLL | CHANNELS | PIXEL_WIDTH
        | PIXEL_HEIGHT | CONTENT_ENCODING_ORDER | CONTENT_ENCODING_SCOPE
        | CONTENT_ENCODING_TYPE | CONTENT_ENC_ALGO | AES_SETTINGS_CIPHER_MODE | CUE_TIME
        | CUE_CLUSTER_POSITION | TIMECODE | SEEK_POSITION | REFERENCE_BLOCK => UInt,

        DURATION | SAMPLING_FREQUENCY => Float,

        DOC_TYPE | CODEC_ID => String,

        CODEC_PRIVATE | SEEK_ID | CONTENT_ENC_KEY_ID | SIMPLE_BLOCK | BLOCK => Binary,

        _ => Unknown,
    }
}
