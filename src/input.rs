//! # External Input/Output Contracts
//!
//! Both extractors are pull parsers: they never own the byte source. The
//! host application owns it and implements one of the traits below so the
//! extractor can ask for bytes without blocking the calling thread.
//!
//! `NonBlockingInput` backs the TS extractor: every TS packet read either
//! succeeds fully or the extractor bails out with
//! [`ExtractorError::NeedMoreData`] having consumed nothing.
//!
//! `ExtractorInput` backs the WebM extractor. Its `read_fully`/`skip_fully`
//! methods may signal "would block" the same way, but the WebM extractor
//! additionally needs to seek backwards to resolve the `Cues` element, which
//! is why this trait also tracks an absolute stream position.
//!
//! Concrete implementations (a socket, a ring buffer, a local file) are the
//! host application's responsibility; this crate only depends on the trait.

use crate::error::Result;

/// Non-blocking byte source for the TS extractor.
pub trait NonBlockingInput {
    /// Number of bytes immediately available without blocking.
    fn available_byte_count(&self) -> usize;

    /// Reads up to `n_bytes` into `dst`, advancing the cursor's bit-aligned
    /// write position. Returns the number of bytes actually read, which may
    /// be less than `n_bytes` if that's all that's currently available.
    /// Must never block.
    fn read_into(&mut self, dst: &mut crate::bitcursor::BitCursor, n_bytes: usize) -> Result<usize>;
}

/// Byte source for the WebM extractor. Unlike `NonBlockingInput`, this
/// contract models forward reads as logically blocking (the caller may
/// implement that with an actual blocking read, or signal a would-block
/// condition that the extractor surfaces as `ExtractorError::NeedMoreData`).
pub trait ExtractorInput {
    /// Reads exactly `buf.len()` bytes starting at `buf[offset..]`.
    fn read_fully(&mut self, buf: &mut [u8], offset: usize, len: usize) -> Result<()>;

    /// Skips `len` bytes without returning them.
    fn skip_fully(&mut self, len: u64) -> Result<()>;

    /// Current absolute byte position within the stream.
    fn get_position(&self) -> u64;
}

/// Output parameter the WebM extractor writes to when it needs the caller
/// to reposition the input (used for the one-time seek to `Cues`).
#[derive(Debug, Default, Clone, Copy)]
pub struct PositionHolder {
    /// The absolute byte position the caller should seek the input to.
    pub position: u64,
}

/// Result of a single call to the WebM extractor's `read` entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadResult {
    /// Parsing may continue; call `read` again.
    Continue,
    /// The caller must reposition the input to `PositionHolder::position`
    /// before calling `read` again.
    Seek,
    /// The input has been fully consumed.
    EndOfInput,
}

/// Sink that receives track descriptors, the seek index, and DRM init data
/// for a WebM stream. Implemented by the host application; this crate only
/// calls into it.
pub trait ExtractorOutput {
    /// The concrete per-track sink type handed back by `track`.
    type Track: TrackOutput;

    /// Allocates (or returns the existing) sink for `track_number`.
    fn track(&mut self, track_number: i32) -> &mut Self::Track;

    /// Called once all `TrackEntry` elements have been processed.
    fn end_tracks(&mut self);

    /// Delivers the cue-point seek index, once, after `Cues` finishes.
    fn seek_map(&mut self, index: crate::webm::cues::ChunkIndex);

    /// Delivers DRM initialization data, once, for an encrypted track.
    fn drm_init_data(&mut self, scheme_type: &str, key_id: &[u8]);
}

/// Per-track sink for a WebM stream.
pub trait TrackOutput {
    /// Publishes the track's decoder configuration.
    fn format(&mut self, format: &crate::media::MediaFormat);

    /// Forwards `len` bytes of sample payload read from `src` at its
    /// current position, advancing `src`.
    fn sample_data(&mut self, src: &mut dyn ExtractorInput, len: usize) -> Result<()>;

    /// Finalizes one sample's metadata once all of its payload has been
    /// forwarded via `sample_data`.
    fn sample_metadata(
        &mut self,
        time_us: i64,
        flags: crate::sample::SampleFlags,
        size: u32,
        offset: u32,
        encryption_key_id: Option<&[u8]>,
    );
}
