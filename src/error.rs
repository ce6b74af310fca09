//! # Error Types
//!
//! This module provides the error types shared by the TS and WebM extractors.
//! It defines a central error type [`ExtractorError`] covering the failure
//! kinds described by the extractor contract: malformed headers, unsupported
//! container features, and caller-supplied buffers that are too small.
//!
//! `NeedMoreData` is deliberately part of this enum rather than a separate
//! sentinel type: callers match on it to resume the pull loop, but it still
//! flows through the same `?` plumbing as a real parse failure.
//!
//! ## Example Usage
//!
//! ```rust
//! use demux_core::error::{ExtractorError, Result};
//!
//! fn require_non_empty(data: &[u8]) -> Result<()> {
//!     if data.is_empty() {
//!         return Err(ExtractorError::NeedMoreData);
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Primary error type for the demux-core extractors.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The input did not have enough bytes to complete the current operation.
    /// Callers should supply more data and retry; no state was corrupted.
    #[error("need more data")]
    NeedMoreData,

    /// A mandatory element was missing or a header was malformed in a way
    /// that cannot be recovered from (e.g. ID3 size mismatch, bad Vorbis
    /// magic, an EBML lacing varint with no length bit set).
    #[error("parse error: {0}")]
    Parse(String),

    /// The stream used a feature this core does not support: multiple
    /// `Segment` elements, lacing on a `Block`, an unknown content
    /// encryption algorithm, an unsupported `DocType`/`DocTypeReadVersion`.
    #[error("unsupported feature: {0}")]
    Unsupported(String),

    /// The caller-supplied sample buffer was too small and the caller
    /// disallowed reallocation.
    #[error("buffer too small")]
    BufferTooSmall,

    /// An underlying I/O error surfaced from the input abstraction. The
    /// non-blocking input contract generally signals short reads through
    /// `NeedMoreData` instead, but concrete `ExtractorInput`/`NonBlockingInput`
    /// implementations may still bubble up genuine I/O failures.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractorError {
    /// Shorthand for constructing a [`ExtractorError::Parse`] from anything
    /// that can be displayed.
    pub fn parse(msg: impl Into<String>) -> Self {
        ExtractorError::Parse(msg.into())
    }

    /// Shorthand for constructing a [`ExtractorError::Unsupported`] from
    /// anything that can be displayed.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        ExtractorError::Unsupported(msg.into())
    }

    /// True for the soft "try again later" condition, as opposed to a
    /// genuine parse failure the caller must reset/seek to recover from.
    pub fn is_need_more_data(&self) -> bool {
        matches!(self, ExtractorError::NeedMoreData)
    }
}

/// A specialized `Result` type for demux-core operations.
pub type Result<T> = std::result::Result<T, ExtractorError>;
