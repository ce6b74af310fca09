//! # Sample Buffers
//!
//! A [`Sample`] is one decodable access unit: a byte buffer, its flags, and
//! its presentation timestamp in microseconds. Both extractors produce
//! samples; the TS side additionally recycles them through a [`SamplePool`]
//! so steady-state demuxing doesn't allocate per access unit (§5).

use bytes::BytesMut;
use std::ops::{BitOr, BitOrAssign};

/// Per-sample flags. Stored as a plain bitset rather than a handful of
/// bools so it round-trips cleanly through `TrackOutput::sample_metadata`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleFlags(u32);

impl SampleFlags {
    /// The sample is a keyframe: a decoder can start from it with no prior
    /// reference frames.
    pub const SYNC: SampleFlags = SampleFlags(1 << 0);
    /// The sample's payload is encrypted; the first bytes forwarded to the
    /// sink are the encryption signal (IV size + IV), not media data.
    pub const ENCRYPTED: SampleFlags = SampleFlags(1 << 1);
    /// The sample should be decoded for decoder state but not displayed.
    pub const DECODE_ONLY: SampleFlags = SampleFlags(1 << 2);

    /// The empty flag set.
    pub const fn empty() -> Self {
        SampleFlags(0)
    }

    /// True if `self` contains every bit set in `other`.
    pub const fn contains(self, other: SampleFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SampleFlags {
    type Output = SampleFlags;
    fn bitor(self, rhs: SampleFlags) -> SampleFlags {
        SampleFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for SampleFlags {
    fn bitor_assign(&mut self, rhs: SampleFlags) {
        self.0 |= rhs.0;
    }
}

/// One compressed access unit with an owned, reusable backing buffer.
#[derive(Debug)]
pub struct Sample {
    data: BytesMut,
    flags: SampleFlags,
    time_us: i64,
}

impl Sample {
    /// Creates an empty sample with no backing allocation.
    pub fn new() -> Self {
        Self {
            data: BytesMut::new(),
            flags: SampleFlags::empty(),
            time_us: 0,
        }
    }

    /// Clears the sample back to an empty, flag-free state without
    /// releasing its backing allocation, so it can be handed to the pool.
    pub fn reset(&mut self) {
        self.data.clear();
        self.flags = SampleFlags::empty();
        self.time_us = 0;
    }

    /// Appends bytes to the sample's payload, growing the backing buffer
    /// if needed.
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Ensures the backing buffer can hold at least `additional` more bytes
    /// without reallocating, expanding it otherwise.
    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    /// The sample's payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The sample's payload size in bytes.
    pub fn size(&self) -> u32 {
        self.data.len() as u32
    }

    /// The sample's flags.
    pub fn flags(&self) -> SampleFlags {
        self.flags
    }

    /// Sets (ORs in) flags on the sample.
    pub fn add_flags(&mut self, flags: SampleFlags) {
        self.flags |= flags;
    }

    /// The sample's presentation timestamp in microseconds.
    pub fn time_us(&self) -> i64 {
        self.time_us
    }

    /// Sets the sample's presentation timestamp in microseconds.
    pub fn set_time_us(&mut self, time_us: i64) {
        self.time_us = time_us;
    }

    /// True if no payload has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for Sample {
    fn default() -> Self {
        Self::new()
    }
}

/// A recycling pool of [`Sample`] buffers, used by the TS pipeline to bound
/// per-access-unit allocation. Samples are checked out, filled in place, and
/// returned to the pool once the consumer has drained them.
#[derive(Debug, Default)]
pub struct SamplePool {
    free: Vec<Sample>,
}

impl SamplePool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self { free: Vec::new() }
    }

    /// Checks out a sample, reusing a previously-recycled buffer if one is
    /// available, or allocating a fresh one otherwise.
    pub fn checkout(&mut self) -> Sample {
        self.free.pop().unwrap_or_default()
    }

    /// Returns a sample to the pool for reuse, clearing its contents first.
    pub fn recycle(&mut self, mut sample: Sample) {
        sample.reset();
        self.free.push(sample);
    }

    /// Drops all pooled buffers. Called by `reset()` on the owning extractor.
    pub fn clear(&mut self) {
        self.free.clear();
    }
}
