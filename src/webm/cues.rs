//! # Cues (Seek Index)
//!
//! `Cues` is a flat list of `CuePoint`s, each naming a presentation time
//! and the byte position of the `Cluster` containing it. This module
//! turns that list into the derived [`ChunkIndex`] the spec hands to
//! `ExtractorOutput::seek_map`: per-chunk size and duration, computed
//! from the gaps between consecutive cue points rather than stored
//! directly, since Matroska only records starts.

use crate::error::{ExtractorError, Result};

/// Seek index derived from `Cues`: parallel arrays indexed by chunk.
#[derive(Debug, Clone, Default)]
pub struct ChunkIndex {
    /// Byte size of each chunk, derived from the gap to the next offset
    /// (the last sized to the segment's end).
    pub sizes: Vec<u64>,
    /// Absolute byte offset of each chunk's `Cluster`.
    pub offsets: Vec<u64>,
    /// Duration of each chunk in microseconds, derived from the gap to the
    /// next chunk's start time (the last sized to the stream's duration).
    pub durations_us: Vec<i64>,
    /// Presentation time of each chunk's start, in microseconds.
    pub times_us: Vec<i64>,
}

/// Accumulates `CueTime`/`CueClusterPosition` pairs while `Cues` is open;
/// consumed once, at `end_master(CUES)`, into a [`ChunkIndex`].
#[derive(Debug, Default)]
pub struct CuesBuilder {
    times_us: Vec<i64>,
    positions: Vec<u64>,
    current_time_us: Option<i64>,
    current_position: Option<u64>,
    position_taken: bool,
}

impl CuesBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets per-`CuePoint` scratch state at the start of a new `CuePoint`.
    pub fn start_cue_point(&mut self) {
        self.current_time_us = None;
        self.current_position = None;
        self.position_taken = false;
    }

    /// Records the current `CuePoint`'s `CueTime`.
    pub fn set_cue_time_us(&mut self, value: i64) {
        self.current_time_us = Some(value);
    }

    /// Only the first `CueClusterPosition` within a `CuePoint` counts,
    /// per spec.md §4.9 ("one position per CuePoint (first wins)").
    pub fn set_cue_cluster_position(&mut self, value: u64) {
        if !self.position_taken {
            self.current_position = Some(value);
            self.position_taken = true;
        }
    }

    /// Finalizes the current `CuePoint`, failing if either required field
    /// was never set.
    pub fn end_cue_point(&mut self) -> Result<()> {
        let time_us = self
            .current_time_us
            .ok_or_else(|| ExtractorError::parse("CuePoint missing CueTime"))?;
        let position = self
            .current_position
            .ok_or_else(|| ExtractorError::parse("CuePoint missing CueClusterPosition"))?;
        self.times_us.push(time_us);
        self.positions.push(position);
        Ok(())
    }

    /// Builds the [`ChunkIndex`], given the `Segment`'s content position
    /// (so cue cluster positions, which are relative to `Segment`, become
    /// absolute offsets), the segment's content size (to size the final
    /// chunk), and the overall stream duration (to duration the final
    /// chunk).
    pub fn build(
        &self,
        segment_content_position: u64,
        segment_content_size: u64,
        duration_us: i64,
    ) -> Result<ChunkIndex> {
        if self.times_us.is_empty() || self.times_us.len() != self.positions.len() {
            return Err(ExtractorError::parse(
                "Cues: |cue_times| must equal |cue_positions| and be nonzero",
            ));
        }

        let n = self.times_us.len();
        let mut offsets = Vec::with_capacity(n);
        for &p in &self.positions {
            offsets.push(segment_content_position + p);
        }

        let segment_end = segment_content_position + segment_content_size;
        let mut sizes = Vec::with_capacity(n);
        for i in 0..n {
            let next = if i + 1 < n { offsets[i + 1] } else { segment_end };
            sizes.push(next - offsets[i]);
        }

        let mut durations_us = Vec::with_capacity(n);
        for i in 0..n {
            let next = if i + 1 < n { self.times_us[i + 1] } else { duration_us };
            durations_us.push(next - self.times_us[i]);
        }

        Ok(ChunkIndex {
            sizes,
            offsets,
            durations_us,
            times_us: self.times_us.clone(),
        })
    }
}
