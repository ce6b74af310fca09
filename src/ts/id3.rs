//! # ID3-in-PES Elementary Reader
//!
//! Some HLS encoders carry timed ID3 metadata as a PES-wrapped private
//! stream. This reader verifies the `ID3` magic, parses just enough of the
//! header to publish a metadata format and log the first frame id, and
//! otherwise passes the tag through unparsed — the core does not decode
//! ID3 frame contents.

use crate::error::{ExtractorError, Result};
use crate::media::{MediaFormat, TrackType};
use crate::sample::{Sample, SamplePool};
use std::collections::VecDeque;

/// Verifies and passes through ID3-in-PES timed metadata tags.
#[derive(Debug)]
pub struct Id3Reader {
    format: MediaFormat,
    queue: VecDeque<Sample>,
}

impl Id3Reader {
    /// Creates a reader with the metadata format already fixed (ID3 carries
    /// no per-stream decoder configuration).
    pub fn new() -> Self {
        Self {
            format: MediaFormat::new("id3", TrackType::Metadata),
            queue: VecDeque::new(),
        }
    }

    /// The fixed metadata format for this track.
    pub fn format(&self) -> &MediaFormat {
        &self.format
    }

    /// Pops the next queued sample, if any.
    pub fn pop_sample(&mut self) -> Option<Sample> {
        self.queue.pop_front()
    }

    /// Consumes one PES packet's reassembled payload as a full ID3 tag.
    pub fn consume(&mut self, payload: &[u8], time_us: i64, pool: &mut SamplePool) -> Result<()> {
        if payload.len() < 10 || &payload[0..3] != b"ID3" {
            return Err(ExtractorError::parse("id3: missing magic"));
        }

        let _version = (payload[3], payload[4]);
        let flags = payload[5];
        let size = synchsafe_to_u32(&payload[6..10]);

        let mut header_len = 10usize;
        if flags & 0x40 != 0 {
            header_len += 10; // extended header, present but not parsed
        }

        if payload.len() < header_len + 4 {
            log::warn!("id3: tag shorter than its declared header");
        } else {
            let frame_id = &payload[header_len..header_len + 4];
            log::info!("id3: first frame id {:?}", String::from_utf8_lossy(frame_id));
        }

        let _ = size;
        let mut sample = pool.checkout();
        sample.append(payload);
        sample.set_time_us(time_us);
        self.queue.push_back(sample);
        Ok(())
    }
}

impl Default for Id3Reader {
    fn default() -> Self {
        Self::new()
    }
}

fn synchsafe_to_u32(bytes: &[u8]) -> u32 {
    ((bytes[0] as u32 & 0x7F) << 21)
        | ((bytes[1] as u32 & 0x7F) << 14)
        | ((bytes[2] as u32 & 0x7F) << 7)
        | (bytes[3] as u32 & 0x7F)
}
