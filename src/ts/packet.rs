//! # TS Packet Framer
//!
//! Slices the incoming byte stream into 188-byte packets anchored on the
//! sync byte. Resyncs one byte at a time on a sync mismatch rather than
//! failing the stream, per §4.2.

use crate::bitcursor::BitCursor;
use crate::error::{ExtractorError, Result};
use crate::input::NonBlockingInput;
use crate::ts::types::{TsHeader, SYNC_BYTE, TS_HEADER_SIZE, TS_PACKET_SIZE};

/// One framed TS packet: its parsed header and payload bytes (with the
/// adaptation field, if any, already stripped).
#[derive(Debug)]
pub struct TsPacketView {
    /// The packet's parsed fixed header.
    pub header: TsHeader,
    /// Payload bytes, with the adaptation field (if any) already stripped.
    pub payload: Vec<u8>,
}

/// Resumable byte-stream slicer that anchors on the TS sync byte.
#[derive(Debug, Default)]
pub struct TsPacketFramer {
    buffer: BitCursor,
}

impl TsPacketFramer {
    /// Creates an empty framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops any buffered partial packet, matching §5's reset contract.
    pub fn reset(&mut self) {
        self.buffer.reset();
    }

    /// Reads and frames the next TS packet, resyncing on a bad sync byte.
    /// Returns `Err(NeedMoreData)` without having dropped any bytes it
    /// hasn't already determined are garbage.
    pub fn read_packet(&mut self, input: &mut dyn NonBlockingInput) -> Result<TsPacketView> {
        loop {
            self.fill(input, TS_PACKET_SIZE)?;
            if self.buffer.remaining()[0] == SYNC_BYTE {
                break;
            }
            // Transport error indicator can't be trusted here; drop one
            // byte and keep scanning for realignment.
            self.buffer.skip_bytes(1)?;
            self.buffer.clear_read_data();
        }

        let header_bytes: [u8; TS_HEADER_SIZE] =
            self.buffer.remaining()[..TS_HEADER_SIZE].try_into().unwrap();
        let header = TsHeader::parse(&header_bytes);
        self.buffer.skip_bytes(TS_HEADER_SIZE)?;

        let mut consumed = TS_HEADER_SIZE;
        if header.adaptation_field_exists {
            let af_len = self.buffer.remaining()[0] as usize;
            self.buffer.skip_bytes(1 + af_len)?;
            consumed += 1 + af_len;
        }

        let payload_len = TS_PACKET_SIZE.saturating_sub(consumed);
        let payload = if header.contains_payload {
            self.buffer.remaining()[..payload_len].to_vec()
        } else {
            Vec::new()
        };
        self.buffer.skip_bytes(payload_len)?;
        self.buffer.clear_read_data();

        Ok(TsPacketView { header, payload })
    }

    fn fill(&mut self, input: &mut dyn NonBlockingInput, want: usize) -> Result<()> {
        while self.buffer.bytes_left() < want {
            let available = input.available_byte_count();
            if available == 0 {
                return Err(ExtractorError::NeedMoreData);
            }
            let to_read = available.min(want - self.buffer.bytes_left());
            let n = input.read_into(&mut self.buffer, to_read)?;
            if n == 0 {
                return Err(ExtractorError::NeedMoreData);
            }
        }
        Ok(())
    }
}
