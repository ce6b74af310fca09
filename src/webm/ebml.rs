//! # EBML Tree Reader
//!
//! Event-driven pull parser over [`ExtractorInput`]. Walks the
//! self-describing element tree one step per [`EbmlReader::read`] call,
//! dispatching typed callbacks to an [`EbmlProcessor`] rather than
//! building a DOM. Per §4.8/§9: callbacks are a single capability set
//! passed in at each call (no inheritance, no back-reference into the
//! reader), and element-id-to-type lookup is an explicit table the
//! processor owns, consulted by tagged dispatch rather than a virtual
//! class hierarchy.
//!
//! Suspension is transparent: every multi-byte read (a varint's trailing
//! bytes, an element's full content) is attempted one `ExtractorInput`
//! call at a time, and whatever has already been read survives a
//! `NeedMoreData` on a later byte — the next `read()` call resumes
//! exactly where the previous one left off rather than re-decoding from
//! scratch.

use crate::error::{ExtractorError, Result};
use crate::input::{ExtractorInput, ReadResult};
use crate::webm::varint::read_varint;
use smallvec::SmallVec;

/// The element-type tag a processor's `element_type` lookup returns for
/// a given element id, steering how the reader dispatches its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    /// A nested container; the reader pushes it and emits `start_master`.
    Master,
    /// An unsigned integer leaf.
    UInt,
    /// An IEEE 754 float leaf.
    Float,
    /// A UTF-8 string leaf.
    String,
    /// A binary leaf streamed directly to the processor.
    Binary,
    /// Not recognized; its content is skipped whole.
    Unknown,
}

/// Capability set the EBML tree reader calls into. Implemented by the
/// WebM extractor state machine; no inheritance relationship with the
/// reader itself.
pub trait EbmlProcessor {
    /// Looks up the element type for `id`, consulting a tagged-dispatch
    /// table. Elements the table doesn't recognize return `Unknown` and
    /// are skipped whole.
    fn element_type(&self, id: u32) -> ElementType;

    /// A master element's content has started. `content_position` is the
    /// absolute input position of the first content byte;  the master
    /// spans `[content_position, content_position + content_size)`
    /// (or to end-of-stream if `content_size` is the EBML "unknown size"
    /// sentinel).
    fn start_master(&mut self, id: u32, content_position: u64, content_size: u64) -> Result<()>;

    /// A previously started master element's content has ended.
    fn end_master(&mut self, id: u32) -> Result<()>;

    /// A fully-read unsigned integer leaf.
    fn unsigned_int(&mut self, id: u32, value: u64) -> Result<()>;

    /// A fully-read IEEE 754 float leaf (widened to `f64` regardless of
    /// wire width).
    fn float(&mut self, id: u32, value: f64) -> Result<()>;

    /// A fully-read UTF-8 string leaf.
    fn string(&mut self, id: u32, value: &str) -> Result<()>;

    /// A binary leaf's content is available to stream directly from
    /// `input`, starting at its current position. Implementations read
    /// (or deliberately skip) up to `size` bytes and return `Ok(())` once
    /// the whole element has been consumed; returning
    /// `Err(ExtractorError::NeedMoreData)` asks the reader to call this
    /// again on the next `read()` with the same `id`/remaining `size`,
    /// so a single binary element's content may be streamed across many
    /// suspension points (this is how block/lacing parsing works).
    fn binary(&mut self, id: u32, size: u64, input: &mut dyn ExtractorInput) -> Result<()>;
}

/// Accumulates bytes for one EBML varint across suspension points. A
/// `NeedMoreData` partway through reading its trailing bytes does not
/// lose the bytes already read — `get_position()` on the underlying
/// input has already moved past them, so forgetting them would corrupt
/// the stream alignment on retry.
#[derive(Debug, Default)]
pub(crate) struct PendingVarint {
    scratch: SmallVec<[u8; 8]>,
    target_len: Option<u32>,
}

impl PendingVarint {
    pub(crate) fn reset(&mut self) {
        self.scratch.clear();
        self.target_len = None;
    }

    fn is_fresh(&self) -> bool {
        self.scratch.is_empty() && self.target_len.is_none()
    }

    /// Reads one byte at a time until the varint's full encoded length is
    /// buffered, then decodes it. Returns `(value, encoded_length)`.
    pub(crate) fn try_read(
        &mut self,
        input: &mut dyn ExtractorInput,
        allow_oversize: bool,
        remove_length_mask: bool,
    ) -> Result<(u64, u32)> {
        if self.target_len.is_none() {
            let mut byte = [0u8; 1];
            input.read_fully(&mut byte, 0, 1)?;
            self.scratch.push(byte[0]);
            self.target_len = Some(marker_length(byte[0])?);
        }

        let target = self.target_len.expect("set above") as usize;
        while self.scratch.len() < target {
            let mut byte = [0u8; 1];
            input.read_fully(&mut byte, 0, 1)?;
            self.scratch.push(byte[0]);
        }

        let (value, length) = read_varint(&self.scratch, allow_oversize, remove_length_mask)?;
        self.reset();
        Ok((value, length))
    }
}

fn marker_length(first: u8) -> Result<u32> {
    for k in 0..8u32 {
        if first & (0x80 >> k) != 0 {
            return Ok(k + 1);
        }
    }
    Err(ExtractorError::parse("ebml varint: no length marker bit set"))
}

/// Returns whether `value`, encoded at `length` bytes, is the EBML
/// "unknown size" sentinel (every content bit set).
fn is_unknown_size(value: u64, length: u32) -> bool {
    let bits = 7 * length;
    let all_ones = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
    value == all_ones
}

/// Value used as a master element's content end when its declared size
/// is the "unknown, extends to end of stream" sentinel.
pub const UNKNOWN_SIZE_END: u64 = u64::MAX;

/// Event-driven pull parser over an [`ExtractorInput`], per §4.8: decodes
/// element id/size varints, dispatches to a capability-set
/// [`EbmlProcessor`], and maintains the open-master stack across
/// suspension points.
#[derive(Debug, Default)]
pub struct EbmlReader {
    stack: Vec<(u32, u64)>,
    id_pending: PendingVarint,
    size_pending: PendingVarint,
    header_id: Option<u32>,
    pending_binary: Option<(u32, u64)>,
}

impl EbmlReader {
    /// Creates a reader at the document root, with no open masters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reinitializes the reader to a fresh document-root state,
    /// discarding the open-master stack and any partially-read header.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.id_pending.reset();
        self.size_pending.reset();
        self.header_id = None;
        self.pending_binary = None;
    }

    /// Advances the parse by one step: closing a finished master,
    /// resuming a binary element's streaming, or reading and dispatching
    /// the next element header. See module docs for the suspension
    /// contract.
    pub fn read(
        &mut self,
        input: &mut dyn ExtractorInput,
        processor: &mut dyn EbmlProcessor,
    ) -> Result<ReadResult> {
        if let Some((id, content_end)) = self.pending_binary {
            return self.resume_binary(input, processor, id, content_end);
        }

        if let Some(&(id, content_end)) = self.stack.last() {
            if input.get_position() >= content_end {
                self.stack.pop();
                processor.end_master(id)?;
                return Ok(ReadResult::Continue);
            }
        }

        let at_document_root = self.stack.is_empty() && self.header_id.is_none() && self.id_pending.is_fresh();

        let id = match self.header_id {
            Some(id) => id,
            None => match self.id_pending.try_read(input, false, false) {
                Ok((value, _len)) => {
                    let id = value as u32;
                    self.header_id = Some(id);
                    id
                }
                Err(ExtractorError::NeedMoreData) if at_document_root => {
                    return Ok(ReadResult::EndOfInput);
                }
                Err(e) => return Err(e),
            },
        };

        let (size, size_len) = self.size_pending.try_read(input, true, true)?;
        self.header_id = None;

        let content_position = input.get_position();
        let content_end = if is_unknown_size(size, size_len) {
            UNKNOWN_SIZE_END
        } else {
            content_position + size
        };

        match processor.element_type(id) {
            ElementType::Master => {
                processor.start_master(id, content_position, size)?;
                self.stack.push((id, content_end));
                Ok(ReadResult::Continue)
            }
            ElementType::UInt => {
                if size > 8 {
                    return Err(ExtractorError::parse("ebml: uint element wider than 8 bytes"));
                }
                let mut buf = [0u8; 8];
                input.read_fully(&mut buf[..size as usize], 0, size as usize)?;
                let mut value = 0u64;
                for &b in &buf[..size as usize] {
                    value = (value << 8) | b as u64;
                }
                processor.unsigned_int(id, value)?;
                Ok(ReadResult::Continue)
            }
            ElementType::Float => {
                let value = match size {
                    4 => {
                        let mut buf = [0u8; 4];
                        input.read_fully(&mut buf, 0, 4)?;
                        f32::from_be_bytes(buf) as f64
                    }
                    8 => {
                        let mut buf = [0u8; 8];
                        input.read_fully(&mut buf, 0, 8)?;
                        f64::from_be_bytes(buf)
                    }
                    other => {
                        return Err(ExtractorError::parse(format!(
                            "ebml: float element has unsupported width {other}"
                        )))
                    }
                };
                processor.float(id, value)?;
                Ok(ReadResult::Continue)
            }
            ElementType::String => {
                let mut buf = vec![0u8; size as usize];
                input.read_fully(&mut buf, 0, size as usize)?;
                let s = String::from_utf8_lossy(&buf);
                processor.string(id, &s)?;
                Ok(ReadResult::Continue)
            }
            ElementType::Binary => self.resume_binary(input, processor, id, content_end),
            ElementType::Unknown => {
                if content_end == UNKNOWN_SIZE_END {
                    return Err(ExtractorError::unsupported(
                        "ebml: unknown-size unknown element cannot be skipped",
                    ));
                }
                input.skip_fully(size)?;
                Ok(ReadResult::Continue)
            }
        }
    }

    fn resume_binary(
        &mut self,
        input: &mut dyn ExtractorInput,
        processor: &mut dyn EbmlProcessor,
        id: u32,
        content_end: u64,
    ) -> Result<ReadResult> {
        self.pending_binary = Some((id, content_end));
        let remaining = content_end.saturating_sub(input.get_position());
        match processor.binary(id, remaining, input) {
            Ok(()) => {
                let pos = input.get_position();
                if content_end != UNKNOWN_SIZE_END && pos < content_end {
                    input.skip_fully(content_end - pos)?;
                }
                self.pending_binary = None;
                Ok(ReadResult::Continue)
            }
            Err(ExtractorError::NeedMoreData) => Err(ExtractorError::NeedMoreData),
            Err(e) => {
                self.pending_binary = None;
                Err(e)
            }
        }
    }
}
