//! # TS Extractor — Public Surface & PID Dispatch
//!
//! Ties the packet framer, PAT/PMT readers, per-PID PES reassemblers, and
//! elementary readers together into the public contract described in §6:
//! `new()`, `reset()`, `prepare()`, `track_count()`, `format()`, `read()`.
//!
//! PID dispatch (§4.2) lives here rather than in the framer: each TS packet
//! carries a PID that routes its payload to exactly one of the PAT reader,
//! the PMT reader (once discovered), or a track's `PesReassembler`. Packets
//! for unrecognized PIDs are dropped, matching the `Recoverable` error kind
//! in §7 — the stream is never failed over an unknown PID.

use std::collections::HashMap;

use crate::error::{ExtractorError, Result};
use crate::input::NonBlockingInput;
use crate::media::MediaFormat;
use crate::sample::{Sample, SampleFlags, SamplePool};
use crate::ts::aac::AacReader;
use crate::ts::h264::H264Reader;
use crate::ts::id3::Id3Reader;
use crate::ts::packet::TsPacketFramer;
use crate::ts::pes::PesReassembler;
use crate::ts::psi::{PatReader, PmtReader};
use crate::ts::types::{STREAM_TYPE_AAC, STREAM_TYPE_H264, STREAM_TYPE_ID3_METADATA};

/// Bits returned by [`TsExtractor::read`]; combinable, per §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadFlags(u32);

impl ReadFlags {
    /// The input was exhausted before a sample could be produced; call
    /// `read` again once more bytes are available.
    pub const NEED_MORE_DATA: ReadFlags = ReadFlags(1);
    /// A sample was written into the caller's `SampleHolder`.
    pub const READ_SAMPLE: ReadFlags = ReadFlags(2);
    /// A sample is available for `track` but no usable `SampleHolder` was
    /// supplied to receive it (the requested track index doesn't exist yet
    /// in the track table — see `read`'s doc comment).
    pub const NEED_SAMPLE_HOLDER: ReadFlags = ReadFlags(4);

    /// The empty flag set.
    pub const fn empty() -> Self {
        ReadFlags(0)
    }

    /// True if `self` contains every bit set in `other`.
    pub const fn contains(self, other: ReadFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ReadFlags {
    type Output = ReadFlags;
    fn bitor(self, rhs: ReadFlags) -> ReadFlags {
        ReadFlags(self.0 | rhs.0)
    }
}

/// Caller-owned receptacle for one sample's payload and metadata, per §6's
/// "Sample holder contract": if the buffer is too small and the caller has
/// disallowed replacement, `read` fails with `BufferTooSmall`; otherwise the
/// buffer is grown to fit.
#[derive(Debug, Default)]
pub struct SampleHolder {
    /// The sample's payload bytes.
    pub data: Vec<u8>,
    /// The sample's payload size in bytes; mirrors `data.len()`.
    pub size: u32,
    /// The sample's presentation timestamp in microseconds.
    pub time_us: i64,
    /// The sample's flags (`SYNC`, `ENCRYPTED`, `DECODE_ONLY`).
    pub flags: SampleFlags,
    /// When false, a buffer too small to hold the next sample fails the
    /// read with `BufferTooSmall` instead of being grown.
    pub allow_buffer_replacement: bool,
}

impl SampleHolder {
    /// Creates an empty holder with buffer replacement allowed.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            size: 0,
            time_us: 0,
            flags: SampleFlags::empty(),
            allow_buffer_replacement: true,
        }
    }

    fn fill_from(&mut self, sample: &Sample) -> Result<()> {
        let needed = sample.size() as usize;
        if needed > self.data.capacity() && !self.allow_buffer_replacement {
            return Err(ExtractorError::BufferTooSmall);
        }
        self.data.clear();
        self.data.extend_from_slice(sample.data());
        self.size = sample.size();
        self.time_us = sample.time_us();
        self.flags = sample.flags();
        Ok(())
    }
}

enum ElementaryReader {
    H264(H264Reader),
    Aac(AacReader),
    Id3(Id3Reader),
}

impl ElementaryReader {
    fn format(&self) -> Option<&MediaFormat> {
        match self {
            ElementaryReader::H264(r) => Some(r.format()),
            ElementaryReader::Aac(r) => r.format(),
            ElementaryReader::Id3(r) => Some(r.format()),
        }
    }

    fn consume(&mut self, payload: &[u8], time_us: i64, pool: &mut SamplePool) -> Result<()> {
        match self {
            ElementaryReader::H264(r) => r.consume(payload, time_us, pool),
            ElementaryReader::Aac(r) => r.consume(payload, time_us, pool),
            ElementaryReader::Id3(r) => r.consume(payload, time_us, pool),
        }
    }

    fn pop_sample(&mut self) -> Option<Sample> {
        match self {
            ElementaryReader::H264(r) => r.pop_sample(),
            ElementaryReader::Aac(r) => r.pop_sample(),
            ElementaryReader::Id3(r) => r.pop_sample(),
        }
    }
}

struct TsTrack {
    pid: u16,
    pes: PesReassembler,
    reader: ElementaryReader,
}

/// PID handler installed by the PAT/PMT readers (§4.2's "payload reader").
enum PidHandler {
    Pat,
    Pmt,
    Track(usize),
}

/// TS demuxer: framing, PID dispatch, PSI, PES reassembly, and elementary
/// readers wired into the single pull-parser entry point described in §6.
pub struct TsExtractor {
    framer: TsPacketFramer,
    pat: PatReader,
    pmt: Option<PmtReader>,
    pid_handlers: HashMap<u16, PidHandler>,
    tracks: Vec<TsTrack>,
    pool: SamplePool,
}

impl TsExtractor {
    /// Creates a fresh extractor with only the PAT reader installed, at
    /// `PID_PAT` (0x0000), matching §4.2.
    pub fn new() -> Self {
        let mut pid_handlers = HashMap::new();
        pid_handlers.insert(crate::ts::types::PID_PAT, PidHandler::Pat);
        Self {
            framer: TsPacketFramer::new(),
            pat: PatReader::new(),
            pmt: None,
            pid_handlers,
            tracks: Vec::new(),
            pool: SamplePool::new(),
        }
    }

    /// Fully reinitializes the extractor: PID table, framer, and all
    /// per-track state are dropped; only the PAT reader at its well-known
    /// PID survives, per §5 ("reset clears all tables, preserving only PAT
    /// reader").
    pub fn reset(&mut self) {
        self.framer.reset();
        self.pat = PatReader::new();
        self.pmt = None;
        self.pid_handlers.clear();
        self.pid_handlers
            .insert(crate::ts::types::PID_PAT, PidHandler::Pat);
        self.tracks.clear();
        self.pool.clear();
    }

    /// Pumps the input until either the extractor is prepared (at least one
    /// track discovered and every discovered track's format known) or the
    /// input is exhausted. Safe to call again later with more bytes if it
    /// returns `false`.
    pub fn prepare(&mut self, input: &mut dyn NonBlockingInput) -> bool {
        loop {
            if self.is_prepared() {
                return true;
            }
            match self.read_one_packet(input) {
                Ok(()) => continue,
                Err(_) => return self.is_prepared(),
            }
        }
    }

    fn is_prepared(&self) -> bool {
        !self.tracks.is_empty() && self.tracks.iter().all(|t| t.reader.format().is_some())
    }

    /// Number of elementary tracks discovered so far.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// The decoder configuration for `track`. Only meaningful once
    /// `prepare` has returned `true`.
    pub fn format(&self, track: usize) -> Option<&MediaFormat> {
        self.tracks.get(track).and_then(|t| t.reader.format())
    }

    /// Attempts to deliver the next sample for `track` into `holder`.
    ///
    /// Pumps TS packets from `input` until either a sample becomes
    /// available for `track` or the input signals `NeedMoreData`. A single
    /// call may dispatch packets belonging to other tracks along the way
    /// (PSI and interleaved elementary PIDs); those samples are queued on
    /// their own tracks for a later `read` call.
    pub fn read(
        &mut self,
        input: &mut dyn NonBlockingInput,
        track: usize,
        holder: &mut SampleHolder,
    ) -> Result<ReadFlags> {
        if track >= self.tracks.len() {
            return Ok(ReadFlags::NEED_SAMPLE_HOLDER);
        }

        loop {
            if let Some(sample) = self.tracks[track].reader.pop_sample() {
                holder.fill_from(&sample)?;
                self.pool.recycle(sample);
                return Ok(ReadFlags::READ_SAMPLE);
            }

            match self.read_one_packet(input) {
                Ok(()) => continue,
                Err(ExtractorError::NeedMoreData) => return Ok(ReadFlags::NEED_MORE_DATA),
                Err(e) => return Err(e),
            }
        }
    }

    /// Reads and fully dispatches one TS packet. `Ok(())` means forward
    /// progress was made (the packet was routed, dropped, or its PID is
    /// unrecognized); `Err(NeedMoreData)` means the input didn't hold a
    /// full packet and nothing was consumed.
    fn read_one_packet(&mut self, input: &mut dyn NonBlockingInput) -> Result<()> {
        let packet = self.framer.read_packet(input)?;
        let pid = packet.header.pid;

        let handler = match self.pid_handlers.get(&pid) {
            Some(h) => h,
            None => return Ok(()), // Recoverable: unknown PID, drop.
        };

        match handler {
            PidHandler::Pat => {
                if let Some(pmt_pid) = self
                    .pat
                    .consume(packet.header.payload_unit_start, &packet.payload)?
                {
                    self.pmt = Some(PmtReader::new());
                    self.pid_handlers.insert(pmt_pid, PidHandler::Pmt);
                }
            }
            PidHandler::Pmt => {
                if let Some(pmt) = self.pmt.as_mut() {
                    if let Some(streams) =
                        pmt.consume(packet.header.payload_unit_start, &packet.payload)?
                    {
                        for stream in streams {
                            let reader = match stream.stream_type {
                                STREAM_TYPE_H264 => ElementaryReader::H264(H264Reader::new()),
                                STREAM_TYPE_AAC => ElementaryReader::Aac(AacReader::new()),
                                STREAM_TYPE_ID3_METADATA => ElementaryReader::Id3(Id3Reader::new()),
                                _ => {
                                    log::warn!(
                                        "ts: unrecognized PMT stream_type {:#x}, skipping",
                                        stream.stream_type
                                    );
                                    continue;
                                }
                            };
                            let track_index = self.tracks.len();
                            self.tracks.push(TsTrack {
                                pid: stream.elementary_pid,
                                pes: PesReassembler::new(),
                                reader,
                            });
                            self.pid_handlers
                                .insert(stream.elementary_pid, PidHandler::Track(track_index));
                        }
                    }
                }
            }
            PidHandler::Track(idx) => {
                let idx = *idx;
                if let Some(flushed) = self.tracks[idx]
                    .pes
                    .push(packet.header.payload_unit_start, &packet.payload)?
                {
                    let time_us = flushed.time_us.unwrap_or(0);
                    self.tracks[idx]
                        .reader
                        .consume(&flushed.payload, time_us, &mut self.pool)?;
                }
            }
        }

        Ok(())
    }
}

impl Default for TsExtractor {
    fn default() -> Self {
        Self::new()
    }
}
