//! # MPEG-2 Transport Stream Extractor
//!
//! The TS pipeline described in spec.md §2: a [`packet`] framer anchored on
//! the sync byte, [`psi`] readers for PAT/PMT, a per-PID [`pes`]
//! reassembler, and elementary readers for [`h264`], [`aac`], and [`id3`].
//! [`extractor::TsExtractor`] is the public entry point that wires all of
//! these together behind the `new`/`reset`/`prepare`/`track_count`/
//! `format`/`read` surface from spec.md §6.

/// ADTS/AAC elementary reader.
pub mod aac;
/// Public entry point and PID dispatch.
pub mod extractor;
/// H.264 elementary reader.
pub mod h264;
/// ID3-in-PES elementary reader.
pub mod id3;
/// Sync-byte-anchored packet framer.
pub mod packet;
/// PES reassembler.
pub mod pes;
/// PAT/PMT readers.
pub mod psi;
/// Wire-format constants and header structs.
pub mod types;

pub use extractor::{ReadFlags, SampleHolder, TsExtractor};
