#![doc(html_root_url = "https://docs.rs/demux-core/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

//! # demux-core
//!
//! `demux-core` is a pair of pull-parsing demultiplexers: one for MPEG-2
//! Transport Stream, one for WebM/Matroska. Neither owns an I/O source,
//! a thread, or a clock — each is driven by repeated calls to its `read`
//! entry point, and each hands parsed samples to a caller-supplied sink
//! rather than buffering a whole stream in memory.
//!
//! ## Module Overview
//!
//! - [`ts`]: MPEG-2 Transport Stream demultiplexing — packet framing,
//!   PAT/PMT parsing, PES reassembly, and elementary readers for H.264,
//!   AAC, and ID3 timed metadata. Entry point: [`ts::TsExtractor`].
//! - [`webm`]: WebM/Matroska demultiplexing — an EBML element walker,
//!   track discovery, `Cues` seek-index construction, content-encryption
//!   validation, and block/lace decoding. Entry point:
//!   [`webm::WebmExtractor`].
//! - [`input`]: The `NonBlockingInput`/`ExtractorInput`/`ExtractorOutput`
//!   traits each extractor is driven through; concrete byte sources and
//!   sample sinks are the host application's responsibility.
//! - [`media`]: Container-agnostic track/format description shared by
//!   both extractors.
//! - [`sample`]: Sample metadata, flags, and the pooled sample buffer the
//!   TS extractor writes decoded access units into.
//! - [`bitcursor`]: A bit-granular cursor over caller-owned byte buffers,
//!   used by the TS side's elementary stream parsers.
//! - [`error`]: The shared `ExtractorError`/`Result` used by both sides.
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! demux-core = "0.1.0"
//! ```
//!
//! ### WebM Example
//!
//! ```rust,no_run
//! use demux_core::error::Result;
//! use demux_core::input::{ExtractorInput, ExtractorOutput, PositionHolder, ReadResult, TrackOutput};
//! use demux_core::media::MediaFormat;
//! use demux_core::sample::SampleFlags;
//! use demux_core::webm::{ChunkIndex, WebmExtractor};
//!
//! struct NullTrack;
//! impl TrackOutput for NullTrack {
//!     fn format(&mut self, _format: &MediaFormat) {}
//!     fn sample_data(&mut self, _src: &mut dyn ExtractorInput, _len: usize) -> Result<()> { Ok(()) }
//!     fn sample_metadata(&mut self, _time_us: i64, _flags: SampleFlags, _size: u32, _offset: u32, _key_id: Option<&[u8]>) {}
//! }
//!
//! struct NullOutput;
//! impl ExtractorOutput for NullOutput {
//!     type Track = NullTrack;
//!     fn track(&mut self, _track_number: i32) -> &mut NullTrack { unimplemented!() }
//!     fn end_tracks(&mut self) {}
//!     fn seek_map(&mut self, _index: ChunkIndex) {}
//!     fn drm_init_data(&mut self, _scheme_type: &str, _key_id: &[u8]) {}
//! }
//!
//! fn drive(input: &mut dyn ExtractorInput) -> Result<()> {
//!     let mut extractor = WebmExtractor::new(NullOutput);
//!     let mut seek_position = PositionHolder::default();
//!     loop {
//!         match extractor.read(input, &mut seek_position)? {
//!             ReadResult::Continue => {}
//!             ReadResult::Seek => { /* caller repositions `input` to seek_position.position */ }
//!             ReadResult::EndOfInput => break,
//!         }
//!     }
//!     Ok(())
//! }
//! ```

/// Bit-granular cursor over caller-owned byte buffers.
pub mod bitcursor;

/// Shared error type and `Result` alias.
pub mod error;

/// Non-blocking / blocking input contracts and the WebM output sinks.
pub mod input;

/// Container-agnostic track and format description.
pub mod media;

/// Sample metadata, flags, and the TS side's pooled sample buffer.
pub mod sample;

/// MPEG-2 Transport Stream demultiplexing.
pub mod ts;

/// WebM/Matroska demultiplexing.
pub mod webm;

pub use error::{ExtractorError, Result};
