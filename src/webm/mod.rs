//! # WebM/Matroska Extractor
//!
//! An event-driven EBML walker ([`ebml`]) drives a per-element dispatch
//! table (§4.9) implemented by [`extractor::WebmExtractor`]: track
//! discovery ([`track`]), codec-private parsing ([`codec_private`]), the
//! seek-point index ([`cues`]), and lace/block decoding ([`block`]) all
//! live behind that one state machine. [`varint`] is the shared EBML
//! variable-length integer codec both the reader and the block parser
//! build on.

/// Block/SimpleBlock header and lacing parser, and the sample payload writer.
pub mod block;
/// Codec-private parsers for AVC, Vorbis, and Opus.
pub mod codec_private;
/// `Cues` seek-index accumulation.
pub mod cues;
/// Event-driven EBML tree reader.
pub mod ebml;
/// State machine and public entry point.
pub mod extractor;
/// Element ID table and tagged-dispatch lookup.
pub mod ids;
/// Track descriptor construction.
pub mod track;
/// EBML variable-length integer codec.
pub mod varint;

pub use cues::ChunkIndex;
pub use extractor::WebmExtractor;
