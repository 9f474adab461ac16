//! # SLAIN WebM
//!
//! Matroska/WebM demuxing over a decoded EBML element stream.
//!
//! An [`ElementDecoder`] turns the raw file into a flat list of named
//! elements; the demuxer builds the track table from it and pulls the
//! encoded chunks of the first video track, with absolute timestamps in
//! microseconds.

pub mod config;
pub mod demuxer;
pub mod element;
pub mod error;
pub mod mkv;

pub use config::DemuxConfig;
pub use demuxer::{demux_elements, ParseResult, WebmDemuxer};
pub use element::{Element, ElementDecoder, ElementName, ElementValue};
pub use error::{DemuxError, Result};
pub use mkv::{Chunk, ChunkKind, Track, TrackKind};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
