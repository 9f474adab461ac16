// MKV (Matroska/WebM) demuxing over a decoded element stream
// Provides the track table and per-track encoded chunks

use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub mod block;
pub mod cluster;
pub mod tracks;
pub mod vint;

pub use block::{BlockFlags, BlockHeader, Lacing};
pub use cluster::extract_chunks;
pub use tracks::{build_tracks, TrackBuilder};
pub use vint::{decode_vint, read_vint, Vint};

/// Matroska TrackType value for video tracks.
pub const TRACK_TYPE_VIDEO: u64 = 1;

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    /// Only type 1 is video; every other value is treated as audio.
    pub fn from_track_type(track_type: u64) -> Self {
        if track_type == TRACK_TYPE_VIDEO {
            TrackKind::Video
        } else {
            TrackKind::Audio
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub track_number: u64,
    pub codec_id: String,
    pub kind: TrackKind,
    /// Codec initialization data (e.g. VP9/AV1 config, avcC)
    pub codec_private: Option<Bytes>,
}

impl Track {
    pub fn is_video(&self) -> bool {
        self.kind == TrackKind::Video
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkKind {
    Key,
    Delta,
}

/// One encoded media sample ready for a decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: ChunkKind,
    pub timestamp_us: u64,
    /// Synthetic; taken from config, not from the container
    pub duration_us: u64,
    pub payload: Bytes,
}

impl Chunk {
    pub fn is_key(&self) -> bool {
        self.kind == ChunkKind::Key
    }
}
