//! Cluster scanning and chunk extraction.
//!
//! Each `Cluster` must be followed (before the next `Cluster`) by a
//! `Timestamp` giving its base time. The run of `SimpleBlock` elements that
//! immediately follows the timestamp holds the cluster's media; the first
//! element of any other kind ends the run, and the rest of the cluster is
//! ignored.

use bytes::Bytes;

use super::block::{BlockHeader, Lacing};
use super::{Chunk, ChunkKind, Track};
use crate::config::{ticks_to_us, DemuxConfig};
use crate::element::{Element, ElementName};
use crate::error::Result;

/// Time base applied to extracted chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkTiming {
    pub timestamp_scale_ns: u64,
    pub duration_us: u64,
}

impl From<&DemuxConfig> for ChunkTiming {
    fn from(config: &DemuxConfig) -> Self {
        Self {
            timestamp_scale_ns: config.timestamp_scale_ns,
            duration_us: config.chunk_duration_us,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClusterState {
    Outside,
    AwaitingTimestamp,
    InBlockRun { base: u64 },
    Drained,
}

/// Extracts the chunks addressed to `target`, in file order.
pub fn extract_chunks(
    elements: &[Element],
    target: &Track,
    timing: ChunkTiming,
) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();
    let mut state = ClusterState::Outside;
    let mut cluster_index = 0usize;

    for element in elements {
        let kind = element.kind();

        if kind == ElementName::Cluster {
            if state == ClusterState::AwaitingTimestamp {
                tracing::debug!("Skipping cluster {} without timestamp", cluster_index);
            }
            cluster_index += 1;
            state = ClusterState::AwaitingTimestamp;
            continue;
        }

        state = match state {
            ClusterState::AwaitingTimestamp if kind == ElementName::Timestamp => {
                match element.unsigned() {
                    Some(base) => ClusterState::InBlockRun { base },
                    None => {
                        tracing::warn!(
                            "Cluster {} timestamp has no integer value, skipping cluster",
                            cluster_index
                        );
                        ClusterState::Drained
                    }
                }
            }
            ClusterState::InBlockRun { base } if kind == ElementName::SimpleBlock => {
                if let Some(chunk) = decode_block(element, base, target, timing)? {
                    chunks.push(chunk);
                }
                ClusterState::InBlockRun { base }
            }
            ClusterState::InBlockRun { .. } => ClusterState::Drained,
            other => other,
        };
    }

    if state == ClusterState::AwaitingTimestamp {
        tracing::debug!("Skipping cluster {} without timestamp", cluster_index);
    }

    Ok(chunks)
}

fn decode_block(
    element: &Element,
    base: u64,
    target: &Track,
    timing: ChunkTiming,
) -> Result<Option<Chunk>> {
    let payload = element.data.as_deref().unwrap_or_default();
    let header = BlockHeader::parse(payload)?;

    if header.track_number != target.track_number {
        return Ok(None);
    }

    let relative = i64::from(header.relative_timestamp);
    let ticks = base.saturating_add_signed(relative);
    if relative < 0 && base < relative.unsigned_abs() {
        tracing::warn!(
            "Block timestamp {}{} is before zero, clamping",
            base,
            relative
        );
    }

    if header.flags.lacing() != Lacing::None {
        tracing::warn!(
            "Track {} block uses {:?} lacing, emitting it as one chunk",
            header.track_number,
            header.flags.lacing()
        );
    }

    let kind = if header.flags.keyframe() {
        ChunkKind::Key
    } else {
        ChunkKind::Delta
    };

    Ok(Some(Chunk {
        kind,
        timestamp_us: ticks_to_us(ticks, timing.timestamp_scale_ns),
        duration_us: timing.duration_us,
        payload: Bytes::copy_from_slice(header.frame(payload)),
    }))
}
