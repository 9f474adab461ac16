//! Demuxer configuration.

use serde::{Deserialize, Serialize};

use crate::error::{DemuxError, Result};

/// Matroska default: one tick is one millisecond.
pub const DEFAULT_TIMESTAMP_SCALE_NS: u64 = 1_000_000;
/// Fixed per-chunk duration handed to decoders (~24 fps).
pub const DEFAULT_CHUNK_DURATION_US: u64 = 42_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemuxConfig {
    /// Nanoseconds per container tick
    pub timestamp_scale_ns: u64,
    pub chunk_duration_us: u64,
    /// Let a `TimestampScale` element in the stream override `timestamp_scale_ns`
    pub honor_stream_timestamp_scale: bool,
}

impl Default for DemuxConfig {
    fn default() -> Self {
        Self {
            timestamp_scale_ns: DEFAULT_TIMESTAMP_SCALE_NS,
            chunk_duration_us: DEFAULT_CHUNK_DURATION_US,
            honor_stream_timestamp_scale: false,
        }
    }
}

impl DemuxConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DemuxError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timestamp_scale_ns == 0 {
            return Err(DemuxError::InvalidConfig(
                "timestamp_scale_ns must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Converts container ticks to microseconds, saturating on overflow.
pub fn ticks_to_us(ticks: u64, timestamp_scale_ns: u64) -> u64 {
    let ns = ticks as u128 * timestamp_scale_ns as u128;
    u64::try_from(ns / 1_000).unwrap_or(u64::MAX)
}
