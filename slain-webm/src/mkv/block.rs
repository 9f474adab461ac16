//! SimpleBlock header decoding.
//!
//! Layout: track number (vint), relative timestamp (i16 BE), flags (u8),
//! then the frame data.

use bytes::Buf;

use super::vint::read_vint;
use crate::error::{DemuxError, Result};

/// Smallest possible header: 1-byte track vint, 2-byte timestamp, flags.
pub const MIN_BLOCK_HEADER: usize = 4;

const FLAG_KEYFRAME: u8 = 0x80;
const FLAG_INVISIBLE: u8 = 0x08;
const FLAG_LACING: u8 = 0x06;
const FLAG_DISCARDABLE: u8 = 0x01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lacing {
    None,
    Xiph,
    FixedSize,
    Ebml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockFlags(pub u8);

impl BlockFlags {
    pub fn keyframe(self) -> bool {
        self.0 & FLAG_KEYFRAME != 0
    }

    pub fn invisible(self) -> bool {
        self.0 & FLAG_INVISIBLE != 0
    }

    pub fn discardable(self) -> bool {
        self.0 & FLAG_DISCARDABLE != 0
    }

    pub fn lacing(self) -> Lacing {
        match (self.0 & FLAG_LACING) >> 1 {
            0 => Lacing::None,
            1 => Lacing::Xiph,
            2 => Lacing::FixedSize,
            _ => Lacing::Ebml,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub track_number: u64,
    /// Offset from the cluster timestamp, in container ticks
    pub relative_timestamp: i16,
    pub flags: BlockFlags,
    /// Bytes consumed by the header; frame data starts here
    pub header_len: usize,
}

impl BlockHeader {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < MIN_BLOCK_HEADER {
            return Err(DemuxError::MalformedBlock {
                len: payload.len(),
                reason: "shorter than minimal block header",
            });
        }

        let mut buf = payload;
        let track = read_vint(&mut buf)?;

        if buf.remaining() < 3 {
            return Err(DemuxError::MalformedBlock {
                len: payload.len(),
                reason: "no room for timestamp and flags after track number",
            });
        }

        let relative_timestamp = buf.get_i16();
        let flags = BlockFlags(buf.get_u8());

        Ok(Self {
            track_number: track.value,
            relative_timestamp,
            flags,
            header_len: track.length + 3,
        })
    }

    /// Frame data following the header.
    pub fn frame<'a>(&self, payload: &'a [u8]) -> &'a [u8] {
        &payload[self.header_len.min(payload.len())..]
    }
}
