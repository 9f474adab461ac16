//! Demuxer error type.

use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemuxError {
    #[error("Truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },
    #[error("Malformed vint: no width marker in first byte {first_byte:#04x}")]
    MalformedVarInt { first_byte: u8 },
    #[error("Malformed block ({len} bytes): {reason}")]
    MalformedBlock { len: usize, reason: &'static str },
    #[error("Element decoder failed: {0}")]
    DecoderFailure(#[source] Box<dyn StdError + Send + Sync>),
    #[error("Invalid demux config: {0}")]
    InvalidConfig(String),
}

impl DemuxError {
    /// Wraps an error raised by the element decoder, keeping it as the source.
    pub fn decoder<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        DemuxError::DecoderFailure(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, DemuxError>;
