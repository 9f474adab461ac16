//! EBML variable-length integers.

use bytes::Buf;

use crate::error::{DemuxError, Result};

/// Widest vint EBML allows.
pub const MAX_VINT_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vint {
    pub length: usize,
    pub value: u64,
}

/// Reads one vint from the front of `buf`, advancing it by the vint's width.
pub fn read_vint<B: Buf>(buf: &mut B) -> Result<Vint> {
    if !buf.has_remaining() {
        return Err(DemuxError::TruncatedInput {
            needed: 1,
            available: 0,
        });
    }

    let first = buf.get_u8();
    let length = first.leading_zeros() as usize + 1;

    if length > MAX_VINT_LENGTH {
        return Err(DemuxError::MalformedVarInt { first_byte: first });
    }

    let trailing = length - 1;
    if buf.remaining() < trailing {
        return Err(DemuxError::TruncatedInput {
            needed: length,
            available: buf.remaining() + 1,
        });
    }

    // Marker bit and everything above it are dropped; width 8 leaves nothing.
    let mask = (0xFFu16 >> length) as u8;
    let mut value = (first & mask) as u64;
    for _ in 0..trailing {
        value = (value << 8) | buf.get_u8() as u64;
    }

    Ok(Vint { length, value })
}

/// Decodes the vint starting at `offset` without consuming anything.
pub fn decode_vint(bytes: &[u8], offset: usize) -> Result<Vint> {
    let mut rest = bytes.get(offset..).ok_or(DemuxError::TruncatedInput {
        needed: offset + 1,
        available: bytes.len(),
    })?;
    read_vint(&mut rest)
}
