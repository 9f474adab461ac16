//! # Element Stream
//!
//! Input model handed over by the EBML element decoder. The decoder flattens
//! the Matroska tree into one ordered list; parents are followed by their
//! children and no end-of-group element is ever emitted, so group boundaries
//! are recovered from the names of the elements themselves.

use std::error::Error as StdError;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ============================================================================
// Data Types
// ============================================================================

/// Decoded scalar payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementValue {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

impl ElementValue {
    /// Non-negative integer view, used for track numbers, types and timestamps.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ElementValue::Unsigned(v) => Some(*v),
            ElementValue::Signed(v) => u64::try_from(*v).ok(),
            ElementValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ElementValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One named unit of the decoded container.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub value: Option<ElementValue>,
    pub data: Option<Bytes>,
}

impl Element {
    /// Element carrying neither scalar nor payload (master elements).
    pub fn marker(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            data: None,
        }
    }

    pub fn scalar(name: impl Into<String>, value: ElementValue) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            data: None,
        }
    }

    pub fn binary(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            value: None,
            data: Some(data.into()),
        }
    }

    pub fn kind(&self) -> ElementName {
        ElementName::from_name(&self.name)
    }

    pub fn unsigned(&self) -> Option<u64> {
        self.value.as_ref().and_then(ElementValue::as_u64)
    }

    pub fn text(&self) -> Option<&str> {
        self.value.as_ref().and_then(ElementValue::as_str)
    }
}

/// Element names the demuxer understands. Anything else maps to `Other`
/// and is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementName {
    Segment,
    Info,
    TimestampScale,
    Tracks,
    TrackEntry,
    TrackNumber,
    CodecId,
    TrackType,
    CodecPrivate,
    Cluster,
    Timestamp,
    SimpleBlock,
    BlockGroup,
    Cues,
    Other,
}

impl ElementName {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Segment" => ElementName::Segment,
            "Info" => ElementName::Info,
            "TimestampScale" | "TimecodeScale" => ElementName::TimestampScale,
            "Tracks" => ElementName::Tracks,
            "TrackEntry" => ElementName::TrackEntry,
            "TrackNumber" => ElementName::TrackNumber,
            "CodecID" | "CodecId" => ElementName::CodecId,
            "TrackType" => ElementName::TrackType,
            "CodecPrivate" => ElementName::CodecPrivate,
            "Cluster" => ElementName::Cluster,
            "Timestamp" | "Timecode" => ElementName::Timestamp,
            "SimpleBlock" => ElementName::SimpleBlock,
            "BlockGroup" => ElementName::BlockGroup,
            "Cues" => ElementName::Cues,
            _ => ElementName::Other,
        }
    }
}

// ============================================================================
// Decoder Collaborator
// ============================================================================

/// Turns a raw container buffer into the flat element list.
///
/// Implemented by whatever EBML reader the host application uses. Any
/// `FnMut(&[u8]) -> Result<Vec<Element>, E>` closure also qualifies.
pub trait ElementDecoder {
    type Error: StdError + Send + Sync + 'static;

    fn decode(&mut self, buffer: &[u8]) -> Result<Vec<Element>, Self::Error>;
}

impl<F, E> ElementDecoder for F
where
    F: FnMut(&[u8]) -> Result<Vec<Element>, E>,
    E: StdError + Send + Sync + 'static,
{
    type Error = E;

    fn decode(&mut self, buffer: &[u8]) -> Result<Vec<Element>, E> {
        self(buffer)
    }
}

// ============================================================================
// Test Fixtures
// ============================================================================
