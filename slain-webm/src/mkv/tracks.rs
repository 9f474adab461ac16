//! Track table construction.
//!
//! Walks the element list once with an explicit scope. A `TrackEntry`
//! opens a scope that collects attributes until the next `TrackEntry`, the
//! first `Cluster`, or the end of the list.

use bytes::Bytes;

use super::{Track, TrackKind};
use crate::element::{Element, ElementName};

/// Accumulates one TrackEntry's attributes.
#[derive(Debug, Default, Clone)]
pub struct TrackBuilder {
    track_number: Option<u64>,
    codec_id: Option<String>,
    kind: Option<TrackKind>,
    codec_private: Option<Bytes>,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one child element. Returns false if the element is not a
    /// track attribute.
    pub fn apply(&mut self, element: &Element) -> bool {
        match element.kind() {
            ElementName::TrackNumber => self.track_number = element.unsigned(),
            ElementName::CodecId => self.codec_id = element.text().map(str::to_string),
            ElementName::TrackType => {
                self.kind = element.unsigned().map(TrackKind::from_track_type)
            }
            ElementName::CodecPrivate => {
                self.codec_private = element.data.as_deref().map(Bytes::copy_from_slice)
            }
            _ => return false,
        }
        true
    }

    /// Finalizes the entry. Entries without a non-zero track number yield `None`.
    pub fn finish(self) -> Option<Track> {
        let track_number = self.track_number.filter(|&n| n != 0)?;
        Some(Track {
            track_number,
            codec_id: self.codec_id.unwrap_or_default(),
            kind: self.kind.unwrap_or(TrackKind::Audio),
            codec_private: self.codec_private,
        })
    }
}

enum Scope {
    Outside,
    InTrackEntry(TrackBuilder),
}

/// Builds the track table in first-appearance order.
pub fn build_tracks(elements: &[Element]) -> Vec<Track> {
    let mut tracks = Vec::new();
    let mut scope = Scope::Outside;

    for element in elements {
        match element.kind() {
            ElementName::TrackEntry => {
                let previous = std::mem::replace(&mut scope, Scope::InTrackEntry(TrackBuilder::new()));
                close(previous, &mut tracks);
            }
            ElementName::Cluster => {
                let previous = std::mem::replace(&mut scope, Scope::Outside);
                close(previous, &mut tracks);
            }
            _ => {
                if let Scope::InTrackEntry(builder) = &mut scope {
                    builder.apply(element);
                }
            }
        }
    }
    close(scope, &mut tracks);

    tracks
}

fn close(scope: Scope, tracks: &mut Vec<Track>) {
    let Scope::InTrackEntry(builder) = scope else {
        return;
    };

    let Some(track) = builder.finish() else {
        tracing::debug!("Discarding TrackEntry without track number");
        return;
    };

    if let Some(existing) = tracks
        .iter_mut()
        .find(|t| t.track_number == track.track_number)
    {
        tracing::warn!(
            "Duplicate TrackEntry for track {}, keeping the later one",
            track.track_number
        );
        *existing = track;
        return;
    }

    tracing::debug!(
        "Track {}: {} ({:?})",
        track.track_number,
        track.codec_id,
        track.kind
    );
    tracks.push(track);
}
