//! WebM demuxer facade: decoder, track table, video chunks.

use crate::config::DemuxConfig;
use crate::element::{Element, ElementDecoder, ElementName};
use crate::error::{DemuxError, Result};
use crate::mkv::cluster::ChunkTiming;
use crate::mkv::{build_tracks, extract_chunks, Chunk, Track, TrackKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub tracks: Vec<Track>,
    /// First video track, if the file has one
    pub selected_track: Option<Track>,
    /// Chunks of `selected_track`; empty when there is none
    pub chunks: Vec<Chunk>,
}

impl ParseResult {
    pub fn track(&self, track_number: u64) -> Option<&Track> {
        self.tracks.iter().find(|t| t.track_number == track_number)
    }

    pub fn first_track_of(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    pub fn keyframe_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_key()).count()
    }
}

pub struct WebmDemuxer<D: ElementDecoder> {
    decoder: D,
    config: DemuxConfig,
}

impl<D: ElementDecoder> WebmDemuxer<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            config: DemuxConfig::default(),
        }
    }

    pub fn with_config(decoder: D, config: DemuxConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { decoder, config })
    }

    pub fn config(&self) -> &DemuxConfig {
        &self.config
    }

    /// Decodes `buffer` and extracts the track table plus the first video
    /// track's chunks.
    pub fn parse(&mut self, buffer: &[u8]) -> Result<ParseResult> {
        let elements = self
            .decoder
            .decode(buffer)
            .map_err(DemuxError::decoder)?;
        tracing::trace!(
            "Decoded {} elements from {} bytes",
            elements.len(),
            buffer.len()
        );
        demux_elements(&elements, &self.config)
    }
}

/// Runs track and chunk extraction over an already decoded element list.
pub fn demux_elements(elements: &[Element], config: &DemuxConfig) -> Result<ParseResult> {
    config.validate()?;

    let tracks = build_tracks(elements);
    let selected_track = tracks.iter().find(|t| t.is_video()).cloned();

    let chunks = match &selected_track {
        Some(track) => {
            let timing = ChunkTiming {
                timestamp_scale_ns: resolve_timestamp_scale(elements, config),
                duration_us: config.chunk_duration_us,
            };
            extract_chunks(elements, track, timing)?
        }
        None => {
            tracing::debug!("No video track among {} tracks", tracks.len());
            Vec::new()
        }
    };

    tracing::debug!(
        "Demuxed {} tracks, {} chunks for track {:?}",
        tracks.len(),
        chunks.len(),
        selected_track.as_ref().map(|t| t.track_number)
    );

    Ok(ParseResult {
        tracks,
        selected_track,
        chunks,
    })
}

fn resolve_timestamp_scale(elements: &[Element], config: &DemuxConfig) -> u64 {
    if !config.honor_stream_timestamp_scale {
        return config.timestamp_scale_ns;
    }

    elements
        .iter()
        .find(|e| e.kind() == ElementName::TimestampScale)
        .and_then(Element::unsigned)
        .filter(|&scale| scale != 0)
        .unwrap_or(config.timestamp_scale_ns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::fixtures::{simple_block, track_entry, uint};
    use crate::mkv::ChunkKind;

    /// Track 1 VP9 video, one cluster at 1000 with two blocks.
    fn vp9_elements() -> Vec<Element> {
        let mut elements = vec![Element::marker("Segment"), Element::marker("Tracks")];
        elements.extend(track_entry(1, "V_VP9", 1));
        elements.push(Element::marker("Cluster"));
        elements.push(uint("Timestamp", 1000));
        elements.push(simple_block(1, 0x0005, 0x80, &[0xAA, 0xBB]));
        elements.push(simple_block(1, 0x0010, 0x00, &[0xCC]));
        elements
    }

    #[derive(Debug)]
    struct BrokenEbml;

    impl std::fmt::Display for BrokenEbml {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "bad EBML header")
        }
    }

    impl std::error::Error for BrokenEbml {}

    #[test]
    fn parses_single_vp9_track() {
        let mut demuxer = WebmDemuxer::new(|buffer: &[u8]| -> std::result::Result<_, BrokenEbml> {
            assert_eq!(buffer, b"webm");
            Ok(vp9_elements())
        });

        let result = demuxer.parse(b"webm").expect("parse");
        assert_eq!(result.tracks.len(), 1);

        let track = result.selected_track.as_ref().expect("video track");
        assert_eq!(track.track_number, 1);
        assert_eq!(track.codec_id, "V_VP9");

        assert_eq!(result.chunks.len(), 2);
        assert_eq!(result.chunks[0].kind, ChunkKind::Key);
        assert_eq!(result.chunks[0].timestamp_us, 1_005_000);
        assert_eq!(&result.chunks[0].payload[..], &[0xAA, 0xBB]);
        assert_eq!(result.chunks[1].kind, ChunkKind::Delta);
        assert_eq!(result.chunks[1].timestamp_us, 1_016_000);
        assert_eq!(&result.chunks[1].payload[..], &[0xCC]);
        assert_eq!(result.keyframe_count(), 1);
    }

    #[test]
    fn propagates_decoder_failure() {
        let mut demuxer = WebmDemuxer::new(|_: &[u8]| -> std::result::Result<Vec<Element>, _> {
            Err(BrokenEbml)
        });

        let err = demuxer.parse(&[0x1A, 0x45]).unwrap_err();
        match err {
            DemuxError::DecoderFailure(source) => {
                assert!(source.downcast_ref::<BrokenEbml>().is_some())
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn audio_only_file_is_not_an_error() {
        let mut elements = track_entry(1, "A_OPUS", 2);
        elements.push(Element::marker("Cluster"));
        elements.push(uint("Timestamp", 0));
        elements.push(simple_block(1, 0, 0x80, &[0x01]));

        let result = demux_elements(&elements, &DemuxConfig::default()).expect("parse");
        assert_eq!(result.tracks.len(), 1);
        assert!(result.selected_track.is_none());
        assert!(result.chunks.is_empty());
        let audio = result.first_track_of(TrackKind::Audio).expect("audio track");
        assert_eq!(audio.track_number, 1);
    }

    #[test]
    fn selects_first_video_track() {
        let mut elements = track_entry(1, "A_VORBIS", 2);
        elements.extend(track_entry(2, "V_VP8", 1));
        elements.extend(track_entry(3, "V_VP9", 1));
        elements.push(Element::marker("Cluster"));
        elements.push(uint("Timestamp", 0));
        elements.push(simple_block(1, 0, 0x80, &[0x0A]));
        elements.push(simple_block(2, 0, 0x80, &[0x0B]));
        elements.push(simple_block(3, 0, 0x80, &[0x0C]));

        let result = demux_elements(&elements, &DemuxConfig::default()).expect("parse");
        assert_eq!(result.selected_track.as_ref().map(|t| t.track_number), Some(2));
        assert_eq!(result.chunks.len(), 1);
        assert_eq!(&result.chunks[0].payload[..], &[0x0B]);
        assert_eq!(result.track(3).map(|t| t.codec_id.as_str()), Some("V_VP9"));
    }

    #[test]
    fn malformed_block_fails_whole_parse() {
        let mut elements = vp9_elements();
        elements.push(Element::binary("SimpleBlock", vec![0x81]));

        let err = demux_elements(&elements, &DemuxConfig::default()).unwrap_err();
        assert!(matches!(err, DemuxError::MalformedBlock { .. }));
    }

    #[test]
    fn stream_timestamp_scale_is_opt_in() {
        let mut elements = vec![Element::marker("Info"), uint("TimestampScale", 100_000)];
        elements.extend(vp9_elements());

        let ignored = demux_elements(&elements, &DemuxConfig::default()).expect("parse");
        assert_eq!(ignored.chunks[0].timestamp_us, 1_005_000);

        let config = DemuxConfig {
            honor_stream_timestamp_scale: true,
            ..DemuxConfig::default()
        };
        let honored = demux_elements(&elements, &config).expect("parse");
        assert_eq!(honored.chunks[0].timestamp_us, 100_500);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = DemuxConfig {
            timestamp_scale_ns: 0,
            ..DemuxConfig::default()
        };
        let decoder =
            |_: &[u8]| -> std::result::Result<Vec<Element>, BrokenEbml> { Ok(Vec::new()) };
        assert!(matches!(
            WebmDemuxer::with_config(decoder, config),
            Err(DemuxError::InvalidConfig(_))
        ));
    }

    #[test]
    fn chunk_count_matches_blocks_for_track() {
        let mut elements = track_entry(7, "V_AV1", 1);
        elements.extend(track_entry(8, "A_OPUS", 2));
        let mut expected = 0;
        for cluster in 0..4u64 {
            elements.push(Element::marker("Cluster"));
            elements.push(uint("Timestamp", cluster * 1000));
            for i in 0..10i16 {
                let track = if i % 3 == 0 { 8 } else { 7 };
                if track == 7 {
                    expected += 1;
                }
                let flags = if i == 1 { 0x80 } else { 0x00 };
                elements.push(simple_block(track, i * 40, flags, &[i as u8]));
            }
        }

        let result = demux_elements(&elements, &DemuxConfig::default()).expect("parse");
        assert_eq!(result.chunks.len(), expected);
        assert_eq!(result.keyframe_count(), 4);
        assert!(result
            .chunks
            .windows(2)
            .all(|w| w[0].timestamp_us <= w[1].timestamp_us));
    }
}
