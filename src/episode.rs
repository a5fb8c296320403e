//! Episodes and the segments derived from them.

use crate::chunking::{create_chunker, ChunkStrategy, ChunkingConfig, Segment};
use crate::error::Result;
use crate::transcript::EpisodeTranscript;
use tracing::{info, instrument, warn};

/// One loaded episode: its transcript plus both segment sets.
///
/// Segments are built once and never change; rebuild the episode when its
/// transcript changes.
#[derive(Debug, Clone)]
pub struct Episode {
    transcript: EpisodeTranscript,
    header_segments: Vec<Segment>,
    window_segments: Vec<Segment>,
}

impl Episode {
    /// Chunk a transcript with both strategies.
    #[instrument(skip_all, fields(episode = %transcript.id))]
    pub fn build(transcript: EpisodeTranscript, config: &ChunkingConfig) -> Result<Self> {
        if transcript.lines.is_empty() {
            warn!("No transcript lines in episode '{}'", transcript.id);
        }

        let header_segments = create_chunker(ChunkStrategy::Header).chunk(&transcript, config)?;
        let window_segments = create_chunker(ChunkStrategy::Window).chunk(&transcript, config)?;

        info!(
            "{}: {} header chunks + {} window chunks",
            transcript.id,
            header_segments.len(),
            window_segments.len()
        );

        Ok(Self {
            transcript,
            header_segments,
            window_segments,
        })
    }

    /// Episode identifier.
    pub fn id(&self) -> &str {
        &self.transcript.id
    }

    /// Full title.
    pub fn title(&self) -> &str {
        &self.transcript.title
    }

    pub fn transcript(&self) -> &EpisodeTranscript {
        &self.transcript
    }

    pub fn header_segments(&self) -> &[Segment] {
        &self.header_segments
    }

    pub fn window_segments(&self) -> &[Segment] {
        &self.window_segments
    }

    /// Segments of one strategy.
    pub fn segments(&self, strategy: ChunkStrategy) -> &[Segment] {
        match strategy {
            ChunkStrategy::Header => &self.header_segments,
            ChunkStrategy::Window => &self.window_segments,
        }
    }

    /// All segments, header chunks first.
    pub fn all_segments(&self) -> impl Iterator<Item = &Segment> {
        self.header_segments.iter().chain(self.window_segments.iter())
    }

    /// Label like "S8E4" when season and episode are known.
    pub fn season_label(&self) -> Option<String> {
        match (&self.transcript.season, &self.transcript.episode_number) {
            (Some(season), Some(number)) => Some(format!("S{}E{}", season, number)),
            (Some(season), None) => Some(format!("S{}", season)),
            _ => None,
        }
    }

    /// Duration estimate: offset of the last line.
    pub fn duration_seconds(&self) -> f64 {
        self.transcript.last_offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ChunkingError, ClipcastError};
    use crate::testing::{sample_transcript, transcript_with};

    #[test]
    fn test_build_episode() {
        let episode = Episode::build(sample_transcript(), &ChunkingConfig::default()).unwrap();

        assert_eq!(episode.id(), "IDzhmmKeNG4");
        assert_eq!(episode.header_segments().len(), 2);
        assert!(!episode.window_segments().is_empty());
        assert_eq!(
            episode.all_segments().count(),
            episode.header_segments().len() + episode.window_segments().len()
        );
        assert_eq!(episode.season_label().as_deref(), Some("S8E4"));
        assert_eq!(episode.duration_seconds(), 2400.0);
    }

    #[test]
    fn test_strategies_are_disjoint() {
        let episode = Episode::build(sample_transcript(), &ChunkingConfig::default()).unwrap();
        assert!(episode
            .segments(ChunkStrategy::Header)
            .iter()
            .all(|s| s.strategy == ChunkStrategy::Header && s.source_header.is_some()));
        assert!(episode
            .segments(ChunkStrategy::Window)
            .iter()
            .all(|s| s.strategy == ChunkStrategy::Window && s.source_header.is_none()));
    }

    #[test]
    fn test_missing_clip_aborts_episode() {
        let transcript = transcript_with(vec![("No clip", vec![(1.0, "hi")])], vec![]);
        let err = Episode::build(transcript, &ChunkingConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ClipcastError::Chunking(ChunkingError::MissingClip { .. })
        ));
    }
}
