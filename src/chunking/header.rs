//! Header-based chunking.
//!
//! Each authored section becomes one segment. Start offset and deep link are
//! copied from the quotable clip named like the header and are never derived
//! from line timestamps.

use super::{ChunkStrategy, Chunker, ChunkingConfig, Segment};
use crate::config::MissingClipPolicy;
use crate::error::ChunkingError;
use crate::transcript::{distinct_speakers, EpisodeTranscript, TranscriptLine};
use tracing::{debug, warn};

/// Section-per-segment chunker anchored to quotable clips.
pub struct HeaderChunker;

impl Chunker for HeaderChunker {
    fn strategy(&self) -> ChunkStrategy {
        ChunkStrategy::Header
    }

    fn chunk(
        &self,
        transcript: &EpisodeTranscript,
        config: &ChunkingConfig,
    ) -> Result<Vec<Segment>, ChunkingError> {
        let mut segments = Vec::new();

        for (i, section) in transcript.sections.iter().enumerate() {
            let lines = transcript.section_lines(section);
            if lines.is_empty() {
                debug!("Section '{}' has no lines, skipping", section.header);
                continue;
            }

            let Some(clip) = transcript.clip_for(&section.header) else {
                let err = ChunkingError::MissingClip {
                    episode: transcript.id.clone(),
                    header: section.header.clone(),
                };
                match config.on_missing_clip {
                    MissingClipPolicy::Fail => return Err(err),
                    MissingClipPolicy::Skip => {
                        warn!("{}; section skipped", err);
                        continue;
                    }
                }
            };

            let start = clip.start_offset_seconds;
            let next_start = transcript.sections[i + 1..]
                .iter()
                .find_map(|s| transcript.clip_for(&s.header))
                .map(|c| c.start_offset_seconds);
            let last_line = lines.last().map(|l| l.offset_seconds).unwrap_or(start);

            let end = next_start
                .filter(|&n| n >= start)
                .or(clip.end_offset_seconds.filter(|&e| e >= start))
                .unwrap_or(last_line)
                .max(start);

            segments.push(Segment {
                episode_id: transcript.id.clone(),
                episode_title: transcript.title.clone(),
                short_title: transcript.short_title.clone(),
                season: transcript.season.clone(),
                strategy: ChunkStrategy::Header,
                text: join_lines(lines),
                speakers: distinct_speakers(lines),
                start_seconds: start,
                end_seconds: end,
                deep_link: clip.url.clone(),
                source_header: Some(section.header.clone()),
            });
        }

        Ok(segments)
    }
}

/// Concatenate speaker-attributed lines.
pub(super) fn join_lines(lines: &[TranscriptLine]) -> String {
    lines
        .iter()
        .map(TranscriptLine::attributed)
        .collect::<Vec<_>>()
        .join(" ")
}
