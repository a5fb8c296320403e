//! Sliding-window chunking.
//!
//! Windows `[k*step, k*step + window)` are laid over the transcript timeline
//! until the window start passes the last line. With the defaults (60s window,
//! 30s step) every moment appears in two windows.

use super::header::join_lines;
use super::{deep_link_at, ChunkStrategy, Chunker, ChunkingConfig, Segment};
use crate::error::ChunkingError;
use crate::transcript::{distinct_speakers, EpisodeTranscript, TranscriptLine};
use tracing::debug;

/// Fixed-duration overlapping window chunker.
pub struct WindowChunker;

impl Chunker for WindowChunker {
    fn strategy(&self) -> ChunkStrategy {
        ChunkStrategy::Window
    }

    fn chunk(
        &self,
        transcript: &EpisodeTranscript,
        config: &ChunkingConfig,
    ) -> Result<Vec<Segment>, ChunkingError> {
        if config.window_seconds == 0 || config.step_seconds == 0 {
            return Err(ChunkingError::InvalidWindow {
                window: config.window_seconds,
                step: config.step_seconds,
            });
        }

        if transcript.lines.is_empty() {
            return Ok(Vec::new());
        }

        let base_url = transcript
            .media_url
            .as_deref()
            .ok_or_else(|| ChunkingError::MissingMediaUrl {
                episode: transcript.id.clone(),
            })?;

        let window = config.window_seconds as f64;
        let step = config.step_seconds as f64;
        let last_offset = transcript.last_offset();

        // An episode shorter than one window gets a single whole-episode window.
        let last_start = if last_offset < window { 0.0 } else { last_offset };

        let mut segments = Vec::new();
        let mut k: u64 = 0;

        loop {
            let start = k as f64 * step;
            if start > last_start {
                break;
            }
            let end = start + window;

            let lines: Vec<TranscriptLine> = transcript
                .lines
                .iter()
                .filter(|l| l.offset_seconds >= start && l.offset_seconds < end)
                .cloned()
                .collect();

            if !lines.is_empty() {
                segments.push(Segment {
                    episode_id: transcript.id.clone(),
                    episode_title: transcript.title.clone(),
                    short_title: transcript.short_title.clone(),
                    season: transcript.season.clone(),
                    strategy: ChunkStrategy::Window,
                    text: join_lines(&lines),
                    speakers: distinct_speakers(&lines),
                    start_seconds: start,
                    end_seconds: end,
                    deep_link: deep_link_at(base_url, start),
                    source_header: None,
                });
            }

            k += 1;
        }

        debug!(
            "Episode {}: {} window segments ({}s window, {}s step)",
            transcript.id,
            segments.len(),
            config.window_seconds,
            config.step_seconds
        );

        Ok(segments)
    }
}
