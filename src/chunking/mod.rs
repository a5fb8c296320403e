//! Transcript chunking strategies.
//!
//! Two independent strategies turn an episode transcript into searchable
//! segments:
//!
//! - [`HeaderChunker`] groups the lines under each authored section header and
//!   anchors the segment to the matching quotable clip.
//! - [`WindowChunker`] slides an overlapping fixed-duration window over the
//!   transcript timeline.

mod header;
mod window;

pub use header::HeaderChunker;
pub use window::WindowChunker;

use crate::config::{ChunkingSettings, MissingClipPolicy};
use crate::error::ChunkingError;
use crate::transcript::{format_timestamp, EpisodeTranscript};
use serde::{Deserialize, Serialize};
use url::Url;

/// Which strategy produced a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// One segment per authored section header.
    Header,
    /// One segment per sliding time window.
    Window,
}

impl ChunkStrategy {
    pub const ALL: [ChunkStrategy; 2] = [ChunkStrategy::Header, ChunkStrategy::Window];
}

impl std::str::FromStr for ChunkStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "header" => Ok(ChunkStrategy::Header),
            "window" => Ok(ChunkStrategy::Window),
            _ => Err(format!("Unknown chunk strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for ChunkStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkStrategy::Header => write!(f, "header"),
            ChunkStrategy::Window => write!(f, "window"),
        }
    }
}

/// A retrievable span of transcript text with its timestamp and deep link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Episode this segment belongs to.
    pub episode_id: String,
    /// Full episode title.
    pub episode_title: String,
    /// Short episode title.
    pub short_title: Option<String>,
    /// Season label of the episode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    /// Strategy that produced this segment.
    pub strategy: ChunkStrategy,
    /// Concatenated, speaker-attributed transcript lines.
    pub text: String,
    /// Distinct speakers in this segment.
    pub speakers: Vec<String>,
    /// Start time in seconds.
    pub start_seconds: f64,
    /// End time in seconds.
    pub end_seconds: f64,
    /// Media URL positioned at `start_seconds`.
    pub deep_link: String,
    /// Section header (header segments only).
    pub source_header: Option<String>,
}

impl Segment {
    /// Duration of this segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Format the start timestamp for display.
    pub fn format_timestamp(&self) -> String {
        format_timestamp(self.start_seconds)
    }

    /// Section header, or `~MM:SS` for window segments.
    pub fn label(&self) -> String {
        match &self.source_header {
            Some(header) => header.clone(),
            None => format!("~{}", self.format_timestamp()),
        }
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Sliding window length in seconds.
    pub window_seconds: u32,
    /// Distance between window starts in seconds.
    pub step_seconds: u32,
    /// Policy for header sections without a matching clip.
    pub on_missing_clip: MissingClipPolicy,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            window_seconds: 60,
            step_seconds: 30,
            on_missing_clip: MissingClipPolicy::Fail,
        }
    }
}

impl From<&ChunkingSettings> for ChunkingConfig {
    fn from(settings: &ChunkingSettings) -> Self {
        Self {
            window_seconds: settings.window_seconds,
            step_seconds: settings.step_seconds,
            on_missing_clip: settings.on_missing_clip,
        }
    }
}

/// A pure transform from a transcript to one strategy's segments.
pub trait Chunker {
    /// The strategy this chunker implements.
    fn strategy(&self) -> ChunkStrategy;

    /// Split a transcript into segments.
    fn chunk(
        &self,
        transcript: &EpisodeTranscript,
        config: &ChunkingConfig,
    ) -> Result<Vec<Segment>, ChunkingError>;
}

/// Create the chunker for a strategy.
pub fn create_chunker(strategy: ChunkStrategy) -> Box<dyn Chunker> {
    match strategy {
        ChunkStrategy::Header => Box::new(HeaderChunker),
        ChunkStrategy::Window => Box::new(WindowChunker),
    }
}

/// Append a `t=<seconds>` time offset to a media URL, replacing any existing one.
pub fn deep_link_at(base: &str, seconds: f64) -> String {
    let secs = seconds.max(0.0).floor() as u64;

    match Url::parse(base) {
        Ok(mut url) => {
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != "t")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.query_pairs_mut()
                .clear()
                .extend_pairs(pairs)
                .append_pair("t", &secs.to_string());
            url.to_string()
        }
        Err(_) => {
            let separator = if base.contains('?') { '&' } else { '?' };
            format!("{}{}t={}", base, separator, secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::segment;

    #[test]
    fn test_deep_link_at() {
        assert_eq!(
            deep_link_at("https://www.youtube.com/watch?v=IDzhmmKeNG4", 60.0),
            "https://www.youtube.com/watch?v=IDzhmmKeNG4&t=60"
        );
        assert_eq!(
            deep_link_at("https://www.youtube.com/watch?v=abc&t=10", 90.7),
            "https://www.youtube.com/watch?v=abc&t=90"
        );
        assert_eq!(
            deep_link_at("https://example.com/ep/1", 0.0),
            "https://example.com/ep/1?t=0"
        );
    }

    #[test]
    fn test_segment_label() {
        let header = segment("ep1", ChunkStrategy::Header, 2139.0, 2397.0);
        assert_eq!(header.label(), "Section at 2139");

        let window = segment("ep1", ChunkStrategy::Window, 90.0, 150.0);
        assert_eq!(window.label(), "~01:30");
        assert_eq!(window.duration(), 60.0);
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("header".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::Header);
        assert_eq!("WINDOW".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::Window);
        assert!("semantic".parse::<ChunkStrategy>().is_err());
    }
}
