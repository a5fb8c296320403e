//! In-memory transcript model.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One spoken utterance with its start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    /// Start offset in seconds from the beginning of the episode.
    pub offset_seconds: f64,
    /// What was said.
    pub text: String,
    /// Who said it, if known.
    pub speaker: Option<String>,
}

impl TranscriptLine {
    /// Create a new transcript line.
    pub fn new(offset_seconds: f64, text: impl Into<String>, speaker: Option<&str>) -> Self {
        Self {
            offset_seconds,
            text: text.into(),
            speaker: speaker.map(str::to_string),
        }
    }

    /// Render the line with speaker attribution ("Stefan: Hello there.").
    pub fn attributed(&self) -> String {
        let text = self.text.trim();
        match self.speaker.as_deref() {
            Some(speaker) if !speaker.is_empty() => format!("{}: {}", speaker, text),
            _ => text.to_string(),
        }
    }
}

/// An author-curated highlight with an exact deep link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotableClip {
    /// Clip name; matches a transcript section header.
    pub name: String,
    /// Start offset in seconds.
    pub start_offset_seconds: f64,
    /// Deep link to the media at `start_offset_seconds`.
    pub url: String,
    /// End offset in seconds, when the author recorded one.
    pub end_offset_seconds: Option<f64>,
}

/// A headered section of the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSection {
    /// Section header as written by the author.
    pub header: String,
    /// Range of lines (into `EpisodeTranscript::lines`) under this header.
    pub lines: Range<usize>,
}

/// A parsed episode transcript with its metadata.
#[derive(Debug, Clone)]
pub struct EpisodeTranscript {
    /// Episode identifier used for filtering.
    pub id: String,
    /// Full episode title.
    pub title: String,
    /// Short episode title.
    pub short_title: Option<String>,
    /// Season label.
    pub season: Option<String>,
    /// Episode number label.
    pub episode_number: Option<String>,
    /// Base URL of the source media, without a time offset.
    pub media_url: Option<String>,
    /// Curated clips.
    pub clips: Vec<QuotableClip>,
    /// All lines in transcript order.
    pub lines: Vec<TranscriptLine>,
    /// Headered sections; lines before the first header belong to none.
    pub sections: Vec<TranscriptSection>,
}

impl EpisodeTranscript {
    /// Lines under the given section.
    pub fn section_lines(&self, section: &TranscriptSection) -> &[TranscriptLine] {
        &self.lines[section.lines.clone()]
    }

    /// Find the clip whose name matches a header.
    pub fn clip_for(&self, header: &str) -> Option<&QuotableClip> {
        let header = header.trim();
        self.clips.iter().find(|c| c.name.trim() == header)
    }

    /// Offset of the last line, or 0 for an empty transcript.
    pub fn last_offset(&self) -> f64 {
        self.lines.last().map(|l| l.offset_seconds).unwrap_or(0.0)
    }

    /// Distinct speakers across the whole episode, sorted.
    pub fn speakers(&self) -> Vec<String> {
        distinct_speakers(&self.lines)
    }
}

/// Distinct speaker names across lines, sorted.
pub fn distinct_speakers(lines: &[TranscriptLine]) -> Vec<String> {
    let mut speakers: Vec<String> = lines
        .iter()
        .filter_map(|l| l.speaker.as_deref())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    speakers.sort();
    speakers.dedup();
    speakers
}

/// Format seconds as MM:SS or HH:MM:SS.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributed_line() {
        let line = TranscriptLine::new(12.0, "  Hello there. ", Some("Stefan"));
        assert_eq!(line.attributed(), "Stefan: Hello there.");

        let anonymous = TranscriptLine::new(12.0, "Hello there.", None);
        assert_eq!(anonymous.attributed(), "Hello there.");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(65.0), "01:05");
        assert_eq!(format_timestamp(2139.0), "35:39");
        assert_eq!(format_timestamp(3665.0), "01:01:05");
    }

    #[test]
    fn test_distinct_speakers() {
        let lines = vec![
            TranscriptLine::new(0.0, "a", Some("Stefan")),
            TranscriptLine::new(1.0, "b", Some("Alexey")),
            TranscriptLine::new(2.0, "c", Some("Stefan")),
            TranscriptLine::new(3.0, "d", None),
        ];
        assert_eq!(distinct_speakers(&lines), vec!["Alexey", "Stefan"]);
    }
}
