//! Shared test fixtures.

use crate::chunking::{deep_link_at, ChunkStrategy, Segment};
use crate::index::ScoredSegment;
use crate::transcript::{
    parse_document, EpisodeTranscript, QuotableClip, TranscriptLine, TranscriptSection,
};

pub(crate) const SAMPLE_EPISODE: &str = r#"---
title: "AI in Healthcare & Digital Therapeutics"
short: "ML Healthcare"
season: 8
episode: 4
ids:
  youtube: IDzhmmKeNG4
quotableClips:
  - name: 'Personalization Strategy: Agenda-Driven Recommender Systems'
    startOffset: 2139
    url: https://www.youtube.com/watch?v=IDzhmmKeNG4&t=2139
    endOffset: 2397
  - name: A/B Testing as Personalization Foundation
    startOffset: 2397
    url: https://www.youtube.com/watch?v=IDzhmmKeNG4&t=2397
transcript:
  - line: Welcome to the show.
    sec: 2100
    who: Alexey
  - header: 'Personalization Strategy: Agenda-Driven Recommender Systems'
  - line: Yes. Again, this is a work in progress.
    sec: 2161
    who: Stefan
  - line: We build a recommender with an agenda.
    sec: 2200
    who: Stefan
  - header: A/B Testing as Personalization Foundation
  - line: A/B testing comes before collaborative filtering.
    sec: 2400
    who: Stefan
---

Links:
* [LinkedIn](https://linkedin.com)
"#;

/// The sample episode, parsed.
pub(crate) fn sample_transcript() -> EpisodeTranscript {
    parse_document(SAMPLE_EPISODE, "sample.md", "sample").unwrap()
}

/// Build a transcript for episode `ep1` from `(header, [(offset, text)])` sections.
pub(crate) fn transcript_with(
    sections: Vec<(&str, Vec<(f64, &str)>)>,
    clips: Vec<QuotableClip>,
) -> EpisodeTranscript {
    let mut lines = Vec::new();
    let mut parsed_sections = Vec::new();

    for (header, section_lines) in sections {
        let start = lines.len();
        for (offset, text) in section_lines {
            lines.push(TranscriptLine::new(offset, text, None));
        }
        parsed_sections.push(TranscriptSection {
            header: header.to_string(),
            lines: start..lines.len(),
        });
    }

    EpisodeTranscript {
        id: "ep1".to_string(),
        title: "Episode One".to_string(),
        short_title: None,
        season: None,
        episode_number: None,
        media_url: Some("https://www.youtube.com/watch?v=ep1video".to_string()),
        clips,
        lines,
        sections: parsed_sections,
    }
}

/// A bare segment; header segments are labelled "Section at <start>".
pub(crate) fn segment(episode: &str, strategy: ChunkStrategy, start: f64, end: f64) -> Segment {
    Segment {
        episode_id: episode.to_string(),
        episode_title: format!("Title of {}", episode),
        short_title: None,
        season: None,
        strategy,
        text: String::new(),
        speakers: Vec::new(),
        start_seconds: start,
        end_seconds: end,
        deep_link: deep_link_at(&format!("https://www.youtube.com/watch?v={}", episode), start),
        source_header: match strategy {
            ChunkStrategy::Header => Some(format!("Section at {}", start)),
            ChunkStrategy::Window => None,
        },
    }
}

/// Pair a segment with a score.
pub(crate) fn scored(segment: Segment, score: f64) -> ScoredSegment {
    ScoredSegment { segment, score }
}
