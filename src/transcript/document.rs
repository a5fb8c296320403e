//! Episode markdown documents with YAML frontmatter.
//!
//! An episode file looks like this:
//!
//! ```text
//! ---
//! title: "AI in Healthcare & Digital Therapeutics"
//! ids:
//!   youtube: IDzhmmKeNG4
//! quotableClips:
//!   - name: 'Personalization Strategy: Agenda-Driven Recommender Systems'
//!     startOffset: 2139
//!     url: https://www.youtube.com/watch?v=IDzhmmKeNG4&t=2139
//! transcript:
//!   - header: 'Personalization Strategy: Agenda-Driven Recommender Systems'
//!   - line: Yes. Again, this is a work in progress...
//!     sec: 2161
//!     who: Stefan
//! ---
//!
//! Links: ...
//! ```
//!
//! Only the frontmatter is read; the markdown body is ignored.

use super::models::{EpisodeTranscript, QuotableClip, TranscriptLine, TranscriptSection};
use crate::error::ParseError;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::sync::LazyLock;
use tracing::debug;

static FRONTMATTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*---[ \t]*\n(.*?)\n---[ \t]*(?:\n(.*))?$").unwrap());

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Frontmatter {
    id: Option<String>,
    title: Option<String>,
    short: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    season: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    episode: Option<String>,
    ids: MediaIds,
    video_url: Option<String>,
    #[serde(rename = "quotableClips")]
    quotable_clips: Vec<RawClip>,
    transcript: Vec<RawEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MediaIds {
    youtube: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawClip {
    #[serde(default)]
    name: String,
    #[serde(rename = "startOffset", default)]
    start_offset: f64,
    #[serde(default)]
    url: String,
    #[serde(rename = "endOffset")]
    end_offset: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Header {
        header: String,
    },
    Line {
        line: String,
        #[serde(default)]
        sec: f64,
        #[serde(default)]
        who: Option<String>,
    },
}

/// Accept YAML strings and numbers alike (`season: 8` or `season: "8"`).
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_yaml::Value::String(s)) => Some(s),
        Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
        Some(serde_yaml::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Split a document into its YAML frontmatter and markdown body.
pub fn split_frontmatter<'a>(content: &'a str, path: &str) -> Result<(&'a str, &'a str), ParseError> {
    let captures = FRONTMATTER
        .captures(content)
        .ok_or_else(|| ParseError::MissingFrontmatter {
            path: path.to_string(),
        })?;

    let yaml = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let body = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
    Ok((yaml, body))
}

/// Parse an episode document.
///
/// `fallback_id` is used when the frontmatter carries neither `id` nor `ids.youtube`.
pub fn parse_document(
    content: &str,
    path: &str,
    fallback_id: &str,
) -> Result<EpisodeTranscript, ParseError> {
    let content = content.replace("\r\n", "\n");
    let (yaml, _body) = split_frontmatter(&content, path)?;
    let frontmatter: Frontmatter = serde_yaml::from_str(yaml)?;

    let youtube_id = frontmatter.ids.youtube.filter(|id| !id.trim().is_empty());
    let id = frontmatter
        .id
        .or_else(|| youtube_id.clone())
        .unwrap_or_else(|| fallback_id.to_string());

    let media_url = frontmatter.video_url.or_else(|| {
        youtube_id
            .as_ref()
            .map(|yt| format!("https://www.youtube.com/watch?v={}", yt))
    });

    let clips = frontmatter
        .quotable_clips
        .into_iter()
        .map(|c| QuotableClip {
            name: c.name,
            start_offset_seconds: c.start_offset,
            url: c.url,
            end_offset_seconds: c.end_offset,
        })
        .collect();

    let mut lines = Vec::new();
    let mut sections: Vec<TranscriptSection> = Vec::new();

    for entry in frontmatter.transcript {
        match entry {
            RawEntry::Header { header } => {
                sections.push(TranscriptSection {
                    header,
                    lines: lines.len()..lines.len(),
                });
            }
            RawEntry::Line { line, sec, who } => {
                lines.push(TranscriptLine {
                    offset_seconds: sec,
                    text: line,
                    speaker: who,
                });
                if let Some(current) = sections.last_mut() {
                    current.lines.end = lines.len();
                }
            }
        }
    }

    debug!(
        "Parsed {}: {} lines, {} sections",
        path,
        lines.len(),
        sections.len()
    );

    Ok(EpisodeTranscript {
        title: frontmatter.title.unwrap_or_else(|| id.clone()),
        id,
        short_title: frontmatter.short,
        season: frontmatter.season,
        episode_number: frontmatter.episode,
        media_url,
        clips,
        lines,
        sections,
    })
}
