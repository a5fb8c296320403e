//! Post-processing that keeps answers tied to retrieved segments.
//!
//! Every link in an answer must be the deep link of a retrieved segment, and
//! every `[MM:SS]` marker must name the start of one. A link cited right
//! after a marker must be that segment's own link; markers cited without a
//! link get it appended.

use crate::chunking::Segment;
use crate::config::GroundingPolicy;
use crate::index::RetrievalResult;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>()\[\]"'`]+"#).unwrap());

static TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d{1,2}:\d{2}(?::\d{2})?)\]").unwrap());

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Something in an answer that no retrieved segment backs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroundingWarning {
    UngroundedLink {
        url: String,
    },
    UngroundedTimestamp {
        timestamp: String,
    },
    /// The marker resolved, but the link cited with it belongs elsewhere.
    MismatchedLink {
        timestamp: String,
        url: String,
        expected: String,
    },
    /// Retrieved segments of several episodes start at this second.
    AmbiguousTimestamp {
        timestamp: String,
    },
}

impl std::fmt::Display for GroundingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroundingWarning::UngroundedLink { url } => {
                write!(f, "Link not among retrieved segments: {}", url)
            }
            GroundingWarning::UngroundedTimestamp { timestamp } => {
                write!(f, "Timestamp not among retrieved segments: [{}]", timestamp)
            }
            GroundingWarning::MismatchedLink {
                timestamp,
                url,
                expected,
            } => write!(
                f,
                "Link cited for [{}] is {} but the segment links to {}",
                timestamp, url, expected
            ),
            GroundingWarning::AmbiguousTimestamp { timestamp } => write!(
                f,
                "Timestamp [{}] matches segments of several episodes; cite the link",
                timestamp
            ),
        }
    }
}

/// Answer text after grounding, with whatever was found ungrounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundedAnswer {
    pub text: String,
    pub warnings: Vec<GroundingWarning>,
}

impl GroundedAnswer {
    /// Text that needed no grounding.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            warnings: Vec::new(),
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Check an answer's links and timestamp markers against retrieved segments.
pub fn ground_answer(
    answer: &str,
    retrieved: &RetrievalResult,
    policy: GroundingPolicy,
) -> GroundedAnswer {
    let links: HashSet<&str> = retrieved
        .deep_links()
        .map(|l| l.trim_end_matches(TRAILING_PUNCTUATION))
        .collect();

    let mut warnings = Vec::new();
    let lines: Vec<String> = answer
        .lines()
        .map(|line| {
            let line = check_links(line, &links, policy, &mut warnings);
            check_timestamps(&line, retrieved, policy, &mut warnings)
        })
        .collect();

    GroundedAnswer {
        text: lines.join("\n"),
        warnings,
    }
}

fn check_links(
    line: &str,
    links: &HashSet<&str>,
    policy: GroundingPolicy,
    warnings: &mut Vec<GroundingWarning>,
) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;

    for m in URL.find_iter(line) {
        let url = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        if links.contains(url) {
            continue;
        }

        warnings.push(GroundingWarning::UngroundedLink {
            url: url.to_string(),
        });

        if policy == GroundingPolicy::Strip {
            out.push_str(&line[last..m.start()]);
            strip_dangling_arrow(&mut out);
            last = m.start() + url.len();
        }
    }

    out.push_str(&line[last..]);
    out
}

/// What a timestamp marker refers to.
enum Resolution<'r> {
    Segment(&'r Segment),
    Ambiguous,
    Unknown,
}

/// Resolve a marker against segment starts.
///
/// A cited link picks the segment with exactly that link, or else narrows the
/// candidates to the episode that link belongs to. Candidates from one
/// episode all point at the same moment of the same media.
fn resolve<'r>(stamp: &str, cited: Option<&str>, retrieved: &'r RetrievalResult) -> Resolution<'r> {
    let Some(seconds) = parse_timestamp(stamp) else {
        return Resolution::Unknown;
    };

    let candidates: Vec<&Segment> = retrieved
        .segments()
        .filter(|s| s.start_seconds.floor() as u64 == seconds)
        .collect();

    if let Some(exact) = cited.and_then(|link| candidates.iter().copied().find(|s| s.deep_link == link)) {
        return Resolution::Segment(exact);
    }

    let owner = cited.and_then(|link| retrieved.segments().find(|s| s.deep_link == link));
    let candidates: Vec<&Segment> = match owner {
        Some(owner) => candidates
            .into_iter()
            .filter(|s| s.episode_id == owner.episode_id)
            .collect(),
        None => candidates,
    };

    match candidates.as_slice() {
        [] => Resolution::Unknown,
        [first, rest @ ..] if rest.iter().all(|s| s.episode_id == first.episode_id) => {
            Resolution::Segment(*first)
        }
        _ => Resolution::Ambiguous,
    }
}

fn check_timestamps(
    line: &str,
    retrieved: &RetrievalResult,
    policy: GroundingPolicy,
    warnings: &mut Vec<GroundingWarning>,
) -> String {
    let markers: Vec<(Range<usize>, &str)> = TIMESTAMP
        .captures_iter(line)
        .filter_map(|caps| Some((caps.get(0)?.range(), caps.get(1)?.as_str())))
        .collect();

    let urls: Vec<Range<usize>> = URL
        .find_iter(line)
        .map(|m| {
            let url = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
            m.start()..m.start() + url.len()
        })
        .collect();

    // Non-overlapping, in line order.
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    for (i, (marker, stamp)) in markers.iter().enumerate() {
        let until = markers
            .get(i + 1)
            .map(|(next, _)| next.start)
            .unwrap_or(line.len());
        let cited = urls
            .iter()
            .find(|u| u.start >= marker.end && u.start < until)
            .cloned();
        let cited_link = cited.clone().map(|range| &line[range]);

        match resolve(stamp, cited_link, retrieved) {
            Resolution::Segment(segment) => match (cited, cited_link) {
                (Some(_), Some(link)) if link == segment.deep_link => {}
                (Some(range), Some(link)) => {
                    warnings.push(GroundingWarning::MismatchedLink {
                        timestamp: stamp.to_string(),
                        url: link.to_string(),
                        expected: segment.deep_link.clone(),
                    });
                    if policy == GroundingPolicy::Strip {
                        edits.push((range, segment.deep_link.clone()));
                    }
                }
                _ => edits.push((marker.end..marker.end, format!(" → {}", segment.deep_link))),
            },
            Resolution::Ambiguous => warnings.push(GroundingWarning::AmbiguousTimestamp {
                timestamp: stamp.to_string(),
            }),
            Resolution::Unknown => {
                warnings.push(GroundingWarning::UngroundedTimestamp {
                    timestamp: stamp.to_string(),
                });
                if policy == GroundingPolicy::Strip {
                    edits.push((marker.clone(), String::new()));
                }
            }
        }
    }

    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for (range, replacement) in edits {
        out.push_str(&line[last..range.start]);
        out.push_str(&replacement);
        last = range.end;
    }
    out.push_str(&line[last..]);
    out
}

/// Parse `M:SS`, `MM:SS` or `H:MM:SS` into seconds.
pub fn parse_timestamp(stamp: &str) -> Option<u64> {
    let parts: Vec<u64> = stamp
        .split(':')
        .map(|p| p.parse().ok())
        .collect::<Option<Vec<_>>>()?;

    match parts.as_slice() {
        [m, s] if *s < 60 => Some(m * 60 + s),
        [h, m, s] if *m < 60 && *s < 60 => Some(h * 3600 + m * 60 + s),
        _ => None,
    }
}

/// Drop a trailing `→` or `->` left behind by a removed link.
fn strip_dangling_arrow(out: &mut String) {
    let trimmed = out.trim_end();
    let rest = trimmed
        .strip_suffix('→')
        .or_else(|| trimmed.strip_suffix("->"));
    if let Some(rest) = rest {
        let len = rest.trim_end().len();
        out.truncate(len);
    }
}
