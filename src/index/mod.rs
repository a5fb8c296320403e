//! Lexical segment index.
//!
//! Segments are scored with TF-IDF cosine similarity computed separately for
//! several fields and combined with per-field boosts. The transcript text
//! dominates; section headers, titles and speakers act as tie-breakers.

mod text;

pub use text::{normalize_query, similarity, tokenize, Vocabulary};

use crate::chunking::{ChunkStrategy, Segment};
use crate::episode::Episode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A segment field scored by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Text,
    Section,
    EpisodeTitle,
    ShortTitle,
    Speakers,
}

impl Field {
    const ALL: [Field; 5] = [
        Field::Text,
        Field::Section,
        Field::EpisodeTitle,
        Field::ShortTitle,
        Field::Speakers,
    ];

    fn boost(self) -> f64 {
        match self {
            Field::Text => 5.0,
            Field::Section => 3.0,
            Field::EpisodeTitle | Field::ShortTitle | Field::Speakers => 1.0,
        }
    }

    fn extract(self, segment: &Segment) -> String {
        match self {
            Field::Text => segment.text.clone(),
            Field::Section => segment.source_header.clone().unwrap_or_default(),
            Field::EpisodeTitle => segment.episode_title.clone(),
            Field::ShortTitle => segment.short_title.clone().unwrap_or_default(),
            Field::Speakers => segment.speakers.join(" "),
        }
    }
}

/// L2-normalized sparse TF-IDF vector.
type SparseVector = HashMap<String, f64>;

/// TF-IDF model of one field across every indexed segment.
#[derive(Debug, Clone, Default)]
struct FieldIndex {
    idf: HashMap<String, f64>,
    vectors: Vec<SparseVector>,
}

impl FieldIndex {
    fn fit(texts: &[String]) -> Self {
        let tokenized: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t)).collect();

        let mut df: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *df.entry(term).or_default() += 1;
            }
        }

        // Smoothed idf: ln((1 + n) / (1 + df)) + 1
        let n = tokenized.len() as f64;
        let idf: HashMap<String, f64> = df
            .into_iter()
            .map(|(term, count)| {
                let weight = ((1.0 + n) / (1.0 + count as f64)).ln() + 1.0;
                (term.to_string(), weight)
            })
            .collect();

        let vectors = tokenized.iter().map(|tokens| weigh(tokens, &idf)).collect();

        Self { idf, vectors }
    }

    fn query_vector(&self, tokens: &[String]) -> SparseVector {
        weigh(tokens, &self.idf)
    }

    fn score(&self, query: &SparseVector, doc: usize) -> f64 {
        let vector = &self.vectors[doc];
        query
            .iter()
            .filter_map(|(term, q)| vector.get(term).map(|d| q * d))
            .sum()
    }
}

/// Term-frequency times idf, normalized. Terms unknown to `idf` are dropped.
fn weigh(tokens: &[String], idf: &HashMap<String, f64>) -> SparseVector {
    let mut vector: SparseVector = HashMap::new();
    for token in tokens {
        if let Some(weight) = idf.get(token) {
            *vector.entry(token.clone()).or_default() += weight;
        }
    }

    let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for weight in vector.values_mut() {
            *weight /= norm;
        }
    }
    vector
}

/// Restricts a query to one episode, season and/or strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Only segments from this episode.
    #[serde(default)]
    pub episode_id: Option<String>,
    /// Only segments from episodes of this season.
    #[serde(default)]
    pub season: Option<String>,
    /// Only segments produced by this strategy.
    #[serde(default)]
    pub strategy: Option<ChunkStrategy>,
}

impl SearchFilter {
    /// No restriction.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one episode.
    pub fn episode(id: impl Into<String>) -> Self {
        Self {
            episode_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Restrict to one season, keeping other conditions.
    pub fn with_season(mut self, season: impl Into<String>) -> Self {
        self.season = Some(season.into().trim().to_string());
        self
    }

    /// Restrict to one strategy, keeping other conditions.
    pub fn with_strategy(mut self, strategy: ChunkStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Whether a segment passes this filter.
    pub fn matches(&self, segment: &Segment) -> bool {
        self.episode_id
            .as_deref()
            .map_or(true, |id| segment.episode_id == id)
            && self
                .season
                .as_deref()
                .map_or(true, |season| segment.season.as_deref().map(str::trim) == Some(season))
            && self.strategy.map_or(true, |s| segment.strategy == s)
    }
}

/// A segment with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSegment {
    pub segment: Segment,
    /// Relevance score (higher is better).
    pub score: f64,
}

/// Ranked segments handed to answer generation, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RetrievalResult {
    items: Vec<ScoredSegment>,
}

impl RetrievalResult {
    pub fn new(items: Vec<ScoredSegment>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredSegment> {
        self.items.iter()
    }

    /// The segments without scores.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.items.iter().map(|s| &s.segment)
    }

    /// Deep links of every retrieved segment.
    pub fn deep_links(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|s| s.segment.deep_link.as_str())
    }

    pub fn into_vec(self) -> Vec<ScoredSegment> {
        self.items
    }
}

impl From<Vec<ScoredSegment>> for RetrievalResult {
    fn from(items: Vec<ScoredSegment>) -> Self {
        Self::new(items)
    }
}

impl<'a> IntoIterator for &'a RetrievalResult {
    type Item = &'a ScoredSegment;
    type IntoIter = std::slice::Iter<'a, ScoredSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Searchable collection of every segment of every loaded episode.
///
/// Built once from the loaded episodes and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SegmentIndex {
    segments: Vec<Segment>,
    fields: Vec<(Field, FieldIndex)>,
    vocabulary: Vocabulary,
}

impl SegmentIndex {
    /// Index every segment of the given episodes.
    pub fn build(episodes: &[Episode]) -> Self {
        let segments: Vec<Segment> = episodes
            .iter()
            .flat_map(|e| e.all_segments().cloned())
            .collect();
        Self::from_segments(segments)
    }

    /// Index a flat list of segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let fields = Field::ALL
            .iter()
            .map(|&field| {
                let texts: Vec<String> = segments.iter().map(|s| field.extract(s)).collect();
                (field, FieldIndex::fit(&texts))
            })
            .collect();

        let vocabulary = Vocabulary::from_texts(segments.iter().map(|s| s.text.as_str()));

        debug!(
            "Indexed {} segments ({} distinct words)",
            segments.len(),
            vocabulary.len()
        );

        Self {
            segments,
            fields,
            vocabulary,
        }
    }

    /// Rank segments matching `filter` against a query.
    ///
    /// Segments with no term in common with the query are not returned.
    /// Ties go to the earlier segment, then to index order.
    pub fn query(&self, text: &str, filter: &SearchFilter, limit: usize) -> RetrievalResult {
        if limit == 0 || self.segments.is_empty() {
            return RetrievalResult::default();
        }

        let tokens = tokenize(text);
        if tokens.is_empty() {
            return RetrievalResult::default();
        }

        let queries: Vec<(f64, &FieldIndex, SparseVector)> = self
            .fields
            .iter()
            .map(|(field, index)| (field.boost(), index, index.query_vector(&tokens)))
            .collect();

        let mut results: Vec<ScoredSegment> = self
            .segments
            .iter()
            .enumerate()
            .filter(|(_, segment)| filter.matches(segment))
            .filter_map(|(i, segment)| {
                let score: f64 = queries
                    .iter()
                    .map(|(boost, index, query)| boost * index.score(query, i))
                    .sum();
                (score > 0.0).then(|| ScoredSegment {
                    segment: segment.clone(),
                    score,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.segment.start_seconds.total_cmp(&b.segment.start_seconds))
        });
        results.truncate(limit);

        RetrievalResult::new(results)
    }

    /// Words seen in indexed transcript text.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
