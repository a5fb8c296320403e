//! Retrieval across both chunking strategies.
//!
//! The index is queried once per strategy. Results that cover the same stretch
//! of the same episode are collapsed to the best-scoring one, and each strategy
//! gets a share of the final slots so neither crowds the other out.

use crate::chunking::{ChunkStrategy, Segment};
use crate::config::RetrievalSettings;
use crate::index::{RetrievalResult, ScoredSegment, SearchFilter, SegmentIndex};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Default number of segments handed to the generator.
pub const DEFAULT_TOP_K: usize = 6;

/// Default overlap fraction above which two segments are duplicates.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.5;

/// Queries both strategies and merges their results.
#[derive(Debug, Clone)]
pub struct Retriever {
    top_k: usize,
    overlap_threshold: f64,
}

impl Default for Retriever {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K, DEFAULT_OVERLAP_THRESHOLD)
    }
}

impl Retriever {
    pub fn new(top_k: usize, overlap_threshold: f64) -> Self {
        Self {
            top_k,
            overlap_threshold,
        }
    }

    pub fn from_settings(settings: &RetrievalSettings) -> Self {
        Self::new(settings.top_k, settings.overlap_dedup_threshold)
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve the best segments for a query.
    ///
    /// A strategy set on `filter` limits retrieval to that strategy.
    #[instrument(skip(self, index, filter), fields(top_k = self.top_k))]
    pub fn retrieve(
        &self,
        index: &SegmentIndex,
        query: &str,
        filter: &SearchFilter,
    ) -> RetrievalResult {
        let strategies: Vec<ChunkStrategy> = match filter.strategy {
            Some(strategy) => vec![strategy],
            None => ChunkStrategy::ALL.to_vec(),
        };

        let mut candidates = Vec::new();
        for strategy in strategies {
            let per_strategy = filter.clone().with_strategy(strategy);
            let found = index.query(query, &per_strategy, self.top_k);
            debug!("{} {} candidates", found.len(), strategy);
            candidates.extend(found.into_vec());
        }

        self.merge(candidates)
    }

    /// Dedup and select from candidates of any strategy.
    pub fn merge(&self, mut candidates: Vec<ScoredSegment>) -> RetrievalResult {
        // Stable: equal scores keep their incoming order.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut kept: Vec<ScoredSegment> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let duplicate = kept.iter().any(|k| {
                overlap_fraction(&k.segment, &candidate.segment) > self.overlap_threshold
            });
            if duplicate {
                debug!(
                    "Dropping duplicate {} segment at {}",
                    candidate.segment.strategy,
                    candidate.segment.format_timestamp()
                );
            } else {
                kept.push(candidate);
            }
        }

        let reserved = self.top_k.div_ceil(2);
        let mut per_strategy: HashMap<ChunkStrategy, usize> = HashMap::new();
        let mut selected = Vec::with_capacity(self.top_k);
        let mut leftovers = Vec::new();

        for item in kept {
            let count = per_strategy.entry(item.segment.strategy).or_default();
            if *count < reserved {
                *count += 1;
                selected.push(item);
            } else {
                leftovers.push(item);
            }
        }

        for item in leftovers {
            if selected.len() >= self.top_k {
                break;
            }
            selected.push(item);
        }

        selected.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.segment.start_seconds.total_cmp(&b.segment.start_seconds))
        });
        selected.truncate(self.top_k);

        RetrievalResult::new(selected)
    }
}

/// Intersection over union of two segments' time ranges.
///
/// Segments from different episodes never overlap. A zero-length segment
/// overlaps fully when its instant falls inside the other segment. A short
/// window inside a long section scores low, so both strategies survive.
pub fn overlap_fraction(a: &Segment, b: &Segment) -> f64 {
    if a.episode_id != b.episode_id {
        return 0.0;
    }

    let (short, long) = if a.duration() <= b.duration() { (a, b) } else { (b, a) };

    if short.duration() <= 0.0 {
        let point = short.start_seconds;
        let inside = point == long.start_seconds
            || (point > long.start_seconds && point < long.end_seconds);
        return if inside { 1.0 } else { 0.0 };
    }

    let intersection = (a.end_seconds.min(b.end_seconds) - a.start_seconds.max(b.start_seconds)).max(0.0);
    let union = a.duration() + b.duration() - intersection;
    intersection / union
}
