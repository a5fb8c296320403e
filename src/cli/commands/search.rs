//! Search command implementation.

use super::{load_library, search_filter};
use crate::chunking::ChunkStrategy;
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::Retriever;
use anyhow::Result;

/// Run the search command.
pub fn run_search(
    query: &str,
    episode: Option<&str>,
    season: Option<&str>,
    strategy: Option<ChunkStrategy>,
    limit: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let library = load_library(settings)?;

    let mut filter = search_filter(&library, episode, season)?;
    if let Some(strategy) = strategy {
        filter = filter.with_strategy(strategy);
    }

    let results = match limit {
        Some(limit) => {
            let retriever = Retriever::new(
                limit,
                library.settings().retrieval.overlap_dedup_threshold,
            );
            retriever.retrieve(library.index(), &library.normalize_query(query), &filter)
        }
        None => library.search(query, &filter),
    };

    if results.is_empty() {
        Output::warning("No results found matching your query.");
    } else {
        Output::success(&format!("Found {} results", results.len()));
        for result in &results {
            Output::segment_result(result);
        }
    }

    Ok(())
}
