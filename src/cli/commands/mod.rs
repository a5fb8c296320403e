//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod doctor;
mod list;
mod search;
mod segments;
mod serve;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use list::run_list;
pub use search::run_search;
pub use segments::run_segments;
pub use serve::run_serve;

use crate::cli::Output;
use crate::config::Settings;
use crate::index::SearchFilter;
use crate::library::Library;

/// Load the library with a spinner, reporting failures.
fn load_library(settings: Settings) -> anyhow::Result<Library> {
    let spinner = Output::spinner("Loading episodes...");
    let result = Library::load(settings);
    spinner.finish_and_clear();

    match result {
        Ok(library) => Ok(library),
        Err(e) => {
            Output::error(&format!("Failed to load episodes: {}", e));
            Err(e.into())
        }
    }
}

/// Filter for an optional episode selector and season.
fn search_filter(
    library: &Library,
    selector: Option<&str>,
    season: Option<&str>,
) -> anyhow::Result<SearchFilter> {
    let filter = match selector {
        Some(selector) => {
            let episode = library.find_episode(selector)?;
            SearchFilter::episode(episode.id())
        }
        None => SearchFilter::all(),
    };
    Ok(match season {
        Some(season) => filter.with_season(season),
        None => filter,
    })
}
