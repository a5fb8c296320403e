//! List command implementation.

use super::load_library;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the list command.
pub fn run_list(settings: Settings) -> Result<()> {
    let library = load_library(settings)?;
    let episodes = library.episodes();

    Output::header(&format!("Episodes ({})", episodes.len()));
    println!();

    for (i, episode) in episodes.iter().enumerate() {
        Output::episode_info(i + 1, episode);
    }

    println!();
    Output::kv("Total episodes", &episodes.len().to_string());
    Output::kv("Total segments", &library.index().len().to_string());

    Ok(())
}
