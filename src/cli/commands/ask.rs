//! Ask command implementation.

use super::{load_library, search_filter};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    episode: Option<&str>,
    season: Option<&str>,
    debug: bool,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'clipcast doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let library = load_library(settings)?;
    let filter = search_filter(&library, episode, season)?;
    let generator = library.answer_generator()?;

    let spinner = Output::spinner("Searching transcripts...");
    let result = library.ask(&generator, question, &filter, None).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            Output::answer(&response);

            if debug && !response.sources.is_empty() {
                Output::header("Retrieved segments");
                for source in &response.sources {
                    Output::segment_result(source);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
