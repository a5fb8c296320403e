//! Segments command implementation.

use super::load_library;
use crate::chunking::{ChunkStrategy, Segment};
use crate::cli::Output;
use crate::config::Settings;
use crate::episode::Episode;
use anyhow::Result;
use serde::Serialize;

/// Segments of one episode, as exported.
#[derive(Debug, Serialize)]
pub struct ExportedEpisode<'a> {
    pub episode_id: &'a str,
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<&'a str>,
    pub segment_count: usize,
    pub segments: Vec<&'a Segment>,
}

impl<'a> ExportedEpisode<'a> {
    pub fn new(episode: &'a Episode, strategy: Option<ChunkStrategy>) -> Self {
        let transcript = episode.transcript();
        let segments: Vec<&Segment> = match strategy {
            Some(strategy) => episode.segments(strategy).iter().collect(),
            None => episode.all_segments().collect(),
        };

        Self {
            episode_id: episode.id(),
            title: episode.title(),
            season: transcript.season.as_deref(),
            episode: transcript.episode_number.as_deref(),
            media_url: transcript.media_url.as_deref(),
            segment_count: segments.len(),
            segments,
        }
    }
}

/// Run the segments command.
pub fn run_segments(
    selector: &str,
    strategy: Option<ChunkStrategy>,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    let library = load_library(settings)?;
    let episode = match library.find_episode(selector) {
        Ok(episode) => episode,
        Err(e) => {
            Output::error(&e.to_string());
            Output::info("Use 'clipcast list' to see loaded episodes.");
            return Err(e.into());
        }
    };

    let export = ExportedEpisode::new(episode, strategy);
    let output_str = serde_json::to_string_pretty(&export)?;

    match output {
        Some(path) if path != "-" => {
            std::fs::write(&path, &output_str)?;
            Output::success(&format!(
                "Exported {} segments of '{}' to {}",
                export.segment_count,
                episode.title(),
                path
            ));
        }
        _ => {
            println!("{}", output_str);
        }
    }

    Ok(())
}
