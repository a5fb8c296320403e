//! CLI module for clipcast.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::chunking::ChunkStrategy;
use clap::{Parser, Subcommand};

/// clipcast - Ask questions about podcast episodes
///
/// Answers come with timestamps and deep links into the episode, taken from
/// the transcripts in your episodes directory.
#[derive(Parser, Debug)]
#[command(name = "clipcast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory of episode markdown files (overrides config)
    #[arg(short, long, global = true, env = "CLIPCAST_EPISODES_DIR")]
    pub episodes: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check configuration, episodes and API access
    Doctor,

    /// Ask a single question
    Ask {
        /// The question to ask
        question: String,

        /// Restrict to one episode (list position or id)
        #[arg(short = 'E', long)]
        episode: Option<String>,

        /// Restrict to one season
        #[arg(long)]
        season: Option<String>,

        /// Show the retrieved segments
        #[arg(short, long)]
        debug: bool,
    },

    /// Start an interactive chat session
    Chat {
        /// Start restricted to one episode (list position or id)
        #[arg(short = 'E', long)]
        episode: Option<String>,
    },

    /// Search for relevant segments without generating an answer
    Search {
        /// Search query
        query: String,

        /// Restrict to one episode (list position or id)
        #[arg(short = 'E', long)]
        episode: Option<String>,

        /// Restrict to one season
        #[arg(long)]
        season: Option<String>,

        /// Only segments of one strategy (header, window)
        #[arg(short, long)]
        strategy: Option<ChunkStrategy>,

        /// Maximum number of results (defaults to retrieval.top_k)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List loaded episodes
    List,

    /// Print the segments of an episode as JSON
    Segments {
        /// Episode (list position or id)
        episode: String,

        /// Only segments of one strategy (header, window)
        #[arg(short, long)]
        strategy: Option<ChunkStrategy>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "retrieval.top_k")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from([
            "clipcast",
            "search",
            "feature stores",
            "--strategy",
            "window",
            "-l",
            "3",
            "--season",
            "8",
        ])
        .unwrap();

        match cli.command {
            Commands::Search {
                query,
                strategy,
                limit,
                episode,
                season,
            } => {
                assert_eq!(query, "feature stores");
                assert_eq!(strategy, Some(ChunkStrategy::Window));
                assert_eq!(limit, Some(3));
                assert_eq!(episode, None);
                assert_eq!(season.as_deref(), Some("8"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "clipcast",
            "ask",
            "What is churn?",
            "-vv",
            "--episodes",
            "/tmp/eps",
            "-E",
            "2",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.episodes.as_deref(), Some("/tmp/eps"));
        assert!(matches!(
            cli.command,
            Commands::Ask { episode: Some(ref e), debug: false, .. } if e == "2"
        ));
    }
}
