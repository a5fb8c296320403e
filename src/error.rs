//! Error types for clipcast.

use std::path::PathBuf;
use thiserror::Error;

/// Library-level error type for clipcast operations.
#[derive(Error, Debug)]
pub enum ClipcastError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Chunking(#[from] ChunkingError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Failed to load episode {path}: {source}")]
    EpisodeLoad {
        path: PathBuf,
        #[source]
        source: Box<ClipcastError>,
    },

    #[error("Episode not found: {0}")]
    EpisodeNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors reading an episode document.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Could not find YAML frontmatter in {path}")]
    MissingFrontmatter { path: String },

    #[error("Invalid YAML frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors turning a transcript into segments.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChunkingError {
    #[error("Episode '{episode}': section '{header}' has no matching quotable clip")]
    MissingClip { episode: String, header: String },

    #[error("Episode '{episode}' has no media URL (set `video_url` or `ids.youtube`)")]
    MissingMediaUrl { episode: String },

    #[error("Invalid window configuration: window={window}s, step={step}s (both must be > 0)")]
    InvalidWindow { window: u32, step: u32 },
}

/// Failures of the text-completion collaborator.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Completion service unavailable: {0}")]
    Unavailable(String),

    #[error("Completion request failed: {0}")]
    Request(String),

    #[error("Empty response from completion service")]
    EmptyResponse,
}

/// Result type alias for clipcast operations.
pub type Result<T> = std::result::Result<T, ClipcastError>;
