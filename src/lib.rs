//! clipcast - Grounded Q&A over podcast transcripts
//!
//! Answers questions about podcast episodes from their transcripts, citing
//! timestamps and deep links that point back into the episode.
//!
//! # Overview
//!
//! clipcast allows you to:
//! - Load episode markdown files with YAML transcript frontmatter
//! - Search episodes by chapter (header segments) and by time window
//! - Ask questions and get answers whose links are checked against the sources
//! - Chat interactively, optionally restricted to one episode
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `transcript` - Episode document parsing
//! - `chunking` - Header and sliding-window segmentation
//! - `episode` - A transcript with its segments
//! - `index` - TF-IDF segment index and query normalization
//! - `rag` - Retrieval merging, answer generation and link grounding
//! - `library` - All loaded episodes and the index over them
//! - `session` - Interactive session state and commands
//!
//! # Example
//!
//! ```rust,no_run
//! use clipcast::config::Settings;
//! use clipcast::index::SearchFilter;
//! use clipcast::library::Library;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let library = Library::load(Settings::load()?)?;
//!     let generator = library.answer_generator()?;
//!
//!     let question = "How do they approach personalization?";
//!     let response = library
//!         .ask(&generator, question, &SearchFilter::all(), None)
//!         .await?;
//!     println!("{}", response.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod episode;
pub mod error;
pub mod index;
pub mod library;
pub mod openai;
pub mod rag;
pub mod session;
#[cfg(test)]
mod testing;
pub mod transcript;

pub use error::{ClipcastError, Result};
