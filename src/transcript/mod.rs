//! Episode transcript documents.
//!
//! Reads episode markdown files into an in-memory transcript: ordered lines,
//! headered sections and the author's quotable clips.

mod document;
mod loader;
mod models;

pub use document::{parse_document, split_frontmatter};
pub use loader::{discover_episode_files, load_transcript, load_transcripts};
pub use models::{
    distinct_speakers, format_timestamp, EpisodeTranscript, QuotableClip, TranscriptLine,
    TranscriptSection,
};
