//! Configuration module for clipcast.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    ChunkingSettings, GeneralSettings, GenerationSettings, GroundingPolicy, MissingClipPolicy,
    PromptSettings, RetrievalSettings, Settings,
};
