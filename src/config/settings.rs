//! Configuration settings for clipcast.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub generation: GenerationSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory containing episode markdown files.
    pub episodes_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            episodes_dir: "./episodes".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// What to do when a header section has no matching quotable clip.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissingClipPolicy {
    /// Abort loading the episode.
    #[default]
    Fail,
    /// Skip the section and log a warning.
    Skip,
}

impl std::str::FromStr for MissingClipPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(MissingClipPolicy::Fail),
            "skip" => Ok(MissingClipPolicy::Skip),
            _ => Err(format!("Unknown missing-clip policy: {}", s)),
        }
    }
}

/// Transcript chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Sliding window length in seconds.
    pub window_seconds: u32,
    /// Distance between consecutive window starts in seconds.
    pub step_seconds: u32,
    /// Policy for header sections without a quotable clip.
    pub on_missing_clip: MissingClipPolicy,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            window_seconds: 60,
            step_seconds: 30,
            on_missing_clip: MissingClipPolicy::Fail,
        }
    }
}

/// Retrieval and merge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of segments handed to the generator.
    pub top_k: usize,
    /// Time-overlap fraction above which two segments are duplicates.
    pub overlap_dedup_threshold: f64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 6,
            overlap_dedup_threshold: 0.5,
        }
    }
}

/// How ungrounded links and timestamps in an answer are handled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroundingPolicy {
    /// Remove ungrounded links and timestamp markers from the answer.
    #[default]
    Strip,
    /// Leave the answer untouched and report warnings.
    Flag,
}

impl std::str::FromStr for GroundingPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strip" => Ok(GroundingPolicy::Strip),
            "flag" => Ok(GroundingPolicy::Flag),
            _ => Err(format!("Unknown grounding policy: {}", s)),
        }
    }
}

/// Answer generation settings (OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Chat model name.
    pub model: String,
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens in the answer.
    pub max_tokens: u32,
    /// Request deadline in seconds.
    pub timeout_seconds: u64,
    /// Grounding policy for generated answers.
    pub grounding_policy: GroundingPolicy,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "llama-3.1-8b-instant".to_string(),
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            temperature: 0.2,
            max_tokens: 600,
            timeout_seconds: 60,
            grounding_policy: GroundingPolicy::Strip,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ClipcastError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Set a single value addressed as `section.key`.
    pub fn set(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        use crate::error::ClipcastError;

        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> crate::error::Result<T>
        where
            T::Err: std::fmt::Display,
        {
            value
                .parse()
                .map_err(|e: T::Err| ClipcastError::Config(format!("{}: {}", key, e)))
        }

        match key {
            "general.episodes_dir" => self.general.episodes_dir = value.to_string(),
            "general.log_level" => self.general.log_level = value.to_string(),
            "chunking.window_seconds" => self.chunking.window_seconds = parse(key, value)?,
            "chunking.step_seconds" => self.chunking.step_seconds = parse(key, value)?,
            "chunking.on_missing_clip" => self.chunking.on_missing_clip = parse(key, value)?,
            "retrieval.top_k" => self.retrieval.top_k = parse(key, value)?,
            "retrieval.overlap_dedup_threshold" => {
                self.retrieval.overlap_dedup_threshold = parse(key, value)?
            }
            "generation.model" => self.generation.model = value.to_string(),
            "generation.api_base" => self.generation.api_base = value.to_string(),
            "generation.api_key_env" => self.generation.api_key_env = value.to_string(),
            "generation.temperature" => self.generation.temperature = parse(key, value)?,
            "generation.max_tokens" => self.generation.max_tokens = parse(key, value)?,
            "generation.timeout_seconds" => self.generation.timeout_seconds = parse(key, value)?,
            "generation.grounding_policy" => {
                self.generation.grounding_policy = parse(key, value)?
            }
            "prompts.custom_dir" => self.prompts.custom_dir = Some(value.to_string()),
            _ => return Err(ClipcastError::Config(format!("Unknown config key: {}", key))),
        }
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clipcast")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded episodes directory path.
    pub fn episodes_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.episodes_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.chunking.window_seconds, 60);
        assert_eq!(settings.chunking.step_seconds, 30);
        assert_eq!(settings.retrieval.top_k, 6);
        assert_eq!(settings.retrieval.overlap_dedup_threshold, 0.5);
        assert_eq!(settings.generation.grounding_policy, GroundingPolicy::Strip);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [chunking]
            window_seconds = 90
            on_missing_clip = "skip"
            "#,
        )
        .unwrap();

        assert_eq!(settings.chunking.window_seconds, 90);
        assert_eq!(settings.chunking.step_seconds, 30);
        assert_eq!(settings.chunking.on_missing_clip, MissingClipPolicy::Skip);
        assert_eq!(settings.generation.api_key_env, "GROQ_API_KEY");
    }

    #[test]
    fn test_set_value() {
        let mut settings = Settings::default();
        settings.set("retrieval.top_k", "7").unwrap();
        settings.set("generation.grounding_policy", "flag").unwrap();
        assert_eq!(settings.retrieval.top_k, 7);
        assert_eq!(settings.generation.grounding_policy, GroundingPolicy::Flag);

        assert!(settings.set("retrieval.top_k", "many").is_err());
        assert!(settings.set("nope.key", "1").is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.general.episodes_dir = "/data/podcast".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.general.episodes_dir, "/data/podcast");
    }
}
