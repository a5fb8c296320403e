//! Pre-flight checks before expensive operations.
//!
//! Validates that configuration is usable before loading the whole library
//! or calling the completion endpoint.

use crate::config::Settings;
use crate::error::{ClipcastError, Result};
use std::path::Path;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Asking questions requires episodes and an API key.
    Ask,
    /// Search and listing only require episodes.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    check_episodes_dir(&settings.episodes_dir())?;
    match operation {
        Operation::Ask => check_api_key(&settings.generation.api_key_env)?,
        Operation::Search => {}
    }
    Ok(())
}

/// Check that the API key variable is set and non-empty.
pub fn check_api_key(var: &str) -> Result<()> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        Ok(_) => Err(ClipcastError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            var, var
        ))),
        Err(_) => Err(ClipcastError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            var, var
        ))),
    }
}

/// Check that the episodes directory exists.
pub fn check_episodes_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(ClipcastError::Config(format!(
            "Episodes directory {} does not exist. Pass --episodes or set general.episodes_dir",
            dir.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_needs_only_episodes() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.episodes_dir = dir.path().display().to_string();
        settings.generation.api_key_env = "CLIPCAST_TEST_KEY_THAT_IS_NEVER_SET".to_string();

        assert!(check(Operation::Search, &settings).is_ok());
        assert!(matches!(
            check(Operation::Ask, &settings),
            Err(ClipcastError::Config(_))
        ));
    }

    #[test]
    fn test_missing_episodes_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_episodes_dir(&dir.path().join("nope")).is_err());
    }
}
