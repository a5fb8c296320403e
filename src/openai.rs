//! OpenAI-compatible client configuration.

use crate::config::GenerationSettings;
use crate::error::GenerationError;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Read the API key from the environment variable named in settings.
pub fn api_key(settings: &GenerationSettings) -> Result<String, GenerationError> {
    std::env::var(&settings.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            GenerationError::Unavailable(format!("{} is not set", settings.api_key_env))
        })
}

/// Create a client for the configured endpoint with the configured deadline.
pub fn create_client(settings: &GenerationSettings) -> Result<Client<OpenAIConfig>, GenerationError> {
    create_client_with_key(settings, &api_key(settings)?)
}

/// Create a client with an explicit API key.
pub fn create_client_with_key(
    settings: &GenerationSettings,
    api_key: &str,
) -> Result<Client<OpenAIConfig>, GenerationError> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_seconds))
        .build()
        .map_err(|e| GenerationError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(&settings.api_base)
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}
