//! Text completion backends.

use crate::config::GenerationSettings;
use crate::error::GenerationError;
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Turns a fully rendered prompt into answer text.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Complete a prompt. Called once per question.
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Model name, for display.
    fn model_name(&self) -> &str;
}

/// Chat completion against an OpenAI-compatible endpoint.
pub struct OpenAICompleter {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAICompleter {
    /// Create a completer from generation settings.
    ///
    /// Fails with `Unavailable` when the API key variable is unset.
    pub fn new(settings: &GenerationSettings) -> Result<Self, GenerationError> {
        Ok(Self::with_client(create_client(settings)?, settings))
    }

    /// Create a completer around an existing client.
    pub fn with_client(client: Client<OpenAIConfig>, settings: &GenerationSettings) -> Self {
        Self {
            client,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

#[async_trait]
impl Completer for OpenAICompleter {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| GenerationError::Request(format!("Failed to generate response: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        debug!("Completion returned {} chars", answer.len());

        Ok(answer)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
