//! Grounded answer generation.

use super::completion::Completer;
use super::context::{format_context_for_display, format_context_for_prompt};
use super::grounding::{ground_answer, GroundingWarning};
use super::Exchange;
use crate::config::{GroundingPolicy, Prompts};
use crate::error::GenerationError;
use crate::index::RetrievalResult;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Answers questions from retrieved segments.
pub struct AnswerGenerator {
    completer: Arc<dyn Completer>,
    prompts: Prompts,
    policy: GroundingPolicy,
}

impl AnswerGenerator {
    pub fn new(completer: Arc<dyn Completer>) -> Self {
        Self {
            completer,
            prompts: Prompts::default(),
            policy: GroundingPolicy::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_policy(mut self, policy: GroundingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn model_name(&self) -> &str {
        self.completer.model_name()
    }

    /// Render the prompt for a question and its retrieved segments.
    pub fn build_prompt(
        &self,
        question: &str,
        retrieved: &RetrievalResult,
        previous: Option<&Exchange>,
    ) -> String {
        let history = previous
            .map(|e| {
                format!(
                    "\nPREVIOUS EXCHANGE (for follow-up questions only):\nQ: {}\nA: {}\n",
                    e.question, e.answer
                )
            })
            .unwrap_or_default();

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), format_context_for_prompt(retrieved));
        vars.insert("history".to_string(), history);
        vars.insert("not_found".to_string(), self.prompts.rag.not_found.clone());

        self.prompts.render_with_custom(&self.prompts.rag.user, &vars)
    }

    /// Answer a question from retrieved segments.
    ///
    /// Nothing retrieved means the canned not-found answer, without a
    /// completion call.
    #[instrument(skip(self, retrieved, previous), fields(sources = retrieved.len()))]
    pub async fn generate(
        &self,
        question: &str,
        retrieved: RetrievalResult,
        previous: Option<&Exchange>,
    ) -> Result<RagResponse, GenerationError> {
        if retrieved.is_empty() {
            info!("No segments retrieved, answering not-found");
            return Ok(RagResponse {
                answer: self.prompts.rag.not_found.clone(),
                sources: retrieved,
                warnings: Vec::new(),
            });
        }

        let prompt = self.build_prompt(question, &retrieved, previous);
        debug!("Prompt is {} chars", prompt.len());

        let raw = self.completer.complete(&prompt).await?;
        let grounded = ground_answer(&raw, &retrieved, self.policy);

        for warning in &grounded.warnings {
            warn!("{}", warning);
        }

        Ok(RagResponse {
            answer: grounded.text,
            sources: retrieved,
            warnings: grounded.warnings,
        })
    }
}

/// An answer with the segments it was generated from.
#[derive(Debug, Clone, Serialize)]
pub struct RagResponse {
    /// The grounded answer.
    pub answer: String,
    /// Segments used as context.
    pub sources: RetrievalResult,
    /// Ungrounded links or timestamps found in the raw answer.
    pub warnings: Vec<GroundingWarning>,
}

impl RagResponse {
    /// Format the response for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            output.push_str(&format_context_for_display(&self.sources));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::ChunkStrategy;
    use crate::testing::{scored, segment};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubCompleter {
        reply: Result<String, GenerationError>,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl StubCompleter {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            })
        }

        fn failing(err: GenerationError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl Completer for StubCompleter {
        async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(GenerationError::Unavailable(m)) => Err(GenerationError::Unavailable(m.clone())),
                Err(GenerationError::Request(m)) => Err(GenerationError::Request(m.clone())),
                Err(GenerationError::EmptyResponse) => Err(GenerationError::EmptyResponse),
            }
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    fn retrieved() -> RetrievalResult {
        let mut header = segment("ep1", ChunkStrategy::Header, 2139.0, 2397.0);
        header.text = "Stefan: We build a recommender with an agenda.".to_string();
        RetrievalResult::new(vec![scored(header, 2.0)])
    }

    #[tokio::test]
    async fn test_empty_retrieval_skips_completion() {
        let stub = StubCompleter::replying("should not be used");
        let generator = AnswerGenerator::new(stub.clone());

        let response = generator
            .generate("anything?", RetrievalResult::default(), None)
            .await
            .unwrap();

        assert_eq!(response.answer, Prompts::default().rag.not_found);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fabricated_link_caught() {
        let stub = StubCompleter::replying(
            "Stefan builds an agenda-driven recommender [35:39] → https://youtu.be/invented?t=5",
        );
        let generator = AnswerGenerator::new(stub.clone());

        let response = generator
            .generate("What recommender?", retrieved(), None)
            .await
            .unwrap();

        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        assert!(!response.answer.contains("invented"));
        assert!(response
            .answer
            .contains("https://www.youtube.com/watch?v=ep1&t=2139"));
        assert_eq!(
            response.warnings,
            vec![GroundingWarning::UngroundedLink {
                url: "https://youtu.be/invented?t=5".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_flag_policy_keeps_text() {
        let reply = "See https://youtu.be/invented for more.";
        let stub = StubCompleter::replying(reply);
        let generator = AnswerGenerator::new(stub).with_policy(GroundingPolicy::Flag);

        let response = generator.generate("q", retrieved(), None).await.unwrap();
        assert_eq!(response.answer, reply);
        assert_eq!(response.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_prompt_contents() {
        let stub = StubCompleter::replying("ok");
        let generator = AnswerGenerator::new(stub.clone());
        let previous = Exchange {
            question: "Who is the guest?".to_string(),
            answer: "Stefan.".to_string(),
        };

        generator
            .generate("What does he build?", retrieved(), Some(&previous))
            .await
            .unwrap();

        let prompt = stub.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("QUESTION: What does he build?"));
        assert!(prompt.contains("[Context 1]"));
        assert!(prompt.contains("Link     : https://www.youtube.com/watch?v=ep1&t=2139"));
        assert!(prompt.contains("Q: Who is the guest?"));
        assert!(prompt.contains(&Prompts::default().rag.not_found));
        assert!(!prompt.contains("{{"));
    }

    #[tokio::test]
    async fn test_generation_error_propagates() {
        let stub = StubCompleter::failing(GenerationError::Unavailable("no key".to_string()));
        let generator = AnswerGenerator::new(stub);

        let err = generator.generate("q", retrieved(), None).await.unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable(_)));
    }

    #[test]
    fn test_format_for_display() {
        let response = RagResponse {
            answer: "An answer.".to_string(),
            sources: retrieved(),
            warnings: Vec::new(),
        };
        let display = response.format_for_display();
        assert!(display.starts_with("An answer.\n\n--- Sources ---\n"));
        assert!(display.contains("[35:39] [header] Section at 2139"));
    }
}
