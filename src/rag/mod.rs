//! Retrieval-augmented answers over podcast transcripts.
//!
//! [`Retriever`] merges results of both chunking strategies, and
//! [`AnswerGenerator`] turns them into an answer whose links and timestamps
//! are checked against what was retrieved.

mod completion;
pub mod context;
pub mod grounding;
mod response;
mod retriever;

pub use completion::{Completer, OpenAICompleter};
pub use grounding::{ground_answer, GroundedAnswer, GroundingWarning};
pub use response::{AnswerGenerator, RagResponse};
pub use retriever::{overlap_fraction, Retriever, DEFAULT_OVERLAP_THRESHOLD, DEFAULT_TOP_K};

use serde::{Deserialize, Serialize};

/// One question and the answer given to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}
