//! Prompt templates for clipcast.
//!
//! Prompts can be customized by placing a `rag.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for grounded answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub user: String,
    /// Answer returned without calling the model when nothing was retrieved.
    pub not_found: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            user: r#"You are a helpful podcast assistant. You answer questions about podcast episodes
using ONLY the transcript excerpts provided below. You never invent information.

ANSWER FORMAT RULES:
1. Give a concise answer in 2-4 sentences.
2. After each factual claim, cite the source like this:
     [MM:SS] → <link>
   Copy the timestamp and link exactly as given in the excerpt.
3. If multiple excerpts support the answer, cite all of them.
4. Mention the speaker's name when attributing a statement.
5. If the answer is NOT found in any excerpt below, respond exactly:
   "{{not_found}}"
6. NEVER make up timestamps, links, or facts.
{{history}}
========================================
TRANSCRIPT EXCERPTS:
{{context}}
========================================

QUESTION: {{question}}

ANSWER:"#
                .to_string(),

            not_found: "I couldn't find that in the available transcripts. Try rephrasing or asking about a different topic."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
