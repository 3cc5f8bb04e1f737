//! Prompt → remote model → code.
//!
//! [`TextGenerator`] is the seam to the remote model (one call, raw text
//! back). [`GameGenerator`] wraps any generator with the fixed prompt
//! template and the extraction / validation rules.

mod extract;
mod gemini;
mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::GenerationError;

pub use extract::{MARKER_TOKENS, MIN_CODE_CHARS, extract_code, validate_code};
pub use gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiClient, GeminiConfig};
pub use prompt::{CANVAS_HEIGHT, CANVAS_WIDTH, PromptTemplate};

/// A remote text-generation model.
#[async_trait]
pub trait TextGenerator: Send + Sync + 'static {
    /// Send `prompt` once and return the model's raw reply text.
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Model identifier, used for logging.
    fn model_name(&self) -> &str;
}

/// Turns a user's game description into validated game code.
pub struct GameGenerator {
    backend: Arc<dyn TextGenerator>,
    template: PromptTemplate,
}

impl std::fmt::Debug for GameGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameGenerator")
            .field("model", &self.backend.model_name())
            .field("template", &self.template)
            .finish()
    }
}

impl GameGenerator {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self::with_template(backend, PromptTemplate::new())
    }

    pub fn with_template(backend: Arc<dyn TextGenerator>, template: PromptTemplate) -> Self {
        Self { backend, template }
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Render the template, call the model once, extract and validate.
    pub async fn generate(&self, user_prompt: &str) -> Result<String, GenerationError> {
        let prompt = self.template.render(user_prompt)?;
        info!(
            model = %self.backend.model_name(),
            prompt_len = user_prompt.len(),
            "requesting game code"
        );

        let reply = self.backend.generate_text(&prompt).await?;
        debug!(reply_len = reply.len(), "model reply received");

        let code = extract_code(&reply);
        if code.len() != reply.len() {
            debug!(code_len = code.len(), "extracted fenced code block");
        }
        let code = code.trim();

        if let Err(e) = validate_code(code) {
            warn!(error = %e, "rejecting generated code");
            return Err(e);
        }
        Ok(code.to_owned())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
