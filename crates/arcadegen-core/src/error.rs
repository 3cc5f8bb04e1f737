use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while turning a user prompt into game code.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No API key was configured for the remote model.
    #[error("remote API credential is not configured (set GEMINI_API_KEY)")]
    MissingCredential,

    /// The remote API rejected the configured key.
    #[error("remote API rejected the credential: {0}")]
    InvalidCredential(String),

    /// The remote API refused the call because the quota is used up.
    #[error("remote API quota exhausted: {0}")]
    QuotaExceeded(String),

    /// Any other non-2xx reply from the remote API.
    #[error("remote API returned HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    /// The request never produced a usable HTTP reply.
    #[error("HTTP request to the generation API failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The reply contained no candidate text.
    #[error("generation API returned no text")]
    EmptyResponse,

    /// Extracted code is below the minimum plausible size.
    #[error("generated code is too short ({len} chars, minimum {min})")]
    TooShort { len: usize, min: usize },

    /// Extracted code never touches the game canvas.
    #[error("generated code does not reference the game canvas")]
    MissingMarker,

    /// The prompt template failed to render.
    #[error("failed to render prompt template: {0}")]
    Template(#[from] minijinja::Error),
}

impl GenerationError {
    /// Message suitable for showing to the person who typed the prompt.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::MissingCredential | GenerationError::InvalidCredential(_) => {
                "The Gemini API key is missing or invalid. Check the server configuration.".to_owned()
            }
            GenerationError::QuotaExceeded(_) => {
                "The API usage limit has been reached. Please wait a while and try again.".to_owned()
            }
            GenerationError::TooShort { .. } => {
                "The generated code was too short. Please try again.".to_owned()
            }
            GenerationError::MissingMarker => {
                "No valid game code was generated. Try rephrasing the prompt.".to_owned()
            }
            other => format!("Game generation error: {other}"),
        }
    }
}

/// Errors produced by the game record file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record file exists but is not a JSON array of records.
    #[error("malformed record file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialise game records: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
