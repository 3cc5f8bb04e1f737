//! Google Gemini `generateContent` client.
//!
//! One HTTP call per generation: no retry, no backoff, and no timeout beyond
//! the transport default.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, NoProxy, Proxy, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::TextGenerator;
use crate::error::GenerationError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Connection settings for [`GeminiClient`].
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key; `None` or blank is rejected by [`GeminiClient::new`].
    pub api_key: Option<String>,
    /// Model name, e.g. `"gemini-1.5-flash"`.
    pub model: String,
    /// API root without trailing `/models`.
    pub base_url: String,
    /// Proxy for `http://` endpoints.
    pub http_proxy: Option<String>,
    /// Proxy for `https://` endpoints.
    pub https_proxy: Option<String>,
    /// Comma-separated hosts that bypass both proxies (`NO_PROXY` syntax).
    pub no_proxy: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            http_proxy: None,
            https_proxy: None,
            no_proxy: None,
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("http_proxy", &self.http_proxy)
            .field("https_proxy", &self.https_proxy)
            .field("no_proxy", &self.no_proxy)
            .finish()
    }
}

/// [`TextGenerator`] backed by the Gemini REST API.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Build a client. Fails with [`GenerationError::MissingCredential`] when
    /// no API key is configured.
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(GenerationError::MissingCredential)?;

        let mut builder = Client::builder().user_agent(concat!("arcadegen/", env!("CARGO_PKG_VERSION")));

        // Only the configured proxies apply; the process environment is not consulted.
        builder = builder.no_proxy();
        let bypass = config.no_proxy.as_deref().and_then(NoProxy::from_string);
        let proxies = [
            ("http", config.http_proxy.as_deref()),
            ("https", config.https_proxy.as_deref()),
        ];
        for (scheme, url) in proxies {
            let Some(url) = url else { continue };
            let proxy = if scheme == "https" {
                Proxy::https(url)
            } else {
                Proxy::http(url)
            };
            match proxy {
                Ok(p) => builder = builder.proxy(p.no_proxy(bypass.clone())),
                Err(e) => warn!(scheme, proxy = %url, error = %e, "ignoring invalid proxy URL"),
            }
        }

        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            client: builder.build()?,
            api_key,
            model: config.model,
            endpoint,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateContentRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_failure(status, &text));
        }

        let parsed: GenerateContentResponse = resp.json().await?;
        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            warn!(model = %self.model, block_reason = %reason, "prompt blocked by the model");
        }

        let text = parsed.into_text().ok_or(GenerationError::EmptyResponse)?;
        debug!(model = %self.model, response_len = text.len(), "gemini response received");
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Map a non-2xx reply onto the user-visible error kinds.
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> GenerationError {
    let detail = serde_json::from_str::<ApiErrorEnvelope>(body).ok().map(|e| e.error);
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| body.trim().to_owned());
    let api_status = detail.and_then(|d| d.status).unwrap_or_default();

    if status == StatusCode::TOO_MANY_REQUESTS
        || api_status == "RESOURCE_EXHAUSTED"
        || message.to_ascii_lowercase().contains("quota")
    {
        return GenerationError::QuotaExceeded(message);
    }

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || message.contains("API key")
    {
        return GenerationError::InvalidCredential(message);
    }

    GenerationError::Remote {
        status: status.as_u16(),
        message,
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
