//! Server configuration, loaded from environment variables at startup.

use std::fmt;
use std::path::PathBuf;

use arcadegen_core::generation::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use arcadegen_core::GeminiConfig;

use crate::cli::Cli;

/// Runtime configuration for arcadegen-server.
///
/// Everything except the Gemini API key has a default; the key is checked
/// when the generation backend is built.
#[derive(Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:$PORT"`, PORT default 3000).
    pub bind_address: String,

    /// JSON file holding the game records (default: `"data/games.json"`).
    pub data_file: PathBuf,

    /// Directory served for every non-API path; unset disables static files.
    pub static_dir: Option<PathBuf>,

    /// Credential for the Gemini API (`GEMINI_API_KEY`).
    pub gemini_api_key: Option<String>,

    /// Gemini model name.
    pub gemini_model: String,

    /// Gemini API root.
    pub gemini_base_url: String,

    /// Proxy for outbound `http://` calls (`HTTP_PROXY` / `http_proxy`).
    pub http_proxy: Option<String>,

    /// Proxy for outbound `https://` calls (`HTTPS_PROXY` / `https_proxy`).
    pub https_proxy: Option<String>,

    /// Hosts that bypass the proxies (`NO_PROXY` / `no_proxy`).
    pub no_proxy: Option<String>,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// When set, logs go to a daily-rolling file in this directory.
    pub log_dir: Option<PathBuf>,

    /// Comma-separated CORS origins; unset allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let port = env_or(&get, "PORT", "3000");
        Self {
            bind_address: env_or(&get, "ARCADEGEN_BIND", &format!("0.0.0.0:{port}")),
            data_file: PathBuf::from(env_or(&get, "ARCADEGEN_DATA_FILE", "data/games.json")),
            static_dir: non_empty(&get, "ARCADEGEN_STATIC_DIR").map(PathBuf::from),
            gemini_api_key: non_empty(&get, "GEMINI_API_KEY"),
            gemini_model: env_or(&get, "ARCADEGEN_GEMINI_MODEL", DEFAULT_MODEL),
            gemini_base_url: env_or(&get, "ARCADEGEN_GEMINI_BASE_URL", DEFAULT_BASE_URL),
            http_proxy: either_case(&get, "HTTP_PROXY"),
            https_proxy: either_case(&get, "HTTPS_PROXY"),
            no_proxy: either_case(&get, "NO_PROXY"),
            log_level: env_or(&get, "ARCADEGEN_LOG", "info"),
            log_json: flag(&get, "ARCADEGEN_LOG_JSON", false),
            log_dir: non_empty(&get, "ARCADEGEN_LOG_DIR").map(PathBuf::from),
            cors_allowed_origins: non_empty(&get, "ARCADEGEN_CORS_ORIGINS"),
            enable_swagger: flag(&get, "ARCADEGEN_ENABLE_SWAGGER", true),
        }
    }

    /// Command-line flags win over the environment.
    pub fn apply_cli(&mut self, cli: Cli) {
        if let Some(bind) = cli.bind {
            self.bind_address = bind;
        }
        if let Some(data_file) = cli.data_file {
            self.data_file = data_file;
        }
        if let Some(static_dir) = cli.static_dir {
            self.static_dir = Some(static_dir);
        }
        if cli.log_json {
            self.log_json = true;
        }
    }

    /// Connection settings for the generation backend.
    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.gemini_api_key.clone(),
            model: self.gemini_model.clone(),
            base_url: self.gemini_base_url.clone(),
            http_proxy: self.http_proxy.clone(),
            https_proxy: self.https_proxy.clone(),
            no_proxy: self.no_proxy.clone(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("data_file", &self.data_file)
            .field("static_dir", &self.static_dir)
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("http_proxy", &self.http_proxy)
            .field("https_proxy", &self.https_proxy)
            .field("no_proxy", &self.no_proxy)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .field("log_dir", &self.log_dir)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("enable_swagger", &self.enable_swagger)
            .finish()
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(get: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get(key).unwrap_or_else(|| default.to_owned())
}

fn non_empty(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    get(key).filter(|v| !v.trim().is_empty())
}

/// Upper-case variable first, then its lower-case spelling.
fn either_case(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    non_empty(get, key).or_else(|| non_empty(get, &key.to_ascii_lowercase()))
}

fn flag(get: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    get(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use clap::Parser;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = from_pairs(&[]);
        assert_eq!(cfg.bind_address, "0.0.0.0:3000");
        assert_eq!(cfg.data_file, PathBuf::from("data/games.json"));
        assert_eq!(cfg.gemini_model, DEFAULT_MODEL);
        assert!(cfg.gemini_api_key.is_none());
        assert!(cfg.static_dir.is_none());
        assert!(cfg.enable_swagger);
        assert!(!cfg.log_json);
    }

    #[test]
    fn port_feeds_default_bind_address() {
        assert_eq!(from_pairs(&[("PORT", "8080")]).bind_address, "0.0.0.0:8080");
        let explicit = from_pairs(&[("PORT", "8080"), ("ARCADEGEN_BIND", "127.0.0.1:9000")]);
        assert_eq!(explicit.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        assert!(from_pairs(&[("GEMINI_API_KEY", "  ")]).gemini_api_key.is_none());
        let cfg = from_pairs(&[("GEMINI_API_KEY", "k")]);
        assert_eq!(cfg.gemini().api_key.as_deref(), Some("k"));
    }

    #[test]
    fn proxies_are_read_per_scheme_in_either_case() {
        let cfg = from_pairs(&[
            ("HTTP_PROXY", "http://plain:3128"),
            ("https_proxy", "http://secure:3128"),
            ("no_proxy", "localhost,.internal"),
        ]);
        let gemini = cfg.gemini();
        assert_eq!(gemini.http_proxy.as_deref(), Some("http://plain:3128"));
        assert_eq!(gemini.https_proxy.as_deref(), Some("http://secure:3128"));
        assert_eq!(gemini.no_proxy.as_deref(), Some("localhost,.internal"));

        let upper_wins = from_pairs(&[("HTTPS_PROXY", "http://a:1"), ("https_proxy", "http://b:1")]);
        assert_eq!(upper_wins.https_proxy.as_deref(), Some("http://a:1"));
        assert!(upper_wins.http_proxy.is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = from_pairs(&[("GEMINI_API_KEY", "super-secret")]);
        assert!(!format!("{cfg:?}").contains("super-secret"));
    }

    #[test]
    fn flags_accept_one_and_true() {
        assert!(from_pairs(&[("ARCADEGEN_LOG_JSON", "1")]).log_json);
        assert!(from_pairs(&[("ARCADEGEN_LOG_JSON", "TRUE")]).log_json);
        assert!(!from_pairs(&[("ARCADEGEN_ENABLE_SWAGGER", "false")]).enable_swagger);
    }

    #[test]
    fn cli_overrides_environment() {
        let mut cfg = from_pairs(&[("ARCADEGEN_DATA_FILE", "env.json")]);
        let cli = Cli::try_parse_from([
            "arcadegen-server",
            "--bind",
            "127.0.0.1:4000",
            "--data-file",
            "cli.json",
            "--log-json",
        ])
        .unwrap();
        cfg.apply_cli(cli);
        assert_eq!(cfg.bind_address, "127.0.0.1:4000");
        assert_eq!(cfg.data_file, PathBuf::from("cli.json"));
        assert!(cfg.log_json);
        assert!(cfg.static_dir.is_none());
    }
}
