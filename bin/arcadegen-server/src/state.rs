//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use arcadegen_core::{ExecutionContext, GameGenerator, GameStore};

use crate::config::Config;

/// State shared across all HTTP handlers.
#[derive(Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Game record file.
    pub store: Arc<GameStore>,
    /// Prompt → code pipeline in front of the remote model.
    pub generator: Arc<GameGenerator>,
    /// Page bindings used when preparing scripts for the browser.
    pub execution: ExecutionContext,
}
