//! arcadegen-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables and command-line flags.
//! 2. Initialise structured tracing (JSON or pretty, stdout or rolling file).
//! 3. Build the Gemini generation backend; a missing API key is fatal.
//! 4. Open the game record file.
//! 5. Build the Axum router and start the HTTP server with graceful shutdown.

mod cli;
mod config;
mod error;
mod logging;
mod middleware;
mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use arcadegen_core::{ExecutionContext, GameGenerator, GameStore, GeminiClient};
use clap::Parser;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cli = Cli::parse();
    let mut cfg = Config::from_env();
    cfg.apply_cli(cli);

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    // Keep the guard alive for the whole process so file logs are flushed.
    let _log_guard = logging::init(&cfg);

    info!(version = env!("CARGO_PKG_VERSION"), "arcadegen-server starting");

    // ── 3. Generation backend ──────────────────────────────────────────────────
    let client = GeminiClient::new(cfg.gemini()).context("cannot start the generation backend")?;
    let generator = GameGenerator::new(Arc::new(client));
    info!(model = %generator.model_name(), "generation backend ready");

    // ── 4. Game records ────────────────────────────────────────────────────────
    let store = GameStore::open(cfg.data_file.clone())
        .await
        .context("cannot open the game record file")?;

    // ── 5. Shared application state ────────────────────────────────────────────
    let state = Arc::new(AppState {
        config: Arc::new(cfg.clone()),
        store: Arc::new(store),
        generator: Arc::new(generator),
        execution: ExecutionContext::default(),
    });

    // ── 6. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");
    info!("endpoints: GET /api/health, POST /api/generate, GET /api/games, GET|DELETE /api/games/{{id}}, GET /api/games/{{id}}/script");
    match &cfg.static_dir {
        Some(dir) => info!(dir = %dir.display(), "serving static front end"),
        None => info!("no static directory configured; only /api is served"),
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("arcadegen-server stopped");
    Ok(())
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
