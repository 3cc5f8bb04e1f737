use std::path::PathBuf;

use clap::Parser;

/// Command-line flags. Each one overrides the matching environment variable.
#[derive(Debug, Default, Parser)]
#[command(name = "arcadegen-server", version, about = "Prompt-to-browser-game HTTP server")]
pub struct Cli {
    /// TCP address to bind (ARCADEGEN_BIND).
    #[arg(long)]
    pub bind: Option<String>,

    /// JSON file holding the game records (ARCADEGEN_DATA_FILE).
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Directory with the browser front end (ARCADEGEN_STATIC_DIR).
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Emit logs as newline-delimited JSON (ARCADEGEN_LOG_JSON).
    #[arg(long)]
    pub log_json: bool,
}
