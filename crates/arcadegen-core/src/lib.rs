//! arcadegen-core – prompt-to-game generation, code sanitizing and the game
//! record store.
//!
//! The crate is split into three independent pieces:
//!
//! - [`generation`]: builds the instruction prompt, calls the remote model
//!   once and extracts / validates the fenced code block it returns.
//! - [`executor`]: prepares extracted code for injection into a browser page
//!   (inline-script extraction, fullscreen neutralisation, scope wrapping).
//! - [`store`]: the append-only JSON file of [`GameRecord`]s.

pub mod error;
pub mod executor;
pub mod generation;
pub mod store;

pub use error::{GenerationError, StoreError};
pub use executor::{ExecutionContext, PreparedScript, prepare_script};
pub use generation::{
    GameGenerator, GeminiClient, GeminiConfig, PromptTemplate, TextGenerator, extract_code,
    validate_code,
};
pub use store::{GameRecord, GameStore, make_title};
