use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest title, in characters, before it is cut and suffixed with `...`.
pub const TITLE_MAX_CHARS: usize = 50;

/// One generated game, as persisted in the record file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Creation time in Unix milliseconds, as a decimal string.
    pub id: String,
    pub title: String,
    pub prompt: String,
    /// Extracted source text, unmodified.
    pub code: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub play_count: u64,
}

impl GameRecord {
    pub fn new(id: String, prompt: &str, code: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: make_title(prompt),
            prompt: prompt.to_owned(),
            code,
            created_at,
            play_count: 0,
        }
    }
}

/// First [`TITLE_MAX_CHARS`] characters of `prompt`, with `...` appended
/// when anything was cut.
pub fn make_title(prompt: &str) -> String {
    let mut chars = prompt.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Next record id for a record created at `now`.
///
/// Ids are the creation timestamp in milliseconds; when that would not be
/// strictly greater than every existing id (two creates in the same
/// millisecond, or a clock step backwards) the largest id plus one is used.
/// Ids that cannot be bumped without overflowing are ignored.
pub(crate) fn next_id(existing: &[GameRecord], now: DateTime<Utc>) -> String {
    let candidate = now.timestamp_millis();
    let next_free = existing
        .iter()
        .filter_map(|r| r.id.parse::<i64>().ok())
        .filter_map(|id| id.checked_add(1))
        .max();
    match next_free {
        Some(next) if next > candidate => next.to_string(),
        _ => candidate.to_string(),
    }
}
