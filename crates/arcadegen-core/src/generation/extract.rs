//! Fenced-block extraction and minimal validation of generated code.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::GenerationError;

/// Shortest code (in characters, after trimming) accepted as a game.
pub const MIN_CODE_CHARS: usize = 100;

/// Tokens of which at least one must appear in accepted code.
pub const MARKER_TOKENS: [&str; 2] = ["canvas", "gameCanvas"];

/// Info strings accepted on a code fence (compared case-insensitively).
const CODE_TAGS: [&str; 4] = ["", "javascript", "js", "html"];

/// A fence line: optional indent, three backticks, then the info string.
static FENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*```([^`\n]*)$").expect("fence pattern is valid"));

/// Inner content of the first ```` ``` ````, ```` ```javascript ````,
/// ```` ```js ```` or ```` ```html ```` block in `text`, or `text` itself when
/// there is no such block.
///
/// Fences pair up in order, so blocks in other languages are skipped whole.
pub fn extract_code(text: &str) -> &str {
    first_code_block(text).unwrap_or(text)
}

fn first_code_block(text: &str) -> Option<&str> {
    let mut fences = FENCE_LINE.captures_iter(text);
    loop {
        let open = fences.next()?;
        let close = fences.next()?;
        let tag = open.get(1).map_or("", |m| m.as_str()).trim();
        if !CODE_TAGS.iter().any(|t| tag.eq_ignore_ascii_case(t)) {
            continue;
        }
        let start = open.get(0)?.end() + 1;
        let end = close.get(0)?.start();
        let body = text.get(start..end).unwrap_or("");
        let body = body.strip_suffix('\n').unwrap_or(body);
        return Some(body.strip_suffix('\r').unwrap_or(body));
    }
}

/// Reject code that is obviously not a game. Never attempts a repair.
pub fn validate_code(code: &str) -> Result<(), GenerationError> {
    let code = code.trim();
    let len = code.chars().count();
    if len < MIN_CODE_CHARS {
        return Err(GenerationError::TooShort {
            len,
            min: MIN_CODE_CHARS,
        });
    }
    if !MARKER_TOKENS.iter().any(|t| code.contains(t)) {
        return Err(GenerationError::MissingMarker);
    }
    Ok(())
}
