//! Preparing generated code for injection into the play page.
//!
//! Generated code may be a full HTML document or a bare script body. The
//! page only needs the script, so documents are reduced to their first
//! inline `<script>` body. A fixed denylist of fullscreen calls, which throw
//! inside an embedded frame, is then rewritten away, and the result is
//! wrapped in a function that receives the canvas and its 2D context as
//! explicit parameters.
//!
//! None of this is a security boundary: the prepared script runs with the
//! full privileges of the page that appends it.

use std::sync::LazyLock;

use regex::Regex;

/// Canvas element id the prompt template asks the model to use.
pub const DEFAULT_CANVAS_ID: &str = "gameCanvas";

static DOCTYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!DOCTYPE\s+html").expect("doctype pattern is valid"));

static INLINE_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<script[^>]*>([\s\S]*?)</script>").expect("script pattern is valid")
});

/// Denylist: pattern and the text it is replaced with.
static NEUTRALIZERS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (
            r"\.requestFullscreen\s*\([^)]*\)",
            "/* requestFullscreen removed */",
        ),
        (
            r"\.(?:webkitRequestFullscreen|webkitRequestFullScreen|mozRequestFullScreen|msRequestFullscreen)\s*\([^)]*\)",
            "/* requestFullscreen removed */",
        ),
        (
            r"\.toggleFullscreen\s*\([^)]*\)",
            "/* toggleFullscreen removed */",
        ),
        (r"document\.fullscreenElement", "false"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("neutralizer pattern is valid"),
            replacement,
        )
    })
    .collect()
});

/// Where in the page the prepared script binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Id of the `<canvas>` element handed to the game.
    pub canvas_id: String,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            canvas_id: DEFAULT_CANVAS_ID.to_owned(),
        }
    }
}

/// Output of [`prepare_script`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedScript {
    /// Script text ready to become the body of a `<script>` element.
    pub source: String,
    /// Whether the input was a full HTML document.
    pub from_document: bool,
    /// Number of denylisted calls that were rewritten.
    pub neutralized: usize,
}

/// True when `code` looks like a full HTML document rather than a script.
pub fn looks_like_document(code: &str) -> bool {
    DOCTYPE.is_match(code) || code.contains("<html")
}

/// Body of the first `<script>` element in `document` that has one.
pub fn extract_inline_script(document: &str) -> Option<&str> {
    INLINE_SCRIPT
        .captures_iter(document)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .find(|body| !body.trim().is_empty())
}

/// Rewrite every denylisted call. Returns the new text and the number of
/// rewrites.
pub fn neutralize(code: &str) -> (String, usize) {
    let mut out = code.to_owned();
    let mut count = 0;
    for (pattern, replacement) in NEUTRALIZERS.iter() {
        let hits = pattern.find_iter(&out).count();
        if hits > 0 {
            count += hits;
            out = pattern.replace_all(&out, *replacement).into_owned();
        }
    }
    (out, count)
}

/// Wrap `code` in a function scope receiving `canvas` and `ctx`.
///
/// The game code sits inside a `try` block, so its own top-level
/// `const canvas = ...` shadows the parameter instead of clashing with it.
pub fn wrap(code: &str, ctx: &ExecutionContext) -> String {
    // A JSON string literal is also a valid JavaScript string literal.
    let id = serde_json::Value::String(ctx.canvas_id.clone()).to_string();
    format!(
        r#"(function (canvas, ctx) {{
  if (!canvas || !ctx) {{
    console.error("canvas element " + {id} + " not found");
    return;
  }}
  try {{
{code}
  }} catch (error) {{
    console.error("game script failed:", error);
  }}
}})(
  document.getElementById({id}),
  (function (c) {{ return c ? c.getContext("2d") : null; }})(document.getElementById({id}))
);
"#
    )
}

/// Full pipeline: document reduction, neutralisation, scope wrapping.
pub fn prepare_script(code: &str, ctx: &ExecutionContext) -> PreparedScript {
    let from_document = looks_like_document(code);
    let body = if from_document {
        extract_inline_script(code).unwrap_or(code)
    } else {
        code
    };
    let (body, neutralized) = neutralize(body);
    PreparedScript {
        source: wrap(&body, ctx),
        from_document,
        neutralized,
    }
}
