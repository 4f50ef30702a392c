//! Cleanup of raw model output before it reaches the preview.

use std::sync::LazyLock;

use regex::Regex;

static RE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```(jsx|tsx|js)?|```").unwrap());

static RE_JSX_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{/\*[\s\S]*?\*/\}").unwrap());

// `//` preceded by `:` is a URL scheme separator, not a comment.
static RE_LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|[^:])//.*$").unwrap());

/// Remove markdown code fences and surrounding whitespace.
pub fn strip_fences(text: &str) -> String {
    RE_FENCE.replace_all(text, "").trim().to_string()
}

/// Remove fences, `{/* ... */}` JSX comments and `//` line comments.
pub fn strip_fences_and_comments(text: &str) -> String {
    let text = RE_FENCE.replace_all(text, "");
    let text = RE_JSX_COMMENT.replace_all(&text, "");
    let text = RE_LINE_COMMENT.replace_all(&text, "$1");
    text.trim().to_string()
}
