//! Cleanup of raw model text before it is decoded as a turn.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

/// Reply substituted when the model's text is not a JSON object.
pub const FALLBACK_REPLY: &str = r#"{"type":"output","output":"I apologize, but I couldn't process that request. Could you please try again?"}"#;

/// Opening fence, with or without a language tag.
static OPEN_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*\r?\n?").unwrap());

/// Closing fence.
static CLOSE_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*```$").unwrap());

/// Strip Markdown code fences and surrounding whitespace.
///
/// The result either starts with `{` or is [`FALLBACK_REPLY`]. It is not
/// guaranteed to be valid JSON.
pub fn clean_response(raw: &str) -> String {
    let trimmed = raw.trim();
    let opened = OPEN_FENCE.replace(trimmed, "");
    let closed = CLOSE_FENCE.replace(&opened, "");
    let cleaned = closed.trim();

    if !cleaned.starts_with('{') {
        warn!(reply = %truncate(raw, 200), "Model reply is not a JSON object, using fallback");
        return FALLBACK_REPLY.to_string();
    }

    cleaned.to_string()
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
