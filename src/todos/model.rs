//! Todo data model.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Store-assigned ID, immutable once set.
    pub id: i64,
    /// What needs doing. Duplicates are allowed.
    pub text: String,
    /// When the row was inserted.
    pub created_at: DateTime<Utc>,
    /// When the row was last changed.
    pub updated_at: DateTime<Utc>,
}

/// Reject missing or blank todo text.
pub fn validate_text(text: Option<&str>) -> Result<&str, Error> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        Some(_) => Err(Error::Validation("todo text must not be empty".to_string())),
        None => Err(Error::Validation("todo text is required".to_string())),
    }
}

/// Turn a search term into a `LIKE` pattern.
///
/// Patterns that already carry `%` or `_` are used verbatim. A bare term is
/// wrapped so it matches anywhere in the text.
pub fn like_pattern(term: &str) -> Cow<'_, str> {
    if term.contains(['%', '_']) {
        Cow::Borrowed(term)
    } else {
        Cow::Owned(format!("%{term}%"))
    }
}

/// Compile a search term into a matcher with `ILIKE` semantics.
///
/// `%` matches any run of characters and `_` exactly one; everything else is
/// literal. Case folding is Unicode-aware, unlike SQLite's `LIKE`.
pub fn like_matcher(term: &str) -> Result<Regex, regex::Error> {
    let pattern = like_pattern(term);
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push_str("(?is)^");
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '%' | '_' => {
                source.push_str(&regex::escape(&literal));
                literal.clear();
                source.push_str(if c == '%' { ".*" } else { "." });
            }
            c => literal.push(c),
        }
    }
    source.push_str(&regex::escape(&literal));
    source.push('$');
    Regex::new(&source)
}
