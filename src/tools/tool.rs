//! The `Tool` trait and input helpers.

use async_trait::async_trait;

use crate::error::{Error, ToolError};

/// An action the model may request by name.
///
/// Every tool takes at most one string input, as the model supplies it.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call this tool.
    fn name(&self) -> &'static str;

    /// One-line summary for logs and listings.
    fn description(&self) -> &str;

    /// Run the tool and return a JSON-serializable observation.
    async fn execute(&self, input: Option<&str>) -> Result<serde_json::Value, Error>;
}

/// Require a non-blank input, trimmed.
pub fn require_input<'a>(tool: &str, input: Option<&'a str>) -> Result<&'a str, ToolError> {
    match input.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(ToolError::InvalidInput {
            name: tool.to_string(),
            reason: "missing input".to_string(),
        }),
    }
}
