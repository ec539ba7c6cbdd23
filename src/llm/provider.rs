//! Completion provider trait.

use async_trait::async_trait;

use crate::error::LlmError;

/// A hosted model that turns a text prompt into raw text.
///
/// The reply is expected, not guaranteed, to be a single JSON object; callers
/// sanitize and validate it themselves.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Name of the model this provider talks to.
    fn model_name(&self) -> &str;

    /// Name of the service hosting the model, e.g. `anthropic`.
    fn provider_name(&self) -> &str;

    /// Send one prompt and return the model's raw text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
