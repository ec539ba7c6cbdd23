//! Deadline decorator for any `LlmProvider`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::LlmError;
use crate::llm::provider::LlmProvider;

/// Fails a completion with `LlmError::Timeout` once `timeout` elapses.
pub struct TimeoutProvider {
    inner: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl TimeoutProvider {
    pub fn new(inner: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl LlmProvider for TimeoutProvider {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        match tokio::time::timeout(self.timeout, self.inner.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    provider = %self.inner.provider_name(),
                    model = %self.inner.model_name(),
                    timeout = ?self.timeout,
                    "Completion timed out"
                );
                Err(LlmError::Timeout {
                    provider: self.inner.provider_name().to_string(),
                    after: self.timeout,
                })
            }
        }
    }
}
