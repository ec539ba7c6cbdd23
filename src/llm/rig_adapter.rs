//! Bridge from rig's agent API to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::agent::Agent;
use rig::completion::{CompletionModel, Prompt};
use tracing::debug;

use crate::error::LlmError;
use crate::llm::provider::LlmProvider;

/// Wraps a rig `Agent` built without a preamble: the prompt text carries the
/// system instructions itself.
pub struct RigAdapter<M: CompletionModel> {
    agent: Agent<M>,
    model_name: String,
    provider: &'static str,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(agent: Agent<M>, model_name: &str, provider: &'static str) -> Self {
        Self {
            agent,
            model_name: model_name.to_string(),
            provider,
        }
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + 'static,
{
    fn provider_name(&self) -> &str {
        self.provider
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        debug!(
            provider = self.provider,
            model = %self.model_name,
            prompt_len = prompt.len(),
            "Sending completion request"
        );
        let text = self
            .agent
            .prompt(prompt.to_string())
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: self.provider.to_string(),
                reason: e.to_string(),
            })?;
        debug!(provider = self.provider, reply_len = text.len(), "Completion received");
        Ok(text)
    }
}
