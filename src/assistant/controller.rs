//! Conversation controller.
//!
//! One user message costs at most two model calls and one tool call:
//!
//! 1. system prompt + user turn → model → `output` (done) or `action`
//! 2. run the action's tool, wrap the result as an `observation`
//! 3. system prompt + observation → model → must be `output`
//!
//! Any other reply shape is a `MalformedReply` error, so the loop can never
//! run away against the model API.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::assistant::sanitize::clean_response;
use crate::assistant::turn::Turn;
use crate::error::Error;
use crate::llm::LlmProvider;
use crate::tools::ToolRegistry;

/// Final result of one user message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    /// The model's natural-language answer.
    pub message: String,
    /// Tool the model ran, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Raw tool result, if a tool ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Drives the model through a bounded action/observation exchange.
pub struct Assistant {
    llm: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    system_prompt: String,
}

impl Assistant {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            tools,
            system_prompt: system_prompt.into(),
        }
    }

    /// Answer a single message with no memory of earlier ones.
    pub async fn handle(&self, message: &str) -> Result<ChatReply, Error> {
        self.exchange(&mut Transcript::stateless(), message).await
    }

    async fn exchange(
        &self,
        transcript: &mut Transcript<'_>,
        message: &str,
    ) -> Result<ChatReply, Error> {
        let user = Turn::User {
            user: message.to_string(),
        };
        let first = self.ask(transcript.prior(), "User Input", &user).await?;
        transcript.record(user);

        match first {
            Turn::Output { output } => {
                info!(reply_len = output.len(), "Assistant answered directly");
                transcript.record(Turn::Output {
                    output: output.clone(),
                });
                Ok(ChatReply {
                    message: output,
                    action: None,
                    result: None,
                })
            }
            Turn::Action { function, input } => {
                let observation = self.tools.dispatch(&function, input.as_deref()).await?;
                transcript.record(Turn::Action {
                    function: function.clone(),
                    input,
                });

                let observed = Turn::Observation {
                    observation: observation.clone(),
                };
                let second = self.ask(transcript.prior(), "Observation", &observed).await?;
                transcript.record(observed);

                match second {
                    Turn::Output { output } => {
                        info!(action = %function, "Assistant answered after action");
                        transcript.record(Turn::Output {
                            output: output.clone(),
                        });
                        Ok(ChatReply {
                            message: output,
                            action: Some(function),
                            result: Some(observation),
                        })
                    }
                    other => Err(Error::MalformedReply(format!(
                        "expected an output turn after the observation, got {}",
                        other.kind()
                    ))),
                }
            }
            other => Err(Error::MalformedReply(format!(
                "expected an action or output turn, got {}",
                other.kind()
            ))),
        }
    }

    /// One model round trip: compose, complete, sanitize, decode.
    async fn ask(&self, prior: &[Turn], label: &str, current: &Turn) -> Result<Turn, Error> {
        let prompt = self.compose_prompt(prior, label, current);
        let raw = self.llm.complete(&prompt).await?;
        let cleaned = clean_response(&raw);
        debug!(reply = %cleaned, "Model reply");
        Turn::parse_reply(&cleaned)
    }

    fn compose_prompt(&self, prior: &[Turn], label: &str, current: &Turn) -> String {
        let mut prompt = String::with_capacity(self.system_prompt.len() + 256);
        prompt.push_str(&self.system_prompt);
        prompt.push('\n');
        if !prior.is_empty() {
            prompt.push_str("Conversation so far:\n");
            for turn in prior {
                prompt.push_str(&turn.to_json());
                prompt.push('\n');
            }
        }
        prompt.push_str(label);
        prompt.push_str(": ");
        prompt.push_str(&current.to_json());
        prompt.push_str("\nResponse:");
        prompt
    }
}

/// Where an exchange records its turns, if anywhere.
struct Transcript<'a> {
    turns: Option<&'a mut Vec<Turn>>,
}

impl<'a> Transcript<'a> {
    fn stateless() -> Self {
        Self { turns: None }
    }

    fn session(turns: &'a mut Vec<Turn>) -> Self {
        Self { turns: Some(turns) }
    }

    fn prior(&self) -> &[Turn] {
        self.turns.as_deref().map(Vec::as_slice).unwrap_or(&[])
    }

    fn record(&mut self, turn: Turn) {
        if let Some(turns) = self.turns.as_mut() {
            turns.push(turn);
        }
    }
}

/// A conversation that remembers every turn for its whole lifetime.
pub struct Session {
    assistant: Arc<Assistant>,
    context: Vec<Turn>,
}

impl Session {
    pub fn new(assistant: Arc<Assistant>) -> Self {
        Self {
            assistant,
            context: Vec::new(),
        }
    }

    /// Answer `message`, with every earlier turn of this session included in
    /// the prompt.
    pub async fn send(&mut self, message: &str) -> Result<ChatReply, Error> {
        let mut transcript = Transcript::session(&mut self.context);
        self.assistant.exchange(&mut transcript, message).await
    }

    /// Turns recorded so far.
    pub fn context(&self) -> &[Turn] {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{LlmError, ToolError};
    use crate::store::{LibSqlBackend, TodoStore};

    /// Replays canned replies in order and records every prompt it saw.
    struct ScriptedLlm {
        replies: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        fn model_name(&self) -> &str {
            "scripted"
        }

        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LlmError::RequestFailed {
                    provider: "scripted".into(),
                    reason: "script exhausted".into(),
                })
        }
    }

    async fn setup(replies: &[&str]) -> (Assistant, Arc<ScriptedLlm>, Arc<dyn TodoStore>) {
        let store: Arc<dyn TodoStore> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let llm = ScriptedLlm::new(replies);
        let tools = Arc::new(ToolRegistry::with_todo_tools(Arc::clone(&store)));
        let assistant = Assistant::new(llm.clone(), tools, "SYSTEM");
        (assistant, llm, store)
    }

    #[tokio::test]
    async fn create_flow_returns_action_and_id() {
        let (assistant, llm, store) = setup(&[
            r#"{"type":"action","function":"createTodo","input":"buy milk"}"#,
            "```json\n{\"type\":\"output\",\"output\":\"Added!\"}\n```",
        ])
        .await;

        let reply = assistant.handle("add buy milk").await.unwrap();

        let todos = store.list_todos().await.unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].text, "buy milk");
        assert_eq!(
            reply,
            ChatReply {
                message: "Added!".into(),
                action: Some("createTodo".into()),
                result: Some(Value::from(todos[0].id)),
            }
        );

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].starts_with("SYSTEM\n"));
        assert!(prompts[0].contains(r#"User Input: {"type":"user","user":"add buy milk"}"#));
        assert!(prompts[0].ends_with("Response:"));
        assert!(prompts[1].contains(&format!(
            r#"Observation: {{"type":"observation","observation":{}}}"#,
            todos[0].id
        )));
        // Stateless: the second prompt does not replay the user turn.
        assert!(!prompts[1].contains("add buy milk"));
    }

    #[tokio::test]
    async fn direct_output_uses_one_call() {
        let (assistant, llm, _store) =
            setup(&[r#"{"type":"output","output":"What should I add?"}"#]).await;

        let reply = assistant.handle("hello").await.unwrap();
        assert_eq!(reply.message, "What should I add?");
        assert!(reply.action.is_none());
        assert!(reply.result.is_none());
        assert_eq!(llm.prompts().len(), 1);
    }

    #[tokio::test]
    async fn non_json_reply_becomes_apology() {
        let (assistant, _llm, _store) = setup(&["Sure thing! I'll get right on it."]).await;

        let reply = assistant.handle("hello").await.unwrap();
        assert!(reply.message.starts_with("I apologize"));
    }

    #[tokio::test]
    async fn unknown_tool_is_surfaced() {
        let (assistant, llm, _store) =
            setup(&[r#"{"type":"action","function":"updateTodo","input":"x"}"#]).await;

        let err = assistant.handle("rename my todo").await.unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::NotFound { .. })));
        assert_eq!(err.kind(), "UnknownToolError");
        assert_eq!(llm.prompts().len(), 1);
    }

    #[tokio::test]
    async fn second_action_is_malformed() {
        let (assistant, llm, store) = setup(&[
            r#"{"type":"action","function":"createTodo","input":"a"}"#,
            r#"{"type":"action","function":"createTodo","input":"b"}"#,
            r#"{"type":"output","output":"never read"}"#,
        ])
        .await;

        let err = assistant.handle("add a").await.unwrap_err();
        assert_eq!(err.kind(), "MalformedReplyError");
        assert_eq!(llm.prompts().len(), 2);
        assert_eq!(store.list_todos().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn plan_reply_is_malformed() {
        let (assistant, _llm, _store) =
            setup(&[r#"{"type":"plan","plan":"I will list todos"}"#]).await;

        let err = assistant.handle("what's on my list").await.unwrap_err();
        assert!(matches!(err, Error::MalformedReply(_)));
    }

    #[tokio::test]
    async fn broken_json_is_malformed() {
        let (assistant, _llm, _store) = setup(&[r#"{"type":"output","output":"#]).await;

        let err = assistant.handle("hi").await.unwrap_err();
        assert!(matches!(err, Error::MalformedReply(_)));
    }

    #[tokio::test]
    async fn model_failure_is_external_service_error() {
        let (assistant, _llm, _store) = setup(&[]).await;

        let err = assistant.handle("hi").await.unwrap_err();
        assert_eq!(err.kind(), "ExternalServiceError");
    }

    #[tokio::test]
    async fn delete_observation_is_null() {
        let (assistant, _llm, store) = setup(&[
            r#"{"type":"action","function":"deleteById","input":"1"}"#,
            r#"{"type":"output","output":"Deleted."}"#,
        ])
        .await;
        store.create_todo("old").await.unwrap();

        let reply = assistant.handle("delete todo 1").await.unwrap();
        assert_eq!(reply.action.as_deref(), Some("deleteById"));
        assert_eq!(reply.result, Some(Value::Null));
        assert!(store.list_todos().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn numeric_delete_input_is_dispatched() {
        let (assistant, llm, store) = setup(&[
            r#"{"type":"action","function":"deleteById","input":1}"#,
            r#"{"type":"output","output":"Deleted."}"#,
        ])
        .await;
        let id = store.create_todo("old").await.unwrap();
        assert_eq!(id, 1);

        let reply = assistant.handle("delete todo 1").await.unwrap();
        assert_eq!(reply.message, "Deleted.");
        assert_eq!(reply.action.as_deref(), Some("deleteById"));
        assert!(store.list_todos().await.unwrap().is_empty());
        assert_eq!(llm.prompts().len(), 2);
    }

    #[tokio::test]
    async fn session_replays_earlier_turns() {
        let (assistant, llm, _store) = setup(&[
            r#"{"type":"action","function":"createTodo","input":"buy milk"}"#,
            r#"{"type":"output","output":"Added!"}"#,
            r#"{"type":"output","output":"You added buy milk."}"#,
        ])
        .await;

        let mut session = Session::new(Arc::new(assistant));
        session.send("add buy milk").await.unwrap();
        let reply = session.send("what did I just add?").await.unwrap();
        assert_eq!(reply.message, "You added buy milk.");

        let kinds: Vec<&str> = session.context().iter().map(Turn::kind).collect();
        assert_eq!(
            kinds,
            vec!["user", "action", "observation", "output", "user", "output"]
        );

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 3);
        // Within a session the observation prompt sees the user turn and action.
        assert!(prompts[1].contains("Conversation so far:"));
        assert!(prompts[1].contains(r#""function":"createTodo""#));
        assert!(prompts[2].contains(r#"{"type":"output","output":"Added!"}"#));
    }
}
