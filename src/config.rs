//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};
use crate::store::DatabaseLocation;

/// Default system instructions sent ahead of every turn.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an AI Todo Assistant. For any task-related request, you MUST create an action to add it to the database.
DO NOT just respond with output - you must use the createTodo action.

Respond ONLY with JSON in these formats:

For new todos:
{"type": "action", "function": "createTodo", "input": "the todo text"}

For viewing todos:
{"type": "action", "function": "getAllTodos"}

For searching:
{"type": "action", "function": "searchTodo", "input": "search term"}

For deleting:
{"type": "action", "function": "deleteById", "input": "id"}

After actions, you'll get an observation with the result.
Then respond with:
{"type": "output", "output": "your message"}

For greetings/unclear requests, respond with:
{"type": "output", "output": "your helpful message asking what todo they want to add"}

Example interaction:
User: "Add a task to buy groceries"
Assistant: {"type": "action", "function": "createTodo", "input": "buy groceries"}
System: {"type": "observation", "observation": 1}
Assistant: {"type": "output", "output": "I've added 'buy groceries' to your todo list!"}

IMPORTANT: Always use createTodo for any task the user mentions. Return only JSON, no extra text."#;

const DEFAULT_DATABASE_URL: &str = "./data/todo-assist.db";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 5;

/// Process configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the todo table lives.
    pub database: DatabaseLocation,
    /// Completion backend, key and model.
    pub llm: LlmConfig,
    /// HTTP listen port.
    pub port: u16,
    /// Upper bound on a single model call.
    pub llm_timeout: Duration,
    /// Upper bound on a single store call.
    pub db_timeout: Duration,
    /// System instructions prepended to every prompt.
    pub system_prompt: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("TODO_ASSIST_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let database =
            DatabaseLocation::parse(&database_url, lookup("TODO_ASSIST_DATABASE_TOKEN"));

        let backend: LlmBackend = match lookup("TODO_ASSIST_LLM_BACKEND") {
            Some(raw) => raw.parse().map_err(|message| ConfigError::InvalidValue {
                key: "TODO_ASSIST_LLM_BACKEND".to_string(),
                message,
            })?,
            None => LlmBackend::Anthropic,
        };

        let key_var = backend.api_key_var();
        let api_key = lookup(key_var)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(key_var.to_string()))?;

        let model = lookup("TODO_ASSIST_MODEL").unwrap_or_else(|| backend.default_model().to_string());

        let port = parse_or(&lookup, "TODO_ASSIST_PORT", DEFAULT_PORT)?;
        let llm_timeout =
            timeout_secs(&lookup, "TODO_ASSIST_LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?;
        let db_timeout =
            timeout_secs(&lookup, "TODO_ASSIST_DB_TIMEOUT_SECS", DEFAULT_DB_TIMEOUT_SECS)?;

        let system_prompt = lookup("TODO_ASSIST_SYSTEM_PROMPT")
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        Ok(Self {
            database,
            llm: LlmConfig {
                backend,
                api_key: SecretString::from(api_key),
                model,
            },
            port,
            llm_timeout,
            db_timeout,
            system_prompt,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?}: {e}"),
        }),
        None => Ok(default),
    }
}

/// A timeout in whole seconds. Zero would fail every call, so it is rejected.
fn timeout_secs<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, key, default)? {
        0 => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be at least 1 second".to_string(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}
