//! Error types for Todo Assist.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Malformed model reply: {0}")]
    MalformedReply(String),
}

impl Error {
    /// Name of the error class as reported to API callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "ConfigError",
            Error::Validation(_) => "ValidationError",
            Error::Database(DatabaseError::Timeout { .. })
            | Error::Llm(LlmError::Timeout { .. }) => "TimeoutError",
            Error::Database(DatabaseError::Constraint(_)) => "ValidationError",
            Error::Database(_) | Error::Llm(_) => "ExternalServiceError",
            Error::Tool(ToolError::NotFound { .. }) => "UnknownToolError",
            Error::Tool(ToolError::InvalidInput { .. }) => "ValidationError",
            Error::Tool(ToolError::ExecutionFailed { source, .. }) => source.kind(),
            Error::MalformedReply(_) => "MalformedReplyError",
        }
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Database operation {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Provider {provider} timed out after {after:?}")]
    Timeout { provider: String, after: Duration },
}

/// Tool dispatch errors.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid function call: {name} (input: {input:?})")]
    NotFound {
        name: String,
        input: Option<String>,
    },

    #[error("Invalid input for tool {name}: {reason}")]
    InvalidInput { name: String, reason: String },

    #[error("Tool {name} execution failed: {source}")]
    ExecutionFailed {
        name: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(Error::Validation("x".into()).kind(), "ValidationError");
        assert_eq!(Error::MalformedReply("x".into()).kind(), "MalformedReplyError");
        assert_eq!(
            Error::from(ToolError::NotFound {
                name: "updateTodo".into(),
                input: None
            })
            .kind(),
            "UnknownToolError"
        );
        assert_eq!(
            Error::from(DatabaseError::Query("boom".into())).kind(),
            "ExternalServiceError"
        );
        assert_eq!(
            Error::from(LlmError::RequestFailed {
                provider: "anthropic".into(),
                reason: "quota".into()
            })
            .kind(),
            "ExternalServiceError"
        );
    }

    #[test]
    fn timeouts_are_classified_as_timeout() {
        let db = Error::from(DatabaseError::Timeout {
            operation: "list_todos",
            after: Duration::from_secs(5),
        });
        assert_eq!(db.kind(), "TimeoutError");

        let llm = Error::from(LlmError::Timeout {
            provider: "anthropic".into(),
            after: Duration::from_secs(30),
        });
        assert_eq!(llm.kind(), "TimeoutError");
    }

    #[test]
    fn tool_failure_reports_inner_kind() {
        let err = Error::from(ToolError::ExecutionFailed {
            name: "getAllTodos".into(),
            source: Box::new(Error::from(DatabaseError::Timeout {
                operation: "list_todos",
                after: Duration::from_secs(1),
            })),
        });
        assert_eq!(err.kind(), "TimeoutError");
    }

    #[test]
    fn unknown_tool_message_surfaces_input() {
        let err = ToolError::NotFound {
            name: "updateTodo".into(),
            input: Some("buy milk".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("updateTodo"));
        assert!(msg.contains("buy milk"));
    }
}
