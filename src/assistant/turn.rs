//! Conversation turns exchanged with the model.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Error;

/// One step of a conversation, serialized as a JSON object tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum Turn {
    /// What the user typed.
    User { user: String },
    /// A plan the model states before acting. Never acted on.
    Plan { plan: String },
    /// A request to run one tool.
    Action {
        function: String,
        #[serde(
            default,
            deserialize_with = "scalar_input",
            skip_serializing_if = "Option::is_none"
        )]
        input: Option<String>,
    },
    /// The tool's result, fed back to the model.
    Observation { observation: Value },
    /// The final answer for the user.
    Output { output: String },
}

impl Turn {
    /// Decode a sanitized model reply.
    pub fn parse_reply(text: &str) -> Result<Turn, Error> {
        serde_json::from_str(text)
            .map_err(|e| Error::MalformedReply(format!("{e} in reply {text:?}")))
    }

    /// The `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Turn::User { .. } => "user",
            Turn::Plan { .. } => "plan",
            Turn::Action { .. } => "action",
            Turn::Observation { .. } => "observation",
            Turn::Output { .. } => "output",
        }
    }

    /// Compact JSON for embedding in a prompt.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Tool input as text. Models often send ids as bare numbers.
fn scalar_input<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Integer(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_turn_serializes_tag_first() {
        let turn = Turn::User {
            user: "add buy milk".into(),
        };
        assert_eq!(turn.to_json(), r#"{"type":"user","user":"add buy milk"}"#);
    }

    #[test]
    fn action_without_input_omits_field() {
        let turn = Turn::Action {
            function: "getAllTodos".into(),
            input: None,
        };
        assert_eq!(turn.to_json(), r#"{"type":"action","function":"getAllTodos"}"#);
    }

    #[test]
    fn parses_action_reply() {
        let turn =
            Turn::parse_reply(r#"{"type":"action","function":"createTodo","input":"buy milk"}"#)
                .unwrap();
        assert_eq!(
            turn,
            Turn::Action {
                function: "createTodo".into(),
                input: Some("buy milk".into())
            }
        );
    }

    #[test]
    fn parses_output_reply() {
        let turn = Turn::parse_reply(r#"{"type": "output", "output": "Added!"}"#).unwrap();
        assert_eq!(turn.kind(), "output");
    }

    #[test]
    fn observation_carries_any_json() {
        let turn = Turn::Observation {
            observation: serde_json::json!([{"id": 1, "text": "a"}]),
        };
        assert_eq!(
            turn.to_json(),
            r#"{"type":"observation","observation":[{"id":1,"text":"a"}]}"#
        );
    }

    #[test]
    fn missing_field_is_malformed() {
        let err = Turn::parse_reply(r#"{"type":"output"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedReply(_)));
    }

    #[test]
    fn unknown_type_is_malformed() {
        let err = Turn::parse_reply(r#"{"type":"shrug","output":"?"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedReply(_)));
    }

    #[test]
    fn unexpected_field_is_malformed() {
        let err =
            Turn::parse_reply(r#"{"type":"output","output":"hi","mood":"cheerful"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedReply(_)));
    }

    #[test]
    fn broken_json_is_malformed() {
        let err = Turn::parse_reply(r#"{"type":"output","output":"#).unwrap_err();
        assert_eq!(err.kind(), "MalformedReplyError");
    }

    #[test]
    fn action_accepts_numeric_input() {
        let turn =
            Turn::parse_reply(r#"{"type":"action","function":"deleteById","input":3}"#).unwrap();
        assert_eq!(
            turn,
            Turn::Action {
                function: "deleteById".into(),
                input: Some("3".into()),
            }
        );
    }

    #[test]
    fn action_input_may_be_null_or_absent() {
        let null =
            Turn::parse_reply(r#"{"type":"action","function":"getAllTodos","input":null}"#).unwrap();
        let absent = Turn::parse_reply(r#"{"type":"action","function":"getAllTodos"}"#).unwrap();
        assert_eq!(null, absent);
    }

    #[test]
    fn action_rejects_structured_input() {
        let err = Turn::parse_reply(r#"{"type":"action","function":"createTodo","input":{"a":1}}"#)
            .unwrap_err();
        assert_eq!(err.kind(), "MalformedReplyError");
    }
}
