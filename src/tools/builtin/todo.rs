//! Todo tools — the four actions the model can take against the store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::error::{Error, ToolError};
use crate::store::TodoStore;
use crate::todos::validate_text;
use crate::tools::tool::{Tool, require_input};

/// Lists every todo.
pub struct GetAllTodosTool {
    store: Arc<dyn TodoStore>,
}

impl GetAllTodosTool {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetAllTodosTool {
    fn name(&self) -> &'static str {
        "getAllTodos"
    }

    fn description(&self) -> &str {
        "List every todo. Takes no input."
    }

    async fn execute(&self, _input: Option<&str>) -> Result<Value, Error> {
        let todos = self.store.list_todos().await?;
        Ok(serde_json::to_value(todos).unwrap_or(Value::Array(Vec::new())))
    }
}

/// Adds a todo and observes its new ID.
pub struct CreateTodoTool {
    store: Arc<dyn TodoStore>,
}

impl CreateTodoTool {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CreateTodoTool {
    fn name(&self) -> &'static str {
        "createTodo"
    }

    fn description(&self) -> &str {
        "Add a todo. Input is the todo text."
    }

    async fn execute(&self, input: Option<&str>) -> Result<Value, Error> {
        let text = validate_text(input)?;
        let id = self.store.create_todo(text).await?;
        info!(id, "Todo created by assistant");
        Ok(Value::from(id))
    }
}

/// Removes a todo by ID. Observes `null`.
pub struct DeleteByIdTool {
    store: Arc<dyn TodoStore>,
}

impl DeleteByIdTool {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for DeleteByIdTool {
    fn name(&self) -> &'static str {
        "deleteById"
    }

    fn description(&self) -> &str {
        "Delete a todo. Input is the numeric todo id."
    }

    async fn execute(&self, input: Option<&str>) -> Result<Value, Error> {
        let raw = require_input(self.name(), input)?;
        let id: i64 = raw.parse().map_err(|_| ToolError::InvalidInput {
            name: self.name().to_string(),
            reason: format!("{raw:?} is not a todo id"),
        })?;
        self.store.delete_todo(id).await?;
        info!(id, "Todo deleted by assistant");
        Ok(Value::Null)
    }
}

/// Case-insensitive search over todo text.
pub struct SearchTodoTool {
    store: Arc<dyn TodoStore>,
}

impl SearchTodoTool {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SearchTodoTool {
    fn name(&self) -> &'static str {
        "searchTodo"
    }

    fn description(&self) -> &str {
        "Search todos. Input is a search term or LIKE pattern."
    }

    async fn execute(&self, input: Option<&str>) -> Result<Value, Error> {
        let pattern = require_input(self.name(), input)?;
        let todos = self.store.search_todos(pattern).await?;
        Ok(serde_json::to_value(todos).unwrap_or(Value::Array(Vec::new())))
    }
}
