//! `TodoStore` trait — async interface over the todo table.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::todos::Todo;

/// Backend-agnostic store for todos.
///
/// Each call is a single atomic statement; concurrency control is left to
/// the database.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Every todo, oldest first.
    async fn list_todos(&self) -> Result<Vec<Todo>, DatabaseError>;

    /// Insert a todo and return its new ID. Blank text is a
    /// `DatabaseError::Constraint`.
    async fn create_todo(&self, text: &str) -> Result<i64, DatabaseError>;

    /// Remove a todo. Deleting an unknown ID is not an error.
    async fn delete_todo(&self, id: i64) -> Result<(), DatabaseError>;

    /// Case-insensitive `LIKE` search over todo text.
    async fn search_todos(&self, pattern: &str) -> Result<Vec<Todo>, DatabaseError>;
}
