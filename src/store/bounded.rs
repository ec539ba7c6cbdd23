//! Deadline decorator for any `TodoStore`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::DatabaseError;
use crate::store::traits::TodoStore;
use crate::todos::Todo;

/// Fails any store call that runs longer than `timeout` with
/// `DatabaseError::Timeout`.
pub struct BoundedStore {
    inner: Arc<dyn TodoStore>,
    timeout: Duration,
}

impl BoundedStore {
    pub fn new(inner: Arc<dyn TodoStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, DatabaseError>>,
    ) -> Result<T, DatabaseError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout = ?self.timeout, "Store call timed out");
                Err(DatabaseError::Timeout {
                    operation,
                    after: self.timeout,
                })
            }
        }
    }
}

#[async_trait]
impl TodoStore for BoundedStore {
    async fn list_todos(&self) -> Result<Vec<Todo>, DatabaseError> {
        self.bounded("list_todos", self.inner.list_todos()).await
    }

    async fn create_todo(&self, text: &str) -> Result<i64, DatabaseError> {
        self.bounded("create_todo", self.inner.create_todo(text)).await
    }

    async fn delete_todo(&self, id: i64) -> Result<(), DatabaseError> {
        self.bounded("delete_todo", self.inner.delete_todo(id)).await
    }

    async fn search_todos(&self, pattern: &str) -> Result<Vec<Todo>, DatabaseError> {
        self.bounded("search_todos", self.inner.search_todos(pattern)).await
    }
}
