//! libSQL backend — async `TodoStore` implementation.
//!
//! Supports local file, in-memory and remote libSQL databases.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::TodoStore;
use crate::todos::{Todo, like_matcher};

const TODO_COLUMNS: &str = "id, text, created_at, updated_at";

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: LibSqlDatabase,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests and throwaway sessions).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        Self::from_database(db).await
    }

    /// Connect to a remote libSQL server.
    pub async fn new_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to connect to {url}: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(url, "Remote database connected");
        Ok(backend)
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self { db, conn })
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }

    async fn query_todos(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
        operation: &str,
    ) -> Result<Vec<Todo>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(sql, params)
            .await
            .map_err(|e| DatabaseError::Query(format!("{operation}: {e}")))?;

        let mut todos = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("{operation} row: {e}")))?
        {
            todos.push(row_to_todo(&row)?);
        }
        Ok(todos)
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Map a libsql Row to a Todo. Column order matches TODO_COLUMNS.
fn row_to_todo(row: &libsql::Row) -> Result<Todo, DatabaseError> {
    let id: i64 = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("todo.id: {e}")))?;
    let text: String = row
        .get(1)
        .map_err(|e| DatabaseError::Query(format!("todo.text: {e}")))?;
    let created: String = row.get(2).unwrap_or_default();
    let updated: String = row.get(3).unwrap_or_default();

    Ok(Todo {
        id,
        text,
        created_at: parse_datetime(&created),
        updated_at: parse_datetime(&updated),
    })
}

#[async_trait]
impl TodoStore for LibSqlBackend {
    async fn list_todos(&self) -> Result<Vec<Todo>, DatabaseError> {
        self.query_todos(
            &format!("SELECT {TODO_COLUMNS} FROM todos ORDER BY id ASC"),
            (),
            "list_todos",
        )
        .await
    }

    async fn create_todo(&self, text: &str) -> Result<i64, DatabaseError> {
        if text.trim().is_empty() {
            return Err(DatabaseError::Constraint(
                "todo text must not be empty".to_string(),
            ));
        }

        let now = Utc::now().to_rfc3339();
        let mut rows = self
            .conn()
            .query(
                "INSERT INTO todos (text, created_at, updated_at) VALUES (?1, ?2, ?3) RETURNING id",
                params![text, now.as_str(), now.as_str()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("create_todo: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("create_todo row: {e}")))?
            .ok_or_else(|| DatabaseError::Query("create_todo: no id returned".to_string()))?;
        let id: i64 = row
            .get(0)
            .map_err(|e| DatabaseError::Query(format!("create_todo id: {e}")))?;

        debug!(id, "Todo created");
        Ok(id)
    }

    async fn delete_todo(&self, id: i64) -> Result<(), DatabaseError> {
        let removed = self
            .conn()
            .execute("DELETE FROM todos WHERE id = ?1", params![id])
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_todo: {e}")))?;
        debug!(id, removed, "Todo delete");
        Ok(())
    }

    async fn search_todos(&self, pattern: &str) -> Result<Vec<Todo>, DatabaseError> {
        // SQLite's LIKE only folds ASCII, so matching happens here.
        let matcher = like_matcher(pattern)
            .map_err(|e| DatabaseError::Constraint(format!("search pattern: {e}")))?;
        let todos = self
            .query_todos(
                &format!("SELECT {TODO_COLUMNS} FROM todos ORDER BY id ASC"),
                (),
                "search_todos",
            )
            .await?;
        Ok(todos
            .into_iter()
            .filter(|todo| matcher.is_match(&todo.text))
            .collect())
    }
}
