//! Persistence layer — libSQL-backed storage for todos.

pub mod bounded;
pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use bounded::BoundedStore;
pub use libsql_backend::LibSqlBackend;
pub use traits::TodoStore;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::DatabaseError;

/// Where the todo table lives, parsed from a connection string.
#[derive(Debug, Clone)]
pub enum DatabaseLocation {
    /// Private in-memory database, gone when the process exits.
    Memory,
    /// Local database file.
    Local(PathBuf),
    /// Remote libSQL server (`libsql://`, `http://` or `https://`).
    Remote { url: String, token: SecretString },
}

impl DatabaseLocation {
    /// Interpret a connection string. Anything that is not `:memory:` or a
    /// remote URL is treated as a file path.
    pub fn parse(url: &str, token: Option<String>) -> Self {
        let url = url.trim();
        if url == ":memory:" {
            DatabaseLocation::Memory
        } else if ["libsql://", "http://", "https://"]
            .iter()
            .any(|scheme| url.starts_with(scheme))
        {
            DatabaseLocation::Remote {
                url: url.to_string(),
                token: SecretString::from(token.unwrap_or_default()),
            }
        } else {
            DatabaseLocation::Local(PathBuf::from(url.strip_prefix("file:").unwrap_or(url)))
        }
    }
}

impl std::fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseLocation::Memory => write!(f, ":memory:"),
            DatabaseLocation::Local(path) => write!(f, "{}", path.display()),
            DatabaseLocation::Remote { url, .. } => write!(f, "{url}"),
        }
    }
}

/// Open the store at `location`, run migrations, and bound every call by
/// `timeout`.
pub async fn open(
    location: &DatabaseLocation,
    timeout: Duration,
) -> Result<Arc<dyn TodoStore>, DatabaseError> {
    let backend = match location {
        DatabaseLocation::Memory => LibSqlBackend::new_memory().await?,
        DatabaseLocation::Local(path) => LibSqlBackend::new_local(path).await?,
        DatabaseLocation::Remote { url, token } => {
            LibSqlBackend::new_remote(url, token.expose_secret()).await?
        }
    };
    Ok(Arc::new(BoundedStore::new(Arc::new(backend), timeout)))
}
