//! Diesel async connection handling for SQLite.
//!
//! Uses diesel-async's SyncConnectionWrapper to provide an async
//! interface. SQLite connections are lightweight and file-based, so a
//! new connection is established per request rather than pooled.

use std::path::Path;
use std::time::Duration;

use diesel::sqlite::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::AsyncConnection;

use crate::retry::{RetriesExhausted, RetryPolicy};

/// Diesel error type alias.
pub type DieselError = diesel::result::Error;

/// Async SQLite connection using SyncConnectionWrapper.
pub type AsyncSqliteConnection = SyncConnectionWrapper<SqliteConnection>;

fn to_diesel_error(e: impl std::error::Error) -> DieselError {
    DieselError::DatabaseError(
        diesel::result::DatabaseErrorKind::Unknown,
        Box::new(e.to_string()),
    )
}

/// A simple async connection factory for SQLite.
#[derive(Clone)]
pub struct AsyncSqlitePool {
    database_url: String,
}

impl AsyncSqlitePool {
    /// Create a new async SQLite pool.
    pub fn new(database_url: &str) -> Self {
        // Strip sqlite: prefix if present - diesel expects a file path
        let url = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
        Self {
            database_url: url.to_string(),
        }
    }

    /// Create pool from a file path.
    pub fn from_path(db_path: &Path) -> Self {
        Self::new(&db_path.display().to_string())
    }

    /// Get a new connection.
    pub async fn get(&self) -> Result<AsyncSqliteConnection, DieselError> {
        AsyncSqliteConnection::establish(&self.database_url)
            .await
            .map_err(to_diesel_error)
    }

    /// Acquire a connection with a bounded retry, so a briefly locked
    /// database file does not kill a run. Exhaustion is a typed error
    /// the caller has to handle; at run start it is fatal.
    pub async fn acquire_with_retry(
        &self,
    ) -> Result<AsyncSqliteConnection, RetriesExhausted<DieselError>> {
        RetryPolicy::fixed(3, Duration::from_secs(2))
            .run(|attempt| async move {
                match self.get().await {
                    Ok(conn) => Ok(conn),
                    Err(e) => {
                        tracing::warn!(
                            "database connection attempt {} failed: {}",
                            attempt,
                            e
                        );
                        Err(e)
                    }
                }
            })
            .await
    }

    /// Get the database URL.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}
