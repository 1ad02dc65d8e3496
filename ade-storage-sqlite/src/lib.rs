//! SQLite storage backend
//!
//! Dates (`Date_Debut`, `DateKPI`, ...) are stored as ISO `YYYY-MM-DD` text so
//! range filters compare lexicographically. Creation and login instants are
//! stored as unix timestamps.
//!
//! ```rust,no_run
//! use ade_storage_sqlite::SqliteStorage;
//!
//! # async fn example() -> Result<(), ade_core::Error> {
//! let storage = SqliteStorage::connect("sqlite://ade.db?mode=rwc").await?;
//! storage.migrate().await?;
//! let repositories = storage.into_repository_provider();
//! # Ok(())
//! # }
//! ```
pub mod migrations;
pub mod repositories;

pub use repositories::SqliteRepositoryProvider;

use ade_core::{Error, RepositoryProvider, error::StorageError};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;

pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `database_url`, creating the file when missing.
    ///
    /// In-memory databases use a single connection that is never recycled,
    /// otherwise every pooled connection would see its own empty database.
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                tracing::error!(error = %e, url = %database_url, "Invalid SQLite URL");
                StorageError::Connection(format!("Invalid SQLite URL: {database_url}"))
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to SQLite");
            StorageError::Connection("Failed to connect to SQLite".to_string())
        })?;

        tracing::debug!(url = %database_url, "Connected to SQLite");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), Error> {
        self.repository_provider().migrate().await
    }

    pub fn repository_provider(&self) -> SqliteRepositoryProvider {
        SqliteRepositoryProvider::new(self.pool.clone())
    }

    pub fn into_repository_provider(self) -> SqliteRepositoryProvider {
        SqliteRepositoryProvider::new(self.pool)
    }
}

/// Map a query failure, keeping constraint violations distinguishable.
pub(crate) fn storage_error(e: sqlx::Error, message: &str) -> Error {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            tracing::debug!(error = %e, "{message}");
            return Error::Storage(StorageError::Constraint(format!(
                "{message}: duplicate entry"
            )));
        }
        if db.is_foreign_key_violation() {
            tracing::debug!(error = %e, "{message}");
            return Error::Storage(StorageError::Constraint(format!(
                "{message}: referenced row missing or still in use"
            )));
        }
        if db.is_check_violation() {
            return Error::Storage(StorageError::Constraint(format!(
                "{message}: check constraint failed"
            )));
        }
    }

    tracing::error!(error = %e, "{message}");
    Error::Storage(StorageError::Database(message.to_string()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub async fn migrated_provider() -> SqliteRepositoryProvider {
        let storage = SqliteStorage::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        storage.migrate().await.expect("Failed to migrate");
        storage.into_repository_provider()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_memory_and_health_check() {
        let storage = SqliteStorage::connect("sqlite::memory:").await.unwrap();
        storage.migrate().await.unwrap();

        let provider = storage.repository_provider();
        provider.health_check().await.unwrap();

        // Migrating twice is a no-op
        storage.migrate().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_fails_for_missing_directory() {
        let result = SqliteStorage::connect("sqlite:///missing/ade/dir/ade.db?mode=rwc").await;
        assert!(result.is_err());
    }
}
