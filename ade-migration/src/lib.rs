//! Schema migrations for ADE storage backends
//!
//! Each backend provides its list of [`Migration`]s and a [`MigrationManager`]
//! that records applied versions in the `_ade_migrations` table.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Database;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("Migration versions out of order: {0}")]
    Ordering(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<MigrationError> for ade_core::Error {
    fn from(value: MigrationError) -> Self {
        ade_core::Error::Storage(ade_core::error::StorageError::Migration(value.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;

#[async_trait]
pub trait Migration<DB: Database>: Send + Sync {
    /// Execute the migration
    async fn up<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Rollback the migration
    async fn down<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Unique version number for ordering migrations
    fn version(&self) -> i64;

    fn name(&self) -> &str;
}

/// A row of the migration tracking table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    /// Unix timestamp in seconds
    pub applied_at: i64,
}

impl MigrationRecord {
    pub fn applied_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.applied_at, 0)
    }
}

/// Ensure versions are positive and strictly increasing.
pub fn check_order<DB: Database>(migrations: &[Box<dyn Migration<DB>>]) -> Result<()> {
    let mut previous = 0;
    for migration in migrations {
        let version = migration.version();
        if version <= previous {
            return Err(MigrationError::Ordering(format!(
                "{} (version {version}) must come after version {previous}",
                migration.name()
            )));
        }
        previous = version;
    }
    Ok(())
}

#[async_trait]
pub trait MigrationManager<DB: Database>: Send + Sync {
    fn get_migration_table_name(&self) -> &str {
        "_ade_migrations"
    }

    /// Initialize migration tracking table
    async fn initialize(&self) -> Result<()>;

    /// Apply pending migrations in version order
    async fn up(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    /// Roll back applied migrations, newest first
    async fn down(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    async fn get_applied_migrations(&self) -> Result<Vec<MigrationRecord>>;

    async fn is_applied(&self, version: i64) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Any;

    struct Noop(i64);

    #[async_trait]
    impl Migration<Any> for Noop {
        async fn up<'a>(&'a self, _conn: &'a mut <Any as Database>::Connection) -> Result<()> {
            Ok(())
        }

        async fn down<'a>(&'a self, _conn: &'a mut <Any as Database>::Connection) -> Result<()> {
            Ok(())
        }

        fn version(&self) -> i64 {
            self.0
        }

        fn name(&self) -> &str {
            "Noop"
        }
    }

    #[test]
    fn test_check_order() {
        let ordered: Vec<Box<dyn Migration<Any>>> = vec![Box::new(Noop(1)), Box::new(Noop(2))];
        assert!(check_order(&ordered).is_ok());

        let duplicated: Vec<Box<dyn Migration<Any>>> = vec![Box::new(Noop(1)), Box::new(Noop(1))];
        assert!(matches!(
            check_order(&duplicated),
            Err(MigrationError::Ordering(_))
        ));

        let zero: Vec<Box<dyn Migration<Any>>> = vec![Box::new(Noop(0))];
        assert!(check_order(&zero).is_err());
    }

    #[test]
    fn test_record_timestamp() {
        let record = MigrationRecord {
            version: 1,
            name: "CreateCentres".to_string(),
            applied_at: 1_750_000_000,
        };
        assert_eq!(record.applied_at().unwrap().timestamp(), 1_750_000_000);
    }

    #[test]
    fn test_error_converts_to_storage_error() {
        let err: ade_core::Error = MigrationError::Migration("boom".to_string()).into();
        assert!(err.is_storage_error());
    }
}
