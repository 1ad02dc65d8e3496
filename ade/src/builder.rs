//! Builder for [`Ade`] instances
//!
//! Storage must be configured before [`AdeBuilder::build`] becomes available;
//! this is enforced at compile time with type-state markers.
//!
//! # Example
//!
//! ```rust,no_run
//! use ade::{AdeBuilder, LoginLimitConfig};
//! use chrono::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ade = AdeBuilder::new()
//!         .with_sqlite("sqlite::memory:")
//!         .await?
//!         .with_login_limits(LoginLimitConfig {
//!             max_attempts: 5,
//!             block_duration: Duration::minutes(30),
//!         })
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     ade.health_check().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use ade_core::{LoginLimitConfig, ObjectiveWindow, RepositoryProvider};

use crate::Ade;

/// Errors that can occur when building an [`Ade`] instance.
#[derive(Debug, thiserror::Error)]
pub enum AdeBuilderError {
    #[error("Storage connection failed: {0}")]
    StorageConnection(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Marker type indicating no storage has been configured yet.
pub struct NoStorage;

/// Marker type indicating storage has been configured.
pub struct WithStorage<R: RepositoryProvider> {
    repositories: Arc<R>,
}

/// A type-safe builder for constructing [`Ade`] instances.
///
/// # Type States
///
/// - [`NoStorage`]: initial state, storage must be configured
/// - [`WithStorage<R>`]: storage configured, ready to build
pub struct AdeBuilder<Storage> {
    storage: Storage,
    login_limits: LoginLimitConfig,
    objective_window: ObjectiveWindow,
    apply_migrations: bool,
}

impl Default for AdeBuilder<NoStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl AdeBuilder<NoStorage> {
    /// Create a new builder.
    ///
    /// # Defaults
    ///
    /// - Login limits: 3 failures per address, then blocked for 15 minutes
    /// - Objective window: 3 months back, 2 months ahead
    /// - Apply migrations: false
    pub fn new() -> Self {
        Self {
            storage: NoStorage,
            login_limits: LoginLimitConfig::default(),
            objective_window: ObjectiveWindow::default(),
            apply_migrations: false,
        }
    }

    /// Use an already constructed repository provider.
    pub fn with_repositories<R: RepositoryProvider>(
        self,
        repositories: Arc<R>,
    ) -> AdeBuilder<WithStorage<R>> {
        AdeBuilder {
            storage: WithStorage { repositories },
            login_limits: self.login_limits,
            objective_window: self.objective_window,
            apply_migrations: self.apply_migrations,
        }
    }
}

#[cfg(feature = "sqlite")]
impl AdeBuilder<NoStorage> {
    /// Configure SQLite storage by connecting to the given URL.
    ///
    /// * `url` - SQLite connection URL (e.g. `sqlite::memory:` or `sqlite://ade.db?mode=rwc`)
    pub async fn with_sqlite(
        self,
        url: &str,
    ) -> Result<AdeBuilder<WithStorage<ade_storage_sqlite::SqliteRepositoryProvider>>, AdeBuilderError>
    {
        let storage = ade_storage_sqlite::SqliteStorage::connect(url)
            .await
            .map_err(|e| AdeBuilderError::StorageConnection(e.to_string()))?;

        Ok(self.with_repositories(Arc::new(storage.into_repository_provider())))
    }

    /// Configure SQLite storage with an existing connection pool.
    pub fn with_sqlite_pool(
        self,
        pool: sqlx::SqlitePool,
    ) -> AdeBuilder<WithStorage<ade_storage_sqlite::SqliteRepositoryProvider>> {
        self.with_repositories(Arc::new(
            ade_storage_sqlite::SqliteRepositoryProvider::new(pool),
        ))
    }
}

impl<R: RepositoryProvider> AdeBuilder<WithStorage<R>> {
    /// Set the failed-login threshold and block duration.
    pub fn with_login_limits(mut self, config: LoginLimitConfig) -> Self {
        self.login_limits = config;
        self
    }

    /// Set the months around today during which objectives may be set.
    pub fn with_objective_window(mut self, window: ObjectiveWindow) -> Self {
        self.objective_window = window;
        self
    }

    /// Set whether to apply database migrations during `build()`.
    ///
    /// Default: false
    pub fn apply_migrations(mut self, apply: bool) -> Self {
        self.apply_migrations = apply;
        self
    }

    /// Build the [`Ade`] instance, applying migrations first when requested.
    pub async fn build(self) -> Result<Ade<R>, AdeBuilderError> {
        if self.login_limits.max_attempts == 0 {
            return Err(AdeBuilderError::InvalidConfiguration(
                "login max_attempts must be at least 1".to_string(),
            ));
        }
        if self.login_limits.block_duration <= chrono::Duration::zero() {
            return Err(AdeBuilderError::InvalidConfiguration(
                "login block duration must be positive".to_string(),
            ));
        }
        if self.login_limits.block_duration
            > chrono::Duration::minutes(LoginLimitConfig::MAX_BLOCK_MINUTES)
        {
            return Err(AdeBuilderError::InvalidConfiguration(format!(
                "login block duration must not exceed {} minutes",
                LoginLimitConfig::MAX_BLOCK_MINUTES
            )));
        }

        if self.apply_migrations {
            tracing::debug!("Applying database migrations");
            self.storage
                .repositories
                .migrate()
                .await
                .map_err(|e| AdeBuilderError::Migration(e.to_string()))?;
        }

        tracing::info!(
            max_attempts = self.login_limits.max_attempts,
            months_back = self.objective_window.months_back,
            months_ahead = self.objective_window.months_ahead,
            "ADE services ready"
        );

        Ok(Ade::from_parts(
            self.storage.repositories,
            self.login_limits,
            self.objective_window,
        ))
    }
}
