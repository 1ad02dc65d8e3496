//! Repository implementations for SQLite storage

pub mod agence;
pub mod categorie;
pub mod centre;
pub mod commune;
pub mod kpi;
pub mod objective;
pub mod user;

pub use agence::SqliteAgenceRepository;
pub use categorie::SqliteCategorieRepository;
pub use centre::SqliteCentreRepository;
pub use commune::SqliteCommuneRepository;
pub use kpi::SqliteKpiRepository;
pub use objective::SqliteObjectiveRepository;
pub use user::SqliteUserRepository;

use ade_core::{
    Error,
    error::StorageError,
    repositories::{
        AgenceRepositoryProvider, CategorieRepositoryProvider, CentreRepositoryProvider,
        CommuneRepositoryProvider, KpiRepositoryProvider, ObjectiveRepositoryProvider,
        RepositoryProvider, UserRepositoryProvider,
    },
};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Repository provider implementation for SQLite
///
/// This struct implements all the individual repository provider traits
/// as well as the unified `RepositoryProvider` trait.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    centre: Arc<SqliteCentreRepository>,
    agence: Arc<SqliteAgenceRepository>,
    commune: Arc<SqliteCommuneRepository>,
    categorie: Arc<SqliteCategorieRepository>,
    user: Arc<SqliteUserRepository>,
    objective: Arc<SqliteObjectiveRepository>,
    kpi: Arc<SqliteKpiRepository>,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            centre: Arc::new(SqliteCentreRepository::new(pool.clone())),
            agence: Arc::new(SqliteAgenceRepository::new(pool.clone())),
            commune: Arc::new(SqliteCommuneRepository::new(pool.clone())),
            categorie: Arc::new(SqliteCategorieRepository::new(pool.clone())),
            user: Arc::new(SqliteUserRepository::new(pool.clone())),
            objective: Arc::new(SqliteObjectiveRepository::new(pool.clone())),
            kpi: Arc::new(SqliteKpiRepository::new(pool.clone())),
            pool,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl CentreRepositoryProvider for SqliteRepositoryProvider {
    type CentreRepo = SqliteCentreRepository;

    fn centre(&self) -> &Self::CentreRepo {
        &self.centre
    }
}

impl AgenceRepositoryProvider for SqliteRepositoryProvider {
    type AgenceRepo = SqliteAgenceRepository;

    fn agence(&self) -> &Self::AgenceRepo {
        &self.agence
    }
}

impl CommuneRepositoryProvider for SqliteRepositoryProvider {
    type CommuneRepo = SqliteCommuneRepository;

    fn commune(&self) -> &Self::CommuneRepo {
        &self.commune
    }
}

impl CategorieRepositoryProvider for SqliteRepositoryProvider {
    type CategorieRepo = SqliteCategorieRepository;

    fn categorie(&self) -> &Self::CategorieRepo {
        &self.categorie
    }
}

impl UserRepositoryProvider for SqliteRepositoryProvider {
    type UserRepo = SqliteUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.user
    }
}

impl ObjectiveRepositoryProvider for SqliteRepositoryProvider {
    type ObjectiveRepo = SqliteObjectiveRepository;

    fn objective(&self) -> &Self::ObjectiveRepo {
        &self.objective
    }
}

impl KpiRepositoryProvider for SqliteRepositoryProvider {
    type KpiRepo = SqliteKpiRepository;

    fn kpi(&self) -> &Self::KpiRepo {
        &self.kpi
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        use crate::migrations::{SqliteMigrationManager, all};
        use ade_migration::MigrationManager;

        let manager = SqliteMigrationManager::new(self.pool.clone());
        manager.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            Error::Storage(StorageError::Migration(
                "Failed to initialize migrations".to_string(),
            ))
        })?;

        manager.up(&all()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::Storage(StorageError::Migration(
                "Failed to run migrations".to_string(),
            ))
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| crate::storage_error(e, "Health check failed"))?;
        Ok(())
    }
}
