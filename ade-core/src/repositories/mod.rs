//! Repository traits for data access layer
//!
//! This module defines the repository interfaces that services use to interact with storage.
//! These traits provide a clean abstraction over the underlying storage implementation.
//!
//! # Trait Hierarchy
//!
//! - Individual `*Repository` traits define the operations for each table
//! - Individual `*RepositoryProvider` traits provide access to each repository type
//! - [`RepositoryProvider`] is a supertrait combining all provider traits plus lifecycle methods

pub mod adapter;
pub mod agence;
pub mod categorie;
pub mod centre;
pub mod commune;
pub mod kpi;
pub mod objective;
pub mod user;

pub use adapter::{
    AgenceRepositoryAdapter, CategorieRepositoryAdapter, CentreRepositoryAdapter,
    CommuneRepositoryAdapter, KpiRepositoryAdapter, ObjectiveRepositoryAdapter,
    UserRepositoryAdapter,
};
pub use agence::AgenceRepository;
pub use categorie::CategorieRepository;
pub use centre::CentreRepository;
pub use commune::CommuneRepository;
pub use kpi::KpiRepository;
pub use objective::ObjectiveRepository;
pub use user::UserRepository;

use async_trait::async_trait;

use crate::Error;

// ============================================================================
// Individual Repository Provider Traits
// ============================================================================

/// Provider trait for centre repository access.
pub trait CentreRepositoryProvider: Send + Sync + 'static {
    type CentreRepo: CentreRepository;

    fn centre(&self) -> &Self::CentreRepo;
}

/// Provider trait for agence repository access.
pub trait AgenceRepositoryProvider: Send + Sync + 'static {
    type AgenceRepo: AgenceRepository;

    fn agence(&self) -> &Self::AgenceRepo;
}

/// Provider trait for commune repository access.
pub trait CommuneRepositoryProvider: Send + Sync + 'static {
    type CommuneRepo: CommuneRepository;

    fn commune(&self) -> &Self::CommuneRepo;
}

/// Provider trait for category repository access.
pub trait CategorieRepositoryProvider: Send + Sync + 'static {
    type CategorieRepo: CategorieRepository;

    fn categorie(&self) -> &Self::CategorieRepo;
}

/// Provider trait for user account repository access.
pub trait UserRepositoryProvider: Send + Sync + 'static {
    type UserRepo: UserRepository;

    fn user(&self) -> &Self::UserRepo;
}

/// Provider trait for objective repository access.
pub trait ObjectiveRepositoryProvider: Send + Sync + 'static {
    type ObjectiveRepo: ObjectiveRepository;

    fn objective(&self) -> &Self::ObjectiveRepo;
}

/// Provider trait for KPI fact repository access.
pub trait KpiRepositoryProvider: Send + Sync + 'static {
    type KpiRepo: KpiRepository;

    fn kpi(&self) -> &Self::KpiRepo;
}

// ============================================================================
// Unified Repository Provider Trait
// ============================================================================

/// Provider trait that storage implementations must implement to provide all repositories.
///
/// # Implementing a Custom Storage Backend
///
/// 1. Implement each individual `*Repository` trait for your backend
/// 2. Implement each individual `*RepositoryProvider` trait
/// 3. Implement the `RepositoryProvider` trait with `migrate()` and `health_check()`
#[async_trait]
pub trait RepositoryProvider:
    CentreRepositoryProvider
    + AgenceRepositoryProvider
    + CommuneRepositoryProvider
    + CategorieRepositoryProvider
    + UserRepositoryProvider
    + ObjectiveRepositoryProvider
    + KpiRepositoryProvider
{
    /// Run migrations for all repositories
    async fn migrate(&self) -> Result<(), Error>;

    /// Health check for all repositories
    async fn health_check(&self) -> Result<(), Error>;
}
