//! # ADE
//!
//! Administration backend for the KPI dashboard of ADE collection agencies.
//! Reference data is organised as Centre → Agence → Commune; administrators set
//! periodic objectives per agence and agences record their daily realizations
//! (relances, mises en demeure, dossiers juridiques, coupures, encaissements).
//!
//! [`Ade`] wires every service to a storage backend and owns the process-wide
//! login attempt limiter. Build one with [`AdeBuilder`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use ade::AdeBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ade = AdeBuilder::new()
//!         .with_sqlite("sqlite://ade.db?mode=rwc")
//!         .await?
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     let centres = ade.centres().list().await?;
//!     println!("{} centres", centres.len());
//!     Ok(())
//! }
//! ```
use std::sync::Arc;

use ade_core::{
    RepositoryProvider,
    repositories::{
        AgenceRepositoryAdapter, CategorieRepositoryAdapter, CentreRepositoryAdapter,
        CommuneRepositoryAdapter, KpiRepositoryAdapter, ObjectiveRepositoryAdapter,
        UserRepositoryAdapter,
    },
    services::{
        AgenceService, AuthService, CategorieService, CentreService, CommuneService, KpiService,
        ObjectiveService, UserService,
    },
};
use tokio::{sync::watch, task::JoinHandle};

mod builder;

pub use builder::{AdeBuilder, AdeBuilderError, NoStorage, WithStorage};

/// Re-export core types from ade_core
pub use ade_core::{
    Agence, AgenceInput, Capability, Categorie, CategorieInput, Centre, CentreAgenceCount,
    CentreInput, Commune, CommuneInput, Error, IndicatorProgress, KpiFilter, KpiInput, KpiKey,
    KpiMeasures, KpiRecord, KpiSummary, LoginAttemptLimiter, LoginLimitConfig, LoginOutcome,
    Objectif, ObjectifInput, ObjectiveFilter, ObjectiveProgress, ObjectiveTargets,
    ObjectiveWindow, Role, TemporalViolation, Utilisateur, UtilisateurInput,
};

#[cfg(feature = "sqlite")]
pub use ade_storage_sqlite::{SqliteRepositoryProvider, SqliteStorage};

/// Errors raised by [`Ade`] lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum AdeError {
    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type AdeObjectiveService<R> =
    ObjectiveService<ObjectiveRepositoryAdapter<R>, KpiRepositoryAdapter<R>>;

/// Services of the backend, bound to one repository provider.
pub struct Ade<R: RepositoryProvider> {
    repositories: Arc<R>,
    limiter: Arc<LoginAttemptLimiter>,
    auth: Arc<AuthService<UserRepositoryAdapter<R>>>,
    centres: Arc<CentreService<CentreRepositoryAdapter<R>>>,
    agences: Arc<AgenceService<AgenceRepositoryAdapter<R>>>,
    communes: Arc<CommuneService<CommuneRepositoryAdapter<R>>>,
    categories: Arc<CategorieService<CategorieRepositoryAdapter<R>>>,
    users: Arc<UserService<UserRepositoryAdapter<R>>>,
    objectives: Arc<AdeObjectiveService<R>>,
    kpis: Arc<KpiService<KpiRepositoryAdapter<R>>>,
}

impl<R: RepositoryProvider> Ade<R> {
    /// Create an instance with the default login limits and objective window.
    pub fn new(repositories: Arc<R>) -> Self {
        Self::from_parts(
            repositories,
            LoginLimitConfig::default(),
            ObjectiveWindow::default(),
        )
    }

    pub(crate) fn from_parts(
        repositories: Arc<R>,
        login_limits: LoginLimitConfig,
        objective_window: ObjectiveWindow,
    ) -> Self {
        let user_repo = Arc::new(UserRepositoryAdapter::new(repositories.clone()));
        let limiter = Arc::new(LoginAttemptLimiter::new(login_limits));

        Self {
            auth: Arc::new(AuthService::new(user_repo.clone(), limiter.clone())),
            centres: Arc::new(CentreService::new(Arc::new(CentreRepositoryAdapter::new(
                repositories.clone(),
            )))),
            agences: Arc::new(AgenceService::new(Arc::new(AgenceRepositoryAdapter::new(
                repositories.clone(),
            )))),
            communes: Arc::new(CommuneService::new(Arc::new(
                CommuneRepositoryAdapter::new(repositories.clone()),
            ))),
            categories: Arc::new(CategorieService::new(Arc::new(
                CategorieRepositoryAdapter::new(repositories.clone()),
            ))),
            users: Arc::new(UserService::new(user_repo)),
            objectives: Arc::new(
                ObjectiveService::new(
                    Arc::new(ObjectiveRepositoryAdapter::new(repositories.clone())),
                    Arc::new(KpiRepositoryAdapter::new(repositories.clone())),
                )
                .with_window(objective_window),
            ),
            kpis: Arc::new(KpiService::new(Arc::new(KpiRepositoryAdapter::new(
                repositories.clone(),
            )))),
            limiter,
            repositories,
        }
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), AdeError> {
        self.repositories
            .migrate()
            .await
            .map_err(|e| AdeError::StorageError(e.to_string()))
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), AdeError> {
        self.repositories
            .health_check()
            .await
            .map_err(|e| AdeError::StorageError(e.to_string()))
    }

    pub fn repositories(&self) -> &Arc<R> {
        &self.repositories
    }

    pub fn limiter(&self) -> &Arc<LoginAttemptLimiter> {
        &self.limiter
    }

    pub fn auth(&self) -> &AuthService<UserRepositoryAdapter<R>> {
        &self.auth
    }

    pub fn centres(&self) -> &CentreService<CentreRepositoryAdapter<R>> {
        &self.centres
    }

    pub fn agences(&self) -> &AgenceService<AgenceRepositoryAdapter<R>> {
        &self.agences
    }

    pub fn communes(&self) -> &CommuneService<CommuneRepositoryAdapter<R>> {
        &self.communes
    }

    pub fn categories(&self) -> &CategorieService<CategorieRepositoryAdapter<R>> {
        &self.categories
    }

    pub fn users(&self) -> &UserService<UserRepositoryAdapter<R>> {
        &self.users
    }

    pub fn objectives(&self) -> &AdeObjectiveService<R> {
        &self.objectives
    }

    pub fn kpis(&self) -> &KpiService<KpiRepositoryAdapter<R>> {
        &self.kpis
    }

    /// Attempt a login from `address`, going through the attempt limiter.
    pub async fn login(
        &self,
        address: &str,
        nom_utilisateur: &str,
        password: &str,
    ) -> Result<LoginOutcome, Error> {
        self.auth.login(address, nom_utilisateur, password).await
    }

    /// Create the first administrator if the user table is empty.
    pub async fn bootstrap_admin(
        &self,
        nom_utilisateur: &str,
        password: &str,
    ) -> Result<Option<Utilisateur>, Error> {
        self.users.bootstrap_admin(nom_utilisateur, password).await
    }

    /// Spawn the periodic purge of expired limiter entries.
    pub fn start_cleanup_task(&self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        self.limiter.clone().start_cleanup_task(shutdown)
    }
}
