use crate::{
    Error,
    user::{Credentials, Utilisateur, UtilisateurRecord},
};
use async_trait::async_trait;

/// Repository for `DIM_UTILISATEUR`
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// List all accounts ordered by user name
    async fn list(&self) -> Result<Vec<Utilisateur>, Error>;

    /// Find an account by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Utilisateur>, Error>;

    /// Find an account and its password hash by login name
    async fn find_credentials(&self, nom_utilisateur: &str) -> Result<Option<Credentials>, Error>;

    /// Create an account. `record.password_hash` must be set.
    async fn create(&self, record: &UtilisateurRecord) -> Result<Utilisateur, Error>;

    /// Update an account, keeping the stored hash when `record.password_hash` is `None`
    async fn update(&self, id: i64, record: &UtilisateurRecord)
    -> Result<Option<Utilisateur>, Error>;

    /// Delete an account by ID
    async fn delete(&self, id: i64) -> Result<bool, Error>;

    /// Stamp the last successful login
    async fn touch_last_login(&self, id: i64) -> Result<(), Error>;

    /// Number of accounts, used to decide whether to bootstrap an administrator
    async fn count(&self) -> Result<i64, Error>;
}
