//! Service layer for business logic
//!
//! Services validate input, apply role-independent rules and delegate
//! persistence to the repositories.

pub mod agence;
pub mod auth;
pub mod categorie;
pub mod centre;
pub mod commune;
pub mod kpi;
pub mod login_limiter;
pub mod objective;
pub mod user;

pub use agence::AgenceService;
pub use auth::{AuthService, LoginOutcome, hash_password, verify_password};
pub use categorie::CategorieService;
pub use centre::CentreService;
pub use commune::CommuneService;
pub use kpi::KpiService;
pub use login_limiter::{
    BlockStatus, FailureOutcome, LoginAttemptLimiter, LoginAttemptRecord, LoginLimitConfig,
};
pub use objective::ObjectiveService;
pub use user::UserService;

use crate::{Error, error::StorageError};

/// Turn a missing row into a not-found error.
pub(crate) fn found<T>(value: Option<T>) -> Result<T, Error> {
    value.ok_or(Error::Storage(StorageError::NotFound))
}

/// Turn a `false` delete result into a not-found error.
pub(crate) fn deleted(removed: bool) -> Result<(), Error> {
    if removed {
        Ok(())
    } else {
        Err(Error::Storage(StorageError::NotFound))
    }
}
