use crate::{
    Error,
    error::AuthError,
    repositories::UserRepository,
    services::login_limiter::LoginAttemptLimiter,
    user::Utilisateur,
};
use std::sync::Arc;

/// Decision produced by [`AuthService::login`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Success(Utilisateur),
    /// The address is blocked; credentials were not checked.
    Blocked { retry_after_seconds: i64 },
    /// Credentials were rejected and the address is not yet blocked.
    Rejected { remaining_attempts: u32 },
}

/// Hash a password for storage (argon2 via `password-auth`).
pub fn hash_password(password: &str) -> String {
    password_auth::generate_hash(password)
}

/// Check a password against a stored hash.
///
/// Malformed hashes are reported as an error rather than a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    match password_auth::verify_password(password, hash) {
        Ok(()) => Ok(true),
        Err(password_auth::VerifyError::PasswordInvalid) => Ok(false),
        Err(e) => Err(Error::Auth(AuthError::PasswordHashError(e.to_string()))),
    }
}

/// Service for login with per-address throttling
pub struct AuthService<U: UserRepository> {
    users: Arc<U>,
    limiter: Arc<LoginAttemptLimiter>,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(users: Arc<U>, limiter: Arc<LoginAttemptLimiter>) -> Self {
        Self { users, limiter }
    }

    pub fn limiter(&self) -> &Arc<LoginAttemptLimiter> {
        &self.limiter
    }

    /// Authenticate `nom_utilisateur` from `address`.
    ///
    /// The block check always runs before any credential lookup. Storage errors
    /// propagate and are not counted as failed attempts.
    pub async fn login(
        &self,
        address: &str,
        nom_utilisateur: &str,
        password: &str,
    ) -> Result<LoginOutcome, Error> {
        let status = self.limiter.check_blocked(address);
        if status.blocked {
            tracing::debug!(address = %address, "Login refused, address blocked");
            return Ok(LoginOutcome::Blocked {
                retry_after_seconds: status.retry_after_seconds,
            });
        }

        match self.authenticate(nom_utilisateur, password).await {
            Ok(user) => {
                self.limiter.clear_on_success(address);
                self.users.touch_last_login(user.id).await?;
                tracing::info!(user_id = user.id, address = %address, "User logged in");
                Ok(LoginOutcome::Success(user))
            }
            Err(e) if e.is_auth_error() => {
                let outcome = self.limiter.record_failure(address);
                if outcome.blocked {
                    Ok(LoginOutcome::Blocked {
                        retry_after_seconds: outcome.retry_after_seconds,
                    })
                } else {
                    Ok(LoginOutcome::Rejected {
                        remaining_attempts: outcome.remaining_attempts,
                    })
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Verify credentials without touching the limiter.
    pub async fn authenticate(
        &self,
        nom_utilisateur: &str,
        password: &str,
    ) -> Result<Utilisateur, Error> {
        let credentials = self
            .users
            .find_credentials(nom_utilisateur)
            .await?
            .ok_or(Error::Auth(AuthError::InvalidCredentials))?;

        if !verify_password(password, &credentials.password_hash)? {
            return Err(Error::Auth(AuthError::InvalidCredentials));
        }

        if !credentials.user.actif {
            return Err(Error::Auth(AuthError::InactiveUser));
        }

        Ok(credentials.user)
    }
}
