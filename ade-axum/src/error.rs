use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use ade_core::{
    Error,
    error::{AuthError, PermissionError, StorageError},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Trop de tentatives de connexion")]
    RateLimited { retry_after_sec: i64 },

    #[error("Identifiants invalides")]
    InvalidCredentials { remaining_attempts: u32 },

    #[error("Règles temporelles violées")]
    TemporalRules(Vec<String>),

    #[error("Missing role header")]
    MissingRole,

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Temporal(violation) => ApiError::TemporalRules(violation.errors),
            Error::Validation(e) => ApiError::BadRequest(e.to_string()),
            Error::Permission(e) => ApiError::Forbidden(e.to_string()),
            Error::Storage(StorageError::NotFound) => ApiError::NotFound,
            Error::Storage(StorageError::Constraint(msg)) => ApiError::Conflict(msg),
            Error::Auth(AuthError::PasswordHashError(msg)) => ApiError::Internal(msg),
            Error::Auth(_) => ApiError::InvalidCredentials {
                remaining_attempts: 0,
            },
            Error::Storage(e) => {
                tracing::error!(error = %e, "Storage failure while handling request");
                ApiError::Internal("Erreur serveur".to_string())
            }
        }
    }
}

impl From<PermissionError> for ApiError {
    fn from(err: PermissionError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::RateLimited { retry_after_sec } => {
                let body = Json(json!({
                    "error": "Trop de tentatives de connexion. Réessayez plus tard.",
                    "retryAfterSec": retry_after_sec,
                }));
                let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_sec));
                response
            }
            ApiError::InvalidCredentials { remaining_attempts } => {
                let body = Json(json!({
                    "error": "Nom d'utilisateur ou mot de passe incorrect",
                    "remainingAttempts": remaining_attempts,
                }));
                (StatusCode::UNAUTHORIZED, body).into_response()
            }
            ApiError::TemporalRules(errors) => {
                let body = Json(json!({
                    "message": "Règles temporelles violées",
                    "errors": errors,
                }));
                (StatusCode::FORBIDDEN, body).into_response()
            }
            ApiError::MissingRole => {
                error_body(StatusCode::UNAUTHORIZED, "Rôle utilisateur requis".to_string())
            }
            ApiError::InvalidRole(role) => {
                error_body(StatusCode::BAD_REQUEST, format!("Rôle inconnu : {role}"))
            }
            ApiError::Forbidden(msg) => error_body(StatusCode::FORBIDDEN, msg),
            ApiError::BadRequest(msg) => error_body(StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound => {
                error_body(StatusCode::NOT_FOUND, "Ressource introuvable".to_string())
            }
            ApiError::Conflict(msg) => error_body(StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => error_body(StatusCode::INTERNAL_SERVER_ERROR, msg),
        }
    }
}

fn error_body(status: StatusCode, error_message: String) -> Response {
    let body = Json(json!({
        "error": error_message,
        "code": status.as_u16()
    }));

    (status, body).into_response()
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ade_core::{TemporalViolation, error::ValidationError};

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited {
            retry_after_sec: 900,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "900");
    }

    #[test]
    fn test_core_error_mapping() {
        let status = |err: Error| ApiError::from(err).into_response().status();

        assert_eq!(
            status(Error::Storage(StorageError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(Error::Storage(StorageError::Constraint("fk".to_string()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(Error::Storage(StorageError::Database("down".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(Error::Validation(ValidationError::MissingField(
                "nomCentre".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(Error::Temporal(TemporalViolation {
                errors: vec!["trop tôt".to_string()]
            })),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_role_errors() {
        assert_eq!(
            ApiError::MissingRole.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidRole("admin".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
