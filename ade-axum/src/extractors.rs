use std::{convert::Infallible, net::SocketAddr};

use ade_core::{Capability, Role, resolve_client_address};
use axum::{
    RequestPartsExt,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

use crate::{error::ApiError, types::ClientAddress};

/// Header carrying the caller's role.
pub const ROLE_HEADER: &str = "x-user-role";

impl<S> FromRequestParts<S> for ClientAddress
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let forwarded_for = header("x-forwarded-for");
        let real_ip = header("x-real-ip");

        let remote = parts
            .extract::<ConnectInfo<SocketAddr>>()
            .await
            .ok()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(ClientAddress(resolve_client_address(
            forwarded_for.as_deref(),
            real_ip.as_deref(),
            remote,
        )))
    }
}

/// The caller's [`Role`], decoded from the `X-User-Role` header.
///
/// A missing header is rejected with 401 and an unknown value with 400, before
/// the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleHeader(pub Role);

impl RoleHeader {
    pub fn require(&self, capability: Capability) -> Result<(), ApiError> {
        self.0.require(capability).map_err(|e| {
            tracing::debug!(role = %self.0, capability = capability.description(), "Capability denied");
            ApiError::from(e)
        })
    }
}

impl<S> FromRequestParts<S> for RoleHeader
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ROLE_HEADER)
            .ok_or(ApiError::MissingRole)?
            .to_str()
            .map_err(|_| ApiError::InvalidRole("<non-ascii>".to_string()))?
            .trim();

        if value.is_empty() {
            return Err(ApiError::MissingRole);
        }

        let role = value
            .parse::<Role>()
            .map_err(|_| ApiError::InvalidRole(value.to_string()))?;

        Ok(RoleHeader(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn role_from(header: Option<&str>) -> Result<RoleHeader, ApiError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("X-User-Role", value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        RoleHeader::from_request_parts(&mut parts, &()).await
    }

    async fn address_from(headers: &[(&str, &str)]) -> String {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        ClientAddress::from_request_parts(&mut parts, &())
            .await
            .unwrap()
            .0
    }

    #[tokio::test]
    async fn test_role_header_decoding() {
        assert_eq!(
            role_from(Some("Administrateur")).await.unwrap(),
            RoleHeader(Role::Admin)
        );
        assert_eq!(
            role_from(Some("Standard")).await.unwrap(),
            RoleHeader(Role::Standard)
        );
        assert!(matches!(role_from(None).await, Err(ApiError::MissingRole)));
        assert!(matches!(
            role_from(Some("root")).await,
            Err(ApiError::InvalidRole(_))
        ));
    }

    #[tokio::test]
    async fn test_client_address_preference() {
        assert_eq!(
            address_from(&[
                ("X-Forwarded-For", "203.0.113.7, 10.0.0.1"),
                ("X-Real-IP", "198.51.100.2"),
            ])
            .await,
            "203.0.113.7"
        );
        assert_eq!(
            address_from(&[("X-Real-IP", "::ffff:198.51.100.2")]).await,
            "198.51.100.2"
        );
        assert_eq!(address_from(&[]).await, "unknown");
    }

    #[test]
    fn test_standard_role_cannot_manage_users() {
        let role = RoleHeader(Role::Standard);
        assert!(role.require(Capability::RecordKpi).is_ok());
        assert!(matches!(
            role.require(Capability::ManageUsers),
            Err(ApiError::Forbidden(_))
        ));
    }
}
