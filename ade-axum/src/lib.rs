//! # ADE Axum Integration
//!
//! HTTP surface of the ADE KPI administration backend: JSON routes under `/api`,
//! the [`ClientAddress`] and [`RoleHeader`] extractors, and the mapping from
//! domain errors to status codes in [`ApiError`].
//!
//! Callers identify their role with the `X-User-Role` header (`Administrateur`
//! or `Standard`). Login attempts are throttled per client address; when the
//! server runs behind a proxy the address is taken from `X-Forwarded-For` or
//! `X-Real-IP`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::{net::SocketAddr, sync::Arc};
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
//!     let app = ade_axum::create_router(Arc::new(ade));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(
//!         listener,
//!         app.into_make_service_with_connect_info::<SocketAddr>(),
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```

mod error;
mod extractors;
mod routes;
mod types;

pub use error::{ApiError, Result};
pub use extractors::{ROLE_HEADER, RoleHeader};
pub use routes::{AppState, create_router};
pub use types::{
    AgenceQuery, CategorieUpdateRequest, ClientAddress, CommuneQuery, HealthResponse, KpiQuery,
    LoginRequest, LoginResponse, MessageResponse,
};
