//! Core domain for the ADE KPI administration backend
//!
//! This crate holds the reference data model (centres, agences, communes,
//! customer categories), user accounts and roles, periodic objectives and the
//! daily KPI realizations they are measured against.
//!
//! Storage backends implement the traits in [`repositories`]; the services in
//! [`services`] validate input and apply the business rules on top of them. Two
//! rules live outside any repository:
//!
//! - [`LoginAttemptLimiter`] throttles failed logins per client address.
//! - [`ObjectiveWindow`] keeps objectives within a sliding window of months
//!   around the current date.
pub mod address;
pub mod agence;
pub mod categorie;
pub mod centre;
pub mod commune;
pub mod error;
pub mod kpi;
pub mod objective;
pub mod period;
pub mod repositories;
pub mod role;
pub mod services;
pub mod user;
pub mod validation;

pub use address::{UNKNOWN_ADDRESS, normalize_address, resolve_client_address};
pub use agence::{Agence, AgenceInput, CentreAgenceCount};
pub use categorie::{Categorie, CategorieInput};
pub use centre::{Centre, CentreInput};
pub use commune::{Commune, CommuneInput};
pub use error::{Error, TemporalViolation};
pub use kpi::{KpiFilter, KpiInput, KpiKey, KpiMeasures, KpiRecord, KpiSummary};
pub use objective::{
    IndicatorProgress, NewObjectif, Objectif, ObjectifInput, ObjectiveFilter, ObjectiveProgress,
    ObjectiveTargets,
};
pub use period::{ObjectivePeriod, ObjectiveWindow, WindowCheck, validate_objective_period};
pub use repositories::RepositoryProvider;
pub use role::{Capability, Role};
pub use services::{
    BlockStatus, FailureOutcome, LoginAttemptLimiter, LoginLimitConfig, LoginOutcome,
};
pub use user::{Credentials, Utilisateur, UtilisateurInput, UtilisateurRecord};
