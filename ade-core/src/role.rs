//! User roles and the capabilities they grant.
//!
//! Roles travel over the wire as the strings `Administrateur` and `Standard`.
//! They are decoded once at the request boundary; everything past that point
//! works with [`Role`] and asks it for a [`Capability`].
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{PermissionError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Administrateur")]
    Admin,
    #[serde(rename = "Standard")]
    Standard,
}

/// An action gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewData,
    ManageReferenceData,
    ManageUsers,
    ManageObjectives,
    RecordKpi,
    DeleteKpi,
}

impl Capability {
    pub fn description(&self) -> &'static str {
        match self {
            Capability::ViewData => "view data",
            Capability::ManageReferenceData => "manage reference data",
            Capability::ManageUsers => "manage users",
            Capability::ManageObjectives => "manage objectives",
            Capability::RecordKpi => "record KPI values",
            Capability::DeleteKpi => "delete KPI values",
        }
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Administrateur",
            Role::Standard => "Standard",
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        match (self, capability) {
            (
                Role::Admin,
                Capability::ViewData
                | Capability::ManageReferenceData
                | Capability::ManageUsers
                | Capability::ManageObjectives
                | Capability::RecordKpi
                | Capability::DeleteKpi,
            ) => true,
            (Role::Standard, Capability::ViewData | Capability::RecordKpi) => true,
            (
                Role::Standard,
                Capability::ManageReferenceData
                | Capability::ManageUsers
                | Capability::ManageObjectives
                | Capability::DeleteKpi,
            ) => false,
        }
    }

    /// Like [`Role::can`] but returns a permission error when denied.
    pub fn require(&self, capability: Capability) -> Result<(), PermissionError> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(PermissionError::Forbidden {
                role: self.as_str(),
                capability: capability.description(),
            })
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Administrateur" => Ok(Role::Admin),
            "Standard" => Ok(Role::Standard),
            other => Err(ValidationError::InvalidRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
