use ade_core::{KpiFilter, Utilisateur};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: Utilisateur,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of `PUT /api/categories/{code}`; the code itself cannot change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorieUpdateRequest {
    #[serde(default)]
    pub libelle: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgenceQuery {
    pub centre_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuneQuery {
    pub agence_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiQuery {
    pub agence_id: Option<i64>,
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
    pub code_type: Option<String>,
}

impl From<KpiQuery> for KpiFilter {
    fn from(query: KpiQuery) -> Self {
        KpiFilter {
            agence_id: query.agence_id,
            date_debut: query.date_debut,
            date_fin: query.date_fin,
            code_type: query.code_type.filter(|code| !code.trim().is_empty()),
        }
    }
}

/// Address a login attempt is throttled under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddress(pub String);
