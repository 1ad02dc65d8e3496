//! Agences: service-delivery branches, the unit KPIs and objectives are tracked against.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agence {
    pub id: i64,
    pub nom_agence: String,
    pub adresse: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub fax: Option<String>,
    pub nom_banque: Option<String>,
    pub compte_bancaire: Option<String>,
    pub nif: Option<String>,
    pub nc: Option<String>,
    pub centre_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgenceInput {
    #[serde(default)]
    pub nom_agence: String,
    pub adresse: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub fax: Option<String>,
    pub nom_banque: Option<String>,
    pub compte_bancaire: Option<String>,
    pub nif: Option<String>,
    pub nc: Option<String>,
    pub centre_id: Option<i64>,
}

/// Number of agences attached to each centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentreAgenceCount {
    pub centre_id: i64,
    pub nom_centre: String,
    pub nombre_agences: i64,
}
