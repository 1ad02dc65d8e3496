//! Centres, the top level of the Centre → Agence → Commune hierarchy.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Centre {
    pub id: i64,
    pub nom_centre: String,
    pub adresse: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
}

/// Fields accepted when creating or replacing a centre.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentreInput {
    #[serde(default)]
    pub nom_centre: String,
    pub adresse: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
}
