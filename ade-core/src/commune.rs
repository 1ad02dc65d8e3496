use serde::{Deserialize, Serialize};

/// A municipality served by an agence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commune {
    pub id: i64,
    pub nom_commune: String,
    pub agence_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuneInput {
    #[serde(default)]
    pub nom_commune: String,
    pub agence_id: Option<i64>,
}
