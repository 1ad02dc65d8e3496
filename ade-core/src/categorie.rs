use serde::{Deserialize, Serialize};

/// Customer category KPI rows are broken down by, keyed by a short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categorie {
    pub code_type: String,
    pub libelle: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorieInput {
    #[serde(default)]
    pub code_type: String,
    #[serde(default)]
    pub libelle: String,
}
