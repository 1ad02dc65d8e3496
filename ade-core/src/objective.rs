//! Periodic objectives set by administrators for an agence.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objectif {
    pub id: i64,
    pub agence_id: i64,
    pub titre: Option<String>,
    pub description: Option<String>,
    pub date_debut: NaiveDate,
    pub date_fin: NaiveDate,
    #[serde(flatten)]
    pub targets: ObjectiveTargets,
    pub date_creation: DateTime<Utc>,
    pub cree_par: Option<i64>,
    pub est_actif: bool,
}

/// Target values of an objective. Missing values default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectiveTargets {
    pub obj_encaissement: f64,
    pub obj_relances: i64,
    pub obj_mises_en_demeure: i64,
    pub obj_dossiers_juridiques: i64,
    pub obj_coupures: i64,
}

/// Objective as submitted by a client; dates are parsed by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectifInput {
    pub agence_id: Option<i64>,
    pub titre: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub date_debut: String,
    #[serde(default)]
    pub date_fin: String,
    #[serde(flatten)]
    pub targets: ObjectiveTargets,
    pub cree_par: Option<i64>,
    pub est_actif: Option<bool>,
}

/// Validated objective handed to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewObjectif {
    pub agence_id: i64,
    pub titre: Option<String>,
    pub description: Option<String>,
    pub date_debut: NaiveDate,
    pub date_fin: NaiveDate,
    pub targets: ObjectiveTargets,
    pub cree_par: Option<i64>,
    pub est_actif: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveFilter {
    pub agence_id: Option<i64>,
    /// With `mois`, keeps objectives whose period overlaps that month.
    pub annee: Option<i32>,
    pub mois: Option<u32>,
    pub actif: Option<bool>,
}

/// Realized value of one indicator against its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorProgress {
    pub indicateur: String,
    pub objectif: f64,
    pub realise: f64,
    /// Percentage rounded to two decimals; `None` when the target is zero.
    pub taux_realisation: Option<f64>,
}

impl IndicatorProgress {
    pub fn new(indicateur: &str, objectif: f64, realise: f64) -> Self {
        let taux_realisation = if objectif > 0.0 {
            Some((realise / objectif * 10_000.0).round() / 100.0)
        } else {
            None
        };

        Self {
            indicateur: indicateur.to_string(),
            objectif,
            realise,
            taux_realisation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveProgress {
    pub objectif: Objectif,
    pub indicateurs: Vec<IndicatorProgress>,
}
