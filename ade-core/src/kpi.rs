//! Daily KPI realizations per agence and customer category (`FAIT_KPI_ADE`).
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    validation::{require_non_negative_amount, require_non_negative_count},
};

/// Counts (`nb_*`) and amounts (`mt_*`) recorded for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KpiMeasures {
    pub nb_relances_envoyees: i64,
    pub mt_relances_envoyees: f64,
    pub nb_relances_reglees: i64,
    pub mt_relances_reglees: f64,
    pub nb_mises_en_demeure_envoyees: i64,
    pub mt_mises_en_demeure_envoyees: f64,
    pub nb_mises_en_demeure_reglees: i64,
    pub mt_mises_en_demeure_reglees: f64,
    pub nb_dossiers_juridiques: i64,
    pub mt_dossiers_juridiques: f64,
    pub nb_coupures: i64,
    pub mt_coupures: f64,
    pub nb_retablissements: i64,
    pub mt_retablissements: f64,
    pub encaissement_journalier_global: f64,
}

impl KpiMeasures {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let counts = [
            ("nbRelancesEnvoyees", self.nb_relances_envoyees),
            ("nbRelancesReglees", self.nb_relances_reglees),
            ("nbMisesEnDemeureEnvoyees", self.nb_mises_en_demeure_envoyees),
            ("nbMisesEnDemeureReglees", self.nb_mises_en_demeure_reglees),
            ("nbDossiersJuridiques", self.nb_dossiers_juridiques),
            ("nbCoupures", self.nb_coupures),
            ("nbRetablissements", self.nb_retablissements),
        ];
        for (field, value) in counts {
            require_non_negative_count(field, value)?;
        }

        let amounts = [
            ("mtRelancesEnvoyees", self.mt_relances_envoyees),
            ("mtRelancesReglees", self.mt_relances_reglees),
            ("mtMisesEnDemeureEnvoyees", self.mt_mises_en_demeure_envoyees),
            ("mtMisesEnDemeureReglees", self.mt_mises_en_demeure_reglees),
            ("mtDossiersJuridiques", self.mt_dossiers_juridiques),
            ("mtCoupures", self.mt_coupures),
            ("mtRetablissements", self.mt_retablissements),
            ("encaissementJournalierGlobal", self.encaissement_journalier_global),
        ];
        for (field, value) in amounts {
            require_non_negative_amount(field, value)?;
        }

        Ok(())
    }
}

/// Identity of a KPI row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiKey {
    pub date_kpi: NaiveDate,
    pub agence_id: i64,
    pub code_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiRecord {
    #[serde(flatten)]
    pub key: KpiKey,
    #[serde(flatten)]
    pub measures: KpiMeasures,
}

/// KPI row as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiInput {
    #[serde(default)]
    pub date_kpi: String,
    pub agence_id: Option<i64>,
    #[serde(default)]
    pub code_type: String,
    #[serde(flatten)]
    pub measures: KpiMeasures,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KpiFilter {
    pub agence_id: Option<i64>,
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
    pub code_type: Option<String>,
}

/// Totals of every indicator over a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub nombre_lignes: i64,
    #[serde(flatten)]
    pub totals: KpiMeasures,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measures_validate_rejects_negative_values() {
        let measures = KpiMeasures {
            nb_coupures: -1,
            ..Default::default()
        };
        assert!(measures.validate().is_err());

        let measures = KpiMeasures {
            mt_relances_reglees: -5.0,
            ..Default::default()
        };
        assert!(measures.validate().is_err());

        assert!(KpiMeasures::default().validate().is_ok());
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = KpiRecord {
            key: KpiKey {
                date_kpi: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                agence_id: 3,
                code_type: "MEN".to_string(),
            },
            measures: KpiMeasures {
                nb_coupures: 7,
                ..Default::default()
            },
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["dateKpi"], "2025-06-02");
        assert_eq!(value["agenceId"], 3);
        assert_eq!(value["codeType"], "MEN");
        assert_eq!(value["nbCoupures"], 7);
    }
}
