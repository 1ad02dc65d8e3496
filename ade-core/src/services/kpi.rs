use crate::{
    Error,
    error::ValidationError,
    kpi::{KpiFilter, KpiInput, KpiKey, KpiMeasures, KpiRecord, KpiSummary},
    repositories::KpiRepository,
    services::{categorie::CODE_TYPE_MAX_LEN, deleted, found},
    validation::{parse_date, require_text},
};
use chrono::{Local, NaiveDate};
use std::sync::Arc;

/// Service for daily KPI rows
pub struct KpiService<R: KpiRepository> {
    repository: Arc<R>,
}

impl<R: KpiRepository> KpiService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, filter: &KpiFilter) -> Result<Vec<KpiRecord>, Error> {
        validate_filter(filter)?;
        self.repository.list(filter).await
    }

    pub async fn get(&self, key: &KpiKey) -> Result<KpiRecord, Error> {
        found(self.repository.find(key).await?)
    }

    pub async fn create(&self, input: &KpiInput) -> Result<KpiRecord, Error> {
        self.create_at(input, Local::now().date_naive()).await
    }

    /// Record a KPI row; `dateKpi` may not be later than `today`.
    pub async fn create_at(&self, input: &KpiInput, today: NaiveDate) -> Result<KpiRecord, Error> {
        let record = normalize(input, today)?;
        let created = self.repository.create(&record).await?;
        tracing::debug!(
            date_kpi = %created.key.date_kpi,
            agence_id = created.key.agence_id,
            code_type = %created.key.code_type,
            "KPI recorded"
        );
        Ok(created)
    }

    /// Replace the measures of an existing row. The key cannot change.
    pub async fn update(&self, key: &KpiKey, measures: &KpiMeasures) -> Result<KpiRecord, Error> {
        measures.validate()?;
        found(self.repository.update(key, measures).await?)
    }

    pub async fn delete(&self, key: &KpiKey) -> Result<(), Error> {
        deleted(self.repository.delete(key).await?)
    }

    pub async fn summary(&self, filter: &KpiFilter) -> Result<KpiSummary, Error> {
        validate_filter(filter)?;
        self.repository.summarize(filter).await
    }
}

fn validate_filter(filter: &KpiFilter) -> Result<(), ValidationError> {
    if let (Some(debut), Some(fin)) = (filter.date_debut, filter.date_fin) {
        if fin < debut {
            return Err(ValidationError::InvalidDate(
                "dateFin must not be before dateDebut".to_string(),
            ));
        }
    }
    Ok(())
}

fn normalize(input: &KpiInput, today: NaiveDate) -> Result<KpiRecord, ValidationError> {
    let date_kpi = parse_date("dateKpi", &input.date_kpi)?;
    if date_kpi > today {
        return Err(ValidationError::InvalidDate(format!(
            "dateKpi {date_kpi} is in the future"
        )));
    }

    let agence_id = input
        .agence_id
        .ok_or_else(|| ValidationError::MissingField("agenceId".to_string()))?;
    let code_type = require_text("codeType", &input.code_type, CODE_TYPE_MAX_LEN)?;

    input.measures.validate()?;

    Ok(KpiRecord {
        key: KpiKey {
            date_kpi,
            agence_id,
            code_type,
        },
        measures: input.measures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(date_kpi: &str) -> KpiInput {
        KpiInput {
            date_kpi: date_kpi.to_string(),
            agence_id: Some(2),
            code_type: "ORD".to_string(),
            measures: KpiMeasures {
                nb_relances_envoyees: 12,
                mt_relances_envoyees: 34_000.5,
                ..Default::default()
            },
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_normalize_accepts_today_and_past() {
        let record = normalize(&input("2025-06-15"), today()).unwrap();
        assert_eq!(record.key.agence_id, 2);
        assert_eq!(record.key.code_type, "ORD");
        assert_eq!(record.measures.nb_relances_envoyees, 12);

        assert!(normalize(&input("2024-12-31"), today()).is_ok());
    }

    #[test]
    fn test_normalize_rejects_future_date() {
        let err = normalize(&input("2025-06-16"), today()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDate(_)));
    }

    #[test]
    fn test_normalize_rejects_negative_and_missing_fields() {
        let mut negative = input("2025-06-01");
        negative.measures.nb_coupures = -1;
        assert!(normalize(&negative, today()).is_err());

        let mut no_agence = input("2025-06-01");
        no_agence.agence_id = None;
        assert!(normalize(&no_agence, today()).is_err());

        let mut long_code = input("2025-06-01");
        long_code.code_type = "ABCDEFGHIJK".to_string();
        assert!(normalize(&long_code, today()).is_err());
    }

    #[test]
    fn test_filter_rejects_inverted_range() {
        let filter = KpiFilter {
            date_debut: NaiveDate::from_ymd_opt(2025, 6, 30),
            date_fin: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..Default::default()
        };
        assert!(validate_filter(&filter).is_err());
    }
}
