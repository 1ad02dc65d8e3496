use crate::storage_error;
use ade_core::{
    Error,
    kpi::{KpiFilter, KpiKey, KpiMeasures, KpiRecord, KpiSummary},
    repositories::KpiRepository,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

pub struct SqliteKpiRepository {
    pool: SqlitePool,
}

impl SqliteKpiRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteMeasures {
    nb_relances_envoyees: i64,
    mt_relances_envoyees: f64,
    nb_relances_reglees: i64,
    mt_relances_reglees: f64,
    nb_mises_en_demeure_envoyees: i64,
    mt_mises_en_demeure_envoyees: f64,
    nb_mises_en_demeure_reglees: i64,
    mt_mises_en_demeure_reglees: f64,
    nb_dossiers_juridiques: i64,
    mt_dossiers_juridiques: f64,
    nb_coupures: i64,
    mt_coupures: f64,
    nb_retablissements: i64,
    mt_retablissements: f64,
    encaissement_journalier_global: f64,
}

impl From<SqliteMeasures> for KpiMeasures {
    fn from(row: SqliteMeasures) -> Self {
        KpiMeasures {
            nb_relances_envoyees: row.nb_relances_envoyees,
            mt_relances_envoyees: row.mt_relances_envoyees,
            nb_relances_reglees: row.nb_relances_reglees,
            mt_relances_reglees: row.mt_relances_reglees,
            nb_mises_en_demeure_envoyees: row.nb_mises_en_demeure_envoyees,
            mt_mises_en_demeure_envoyees: row.mt_mises_en_demeure_envoyees,
            nb_mises_en_demeure_reglees: row.nb_mises_en_demeure_reglees,
            mt_mises_en_demeure_reglees: row.mt_mises_en_demeure_reglees,
            nb_dossiers_juridiques: row.nb_dossiers_juridiques,
            mt_dossiers_juridiques: row.mt_dossiers_juridiques,
            nb_coupures: row.nb_coupures,
            mt_coupures: row.mt_coupures,
            nb_retablissements: row.nb_retablissements,
            mt_retablissements: row.mt_retablissements,
            encaissement_journalier_global: row.encaissement_journalier_global,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteKpi {
    date_kpi: NaiveDate,
    agence_id: i64,
    code_type: String,
    #[sqlx(flatten)]
    measures: SqliteMeasures,
}

impl From<SqliteKpi> for KpiRecord {
    fn from(row: SqliteKpi) -> Self {
        KpiRecord {
            key: KpiKey {
                date_kpi: row.date_kpi,
                agence_id: row.agence_id,
                code_type: row.code_type,
            },
            measures: row.measures.into(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteSummary {
    nombre_lignes: i64,
    #[sqlx(flatten)]
    totals: SqliteMeasures,
}

const COLUMNS: &str = r#"
    DateKPI AS date_kpi,
    FK_Agence AS agence_id,
    FK_Categorie AS code_type,
    Nb_RelancesEnvoyees AS nb_relances_envoyees,
    Mt_RelancesEnvoyees AS mt_relances_envoyees,
    Nb_RelancesReglees AS nb_relances_reglees,
    Mt_RelancesReglees AS mt_relances_reglees,
    Nb_MisesEnDemeure_Envoyees AS nb_mises_en_demeure_envoyees,
    Mt_MisesEnDemeure_Envoyees AS mt_mises_en_demeure_envoyees,
    Nb_MisesEnDemeure_Reglees AS nb_mises_en_demeure_reglees,
    Mt_MisesEnDemeure_Reglees AS mt_mises_en_demeure_reglees,
    Nb_Dossiers_Juridiques AS nb_dossiers_juridiques,
    Mt_Dossiers_Juridiques AS mt_dossiers_juridiques,
    Nb_Coupures AS nb_coupures,
    Mt_Coupures AS mt_coupures,
    Nb_Retablissements AS nb_retablissements,
    Mt_Retablissements AS mt_retablissements,
    Encaissement_Journalier_Global AS encaissement_journalier_global
"#;

const TOTALS: &str = r#"
    COUNT(*) AS nombre_lignes,
    CAST(COALESCE(SUM(Nb_RelancesEnvoyees), 0) AS INTEGER) AS nb_relances_envoyees,
    CAST(COALESCE(SUM(Mt_RelancesEnvoyees), 0) AS REAL) AS mt_relances_envoyees,
    CAST(COALESCE(SUM(Nb_RelancesReglees), 0) AS INTEGER) AS nb_relances_reglees,
    CAST(COALESCE(SUM(Mt_RelancesReglees), 0) AS REAL) AS mt_relances_reglees,
    CAST(COALESCE(SUM(Nb_MisesEnDemeure_Envoyees), 0) AS INTEGER) AS nb_mises_en_demeure_envoyees,
    CAST(COALESCE(SUM(Mt_MisesEnDemeure_Envoyees), 0) AS REAL) AS mt_mises_en_demeure_envoyees,
    CAST(COALESCE(SUM(Nb_MisesEnDemeure_Reglees), 0) AS INTEGER) AS nb_mises_en_demeure_reglees,
    CAST(COALESCE(SUM(Mt_MisesEnDemeure_Reglees), 0) AS REAL) AS mt_mises_en_demeure_reglees,
    CAST(COALESCE(SUM(Nb_Dossiers_Juridiques), 0) AS INTEGER) AS nb_dossiers_juridiques,
    CAST(COALESCE(SUM(Mt_Dossiers_Juridiques), 0) AS REAL) AS mt_dossiers_juridiques,
    CAST(COALESCE(SUM(Nb_Coupures), 0) AS INTEGER) AS nb_coupures,
    CAST(COALESCE(SUM(Mt_Coupures), 0) AS REAL) AS mt_coupures,
    CAST(COALESCE(SUM(Nb_Retablissements), 0) AS INTEGER) AS nb_retablissements,
    CAST(COALESCE(SUM(Mt_Retablissements), 0) AS REAL) AS mt_retablissements,
    CAST(COALESCE(SUM(Encaissement_Journalier_Global), 0) AS REAL) AS encaissement_journalier_global
"#;

const FILTER: &str = r#"
    WHERE (?1 IS NULL OR FK_Agence = ?1)
      AND (?2 IS NULL OR DateKPI >= ?2)
      AND (?3 IS NULL OR DateKPI <= ?3)
      AND (?4 IS NULL OR FK_Categorie = ?4)
"#;

#[async_trait]
impl KpiRepository for SqliteKpiRepository {
    async fn list(&self, filter: &KpiFilter) -> Result<Vec<KpiRecord>, Error> {
        let rows = sqlx::query_as::<_, SqliteKpi>(&format!(
            "SELECT {COLUMNS} FROM FAIT_KPI_ADE {FILTER} ORDER BY DateKPI DESC, FK_Agence, FK_Categorie"
        ))
        .bind(filter.agence_id)
        .bind(filter.date_debut)
        .bind(filter.date_fin)
        .bind(&filter.code_type)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to list KPI rows"))?;

        Ok(rows.into_iter().map(KpiRecord::from).collect())
    }

    async fn find(&self, key: &KpiKey) -> Result<Option<KpiRecord>, Error> {
        let row = sqlx::query_as::<_, SqliteKpi>(&format!(
            r#"
            SELECT {COLUMNS} FROM FAIT_KPI_ADE
            WHERE DateKPI = ?1 AND FK_Agence = ?2 AND FK_Categorie = ?3
            "#
        ))
        .bind(key.date_kpi)
        .bind(key.agence_id)
        .bind(&key.code_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to find KPI row"))?;

        Ok(row.map(KpiRecord::from))
    }

    async fn create(&self, record: &KpiRecord) -> Result<KpiRecord, Error> {
        let m = &record.measures;
        let row = sqlx::query_as::<_, SqliteKpi>(&format!(
            r#"
            INSERT INTO FAIT_KPI_ADE (
                DateKPI, FK_Agence, FK_Categorie,
                Nb_RelancesEnvoyees, Mt_RelancesEnvoyees,
                Nb_RelancesReglees, Mt_RelancesReglees,
                Nb_MisesEnDemeure_Envoyees, Mt_MisesEnDemeure_Envoyees,
                Nb_MisesEnDemeure_Reglees, Mt_MisesEnDemeure_Reglees,
                Nb_Dossiers_Juridiques, Mt_Dossiers_Juridiques,
                Nb_Coupures, Mt_Coupures,
                Nb_Retablissements, Mt_Retablissements,
                Encaissement_Journalier_Global
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(record.key.date_kpi)
        .bind(record.key.agence_id)
        .bind(&record.key.code_type)
        .bind(m.nb_relances_envoyees)
        .bind(m.mt_relances_envoyees)
        .bind(m.nb_relances_reglees)
        .bind(m.mt_relances_reglees)
        .bind(m.nb_mises_en_demeure_envoyees)
        .bind(m.mt_mises_en_demeure_envoyees)
        .bind(m.nb_mises_en_demeure_reglees)
        .bind(m.mt_mises_en_demeure_reglees)
        .bind(m.nb_dossiers_juridiques)
        .bind(m.mt_dossiers_juridiques)
        .bind(m.nb_coupures)
        .bind(m.mt_coupures)
        .bind(m.nb_retablissements)
        .bind(m.mt_retablissements)
        .bind(m.encaissement_journalier_global)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to record KPI row"))?;

        Ok(row.into())
    }

    async fn update(
        &self,
        key: &KpiKey,
        measures: &KpiMeasures,
    ) -> Result<Option<KpiRecord>, Error> {
        let m = measures;
        let row = sqlx::query_as::<_, SqliteKpi>(&format!(
            r#"
            UPDATE FAIT_KPI_ADE
            SET Nb_RelancesEnvoyees = ?4, Mt_RelancesEnvoyees = ?5,
                Nb_RelancesReglees = ?6, Mt_RelancesReglees = ?7,
                Nb_MisesEnDemeure_Envoyees = ?8, Mt_MisesEnDemeure_Envoyees = ?9,
                Nb_MisesEnDemeure_Reglees = ?10, Mt_MisesEnDemeure_Reglees = ?11,
                Nb_Dossiers_Juridiques = ?12, Mt_Dossiers_Juridiques = ?13,
                Nb_Coupures = ?14, Mt_Coupures = ?15,
                Nb_Retablissements = ?16, Mt_Retablissements = ?17,
                Encaissement_Journalier_Global = ?18
            WHERE DateKPI = ?1 AND FK_Agence = ?2 AND FK_Categorie = ?3
            RETURNING {COLUMNS}
            "#
        ))
        .bind(key.date_kpi)
        .bind(key.agence_id)
        .bind(&key.code_type)
        .bind(m.nb_relances_envoyees)
        .bind(m.mt_relances_envoyees)
        .bind(m.nb_relances_reglees)
        .bind(m.mt_relances_reglees)
        .bind(m.nb_mises_en_demeure_envoyees)
        .bind(m.mt_mises_en_demeure_envoyees)
        .bind(m.nb_mises_en_demeure_reglees)
        .bind(m.mt_mises_en_demeure_reglees)
        .bind(m.nb_dossiers_juridiques)
        .bind(m.mt_dossiers_juridiques)
        .bind(m.nb_coupures)
        .bind(m.mt_coupures)
        .bind(m.nb_retablissements)
        .bind(m.mt_retablissements)
        .bind(m.encaissement_journalier_global)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to update KPI row"))?;

        Ok(row.map(KpiRecord::from))
    }

    async fn delete(&self, key: &KpiKey) -> Result<bool, Error> {
        let result = sqlx::query(
            "DELETE FROM FAIT_KPI_ADE WHERE DateKPI = ?1 AND FK_Agence = ?2 AND FK_Categorie = ?3",
        )
        .bind(key.date_kpi)
        .bind(key.agence_id)
        .bind(&key.code_type)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to delete KPI row"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn summarize(&self, filter: &KpiFilter) -> Result<KpiSummary, Error> {
        let row = sqlx::query_as::<_, SqliteSummary>(&format!(
            "SELECT {TOTALS} FROM FAIT_KPI_ADE {FILTER}"
        ))
        .bind(filter.agence_id)
        .bind(filter.date_debut)
        .bind(filter.date_fin)
        .bind(&filter.code_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to summarize KPI rows"))?;

        Ok(KpiSummary {
            nombre_lignes: row.nombre_lignes,
            totals: row.totals.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::migrated_provider;
    use ade_core::{
        agence::AgenceInput,
        categorie::CategorieInput,
        centre::CentreInput,
        repositories::{
            AgenceRepository, AgenceRepositoryProvider, CategorieRepository,
            CategorieRepositoryProvider, CentreRepository, CentreRepositoryProvider,
            KpiRepositoryProvider,
        },
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed(provider: &crate::SqliteRepositoryProvider) -> i64 {
        let centre = provider
            .centre()
            .create(&CentreInput {
                nom_centre: "Centre".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        for (code, libelle) in [("ORD", "Ordinaires"), ("ADM", "Administrations")] {
            provider
                .categorie()
                .create(&CategorieInput {
                    code_type: code.to_string(),
                    libelle: libelle.to_string(),
                })
                .await
                .unwrap();
        }
        provider
            .agence()
            .create(&AgenceInput {
                nom_agence: "Agence".to_string(),
                centre_id: Some(centre.id),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    fn record(agence_id: i64, day: NaiveDate, code: &str, relances: i64, encaissement: f64) -> KpiRecord {
        KpiRecord {
            key: KpiKey {
                date_kpi: day,
                agence_id,
                code_type: code.to_string(),
            },
            measures: KpiMeasures {
                nb_relances_envoyees: relances,
                mt_relances_envoyees: relances as f64 * 1000.0,
                encaissement_journalier_global: encaissement,
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_create_find_and_duplicate() {
        let provider = migrated_provider().await;
        let agence_id = seed(&provider).await;
        let repo = provider.kpi();

        let created = repo
            .create(&record(agence_id, date(2025, 6, 2), "ORD", 10, 2500.5))
            .await
            .unwrap();
        assert_eq!(created.measures.nb_relances_envoyees, 10);
        assert_eq!(created.measures.encaissement_journalier_global, 2500.5);

        let found = repo.find(&created.key).await.unwrap().unwrap();
        assert_eq!(found, created);

        let err = repo
            .create(&record(agence_id, date(2025, 6, 2), "ORD", 1, 0.0))
            .await
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let provider = migrated_provider().await;
        let agence_id = seed(&provider).await;

        let err = provider
            .kpi()
            .create(&record(agence_id, date(2025, 6, 2), "ZZZ", 1, 0.0))
            .await
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[tokio::test]
    async fn test_list_and_summarize_with_filters() {
        let provider = migrated_provider().await;
        let agence_id = seed(&provider).await;
        let repo = provider.kpi();

        repo.create(&record(agence_id, date(2025, 6, 1), "ORD", 10, 1000.0))
            .await
            .unwrap();
        repo.create(&record(agence_id, date(2025, 6, 2), "ADM", 5, 500.0))
            .await
            .unwrap();
        repo.create(&record(agence_id, date(2025, 7, 1), "ORD", 7, 700.0))
            .await
            .unwrap();

        let june = KpiFilter {
            agence_id: Some(agence_id),
            date_debut: Some(date(2025, 6, 1)),
            date_fin: Some(date(2025, 6, 30)),
            code_type: None,
        };
        let rows = repo.list(&june).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key.date_kpi, date(2025, 6, 2));

        let summary = repo.summarize(&june).await.unwrap();
        assert_eq!(summary.nombre_lignes, 2);
        assert_eq!(summary.totals.nb_relances_envoyees, 15);
        assert_eq!(summary.totals.encaissement_journalier_global, 1500.0);

        let ord = KpiFilter {
            code_type: Some("ORD".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.summarize(&ord).await.unwrap().totals.nb_relances_envoyees, 17);

        let empty = KpiFilter {
            agence_id: Some(9999),
            ..Default::default()
        };
        let summary = repo.summarize(&empty).await.unwrap();
        assert_eq!(summary.nombre_lignes, 0);
        assert_eq!(summary.totals, KpiMeasures::default());
    }

    #[tokio::test]
    async fn test_update_and_delete_by_key() {
        let provider = migrated_provider().await;
        let agence_id = seed(&provider).await;
        let repo = provider.kpi();

        let created = repo
            .create(&record(agence_id, date(2025, 6, 3), "ORD", 3, 0.0))
            .await
            .unwrap();

        let measures = KpiMeasures {
            nb_coupures: 4,
            ..Default::default()
        };
        let updated = repo.update(&created.key, &measures).await.unwrap().unwrap();
        assert_eq!(updated.measures, measures);

        assert!(repo.delete(&created.key).await.unwrap());
        assert!(repo.update(&created.key, &measures).await.unwrap().is_none());
    }
}
