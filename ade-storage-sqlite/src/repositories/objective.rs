use crate::storage_error;
use ade_core::{
    Error,
    objective::{NewObjectif, Objectif, ObjectiveFilter, ObjectiveTargets},
    repositories::ObjectiveRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

pub struct SqliteObjectiveRepository {
    pool: SqlitePool,
}

impl SqliteObjectiveRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteObjectif {
    id: i64,
    agence_id: i64,
    titre: Option<String>,
    description: Option<String>,
    date_debut: NaiveDate,
    date_fin: NaiveDate,
    obj_encaissement: f64,
    obj_relances: i64,
    obj_mises_en_demeure: i64,
    obj_dossiers_juridiques: i64,
    obj_coupures: i64,
    date_creation: i64,
    cree_par: Option<i64>,
    est_actif: bool,
}

impl From<SqliteObjectif> for Objectif {
    fn from(row: SqliteObjectif) -> Self {
        Objectif {
            id: row.id,
            agence_id: row.agence_id,
            titre: row.titre,
            description: row.description,
            date_debut: row.date_debut,
            date_fin: row.date_fin,
            targets: ObjectiveTargets {
                obj_encaissement: row.obj_encaissement,
                obj_relances: row.obj_relances,
                obj_mises_en_demeure: row.obj_mises_en_demeure,
                obj_dossiers_juridiques: row.obj_dossiers_juridiques,
                obj_coupures: row.obj_coupures,
            },
            date_creation: DateTime::from_timestamp(row.date_creation, 0).unwrap_or_default(),
            cree_par: row.cree_par,
            est_actif: row.est_actif,
        }
    }
}

const COLUMNS: &str = r#"
    Objectif_ID AS id,
    FK_Agence AS agence_id,
    Titre AS titre,
    Description AS description,
    Date_Debut AS date_debut,
    Date_Fin AS date_fin,
    Obj_Encaissement AS obj_encaissement,
    Obj_Relances AS obj_relances,
    Obj_MisesEnDemeure AS obj_mises_en_demeure,
    Obj_Dossiers_Juridiques AS obj_dossiers_juridiques,
    Obj_Coupures AS obj_coupures,
    Date_Creation AS date_creation,
    Cree_Par AS cree_par,
    Est_Actif AS est_actif
"#;

/// First and last day covered by the `annee`/`mois` filter.
fn period_bounds(filter: &ObjectiveFilter) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let Some(annee) = filter.annee else {
        return (None, None);
    };

    let (start, end) = match filter.mois {
        Some(mois) => {
            let start = NaiveDate::from_ymd_opt(annee, mois, 1);
            let next = if mois == 12 {
                NaiveDate::from_ymd_opt(annee + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(annee, mois + 1, 1)
            };
            (start, next.and_then(|d| d.pred_opt()))
        }
        None => (
            NaiveDate::from_ymd_opt(annee, 1, 1),
            NaiveDate::from_ymd_opt(annee, 12, 31),
        ),
    };
    (start, end)
}

#[async_trait]
impl ObjectiveRepository for SqliteObjectiveRepository {
    async fn list(&self, filter: &ObjectiveFilter) -> Result<Vec<Objectif>, Error> {
        let (start, end) = period_bounds(filter);

        // Overlap test: the objective starts before the period ends and ends after it starts
        let rows = sqlx::query_as::<_, SqliteObjectif>(&format!(
            r#"
            SELECT {COLUMNS} FROM DIM_OBJECTIF
            WHERE (?1 IS NULL OR FK_Agence = ?1)
              AND (?2 IS NULL OR Est_Actif = ?2)
              AND (?3 IS NULL OR Date_Fin >= ?3)
              AND (?4 IS NULL OR Date_Debut <= ?4)
            ORDER BY Date_Debut DESC, Objectif_ID DESC
            "#
        ))
        .bind(filter.agence_id)
        .bind(filter.actif)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to list objectives"))?;

        Ok(rows.into_iter().map(Objectif::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Objectif>, Error> {
        let row = sqlx::query_as::<_, SqliteObjectif>(&format!(
            "SELECT {COLUMNS} FROM DIM_OBJECTIF WHERE Objectif_ID = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to find objective"))?;

        Ok(row.map(Objectif::from))
    }

    async fn create(&self, objective: &NewObjectif) -> Result<Objectif, Error> {
        let targets = &objective.targets;
        let row = sqlx::query_as::<_, SqliteObjectif>(&format!(
            r#"
            INSERT INTO DIM_OBJECTIF (
                FK_Agence, Titre, Description, Date_Debut, Date_Fin,
                Obj_Encaissement, Obj_Relances, Obj_MisesEnDemeure,
                Obj_Dossiers_Juridiques, Obj_Coupures,
                Date_Creation, Cree_Par, Est_Actif
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(objective.agence_id)
        .bind(&objective.titre)
        .bind(&objective.description)
        .bind(objective.date_debut)
        .bind(objective.date_fin)
        .bind(targets.obj_encaissement)
        .bind(targets.obj_relances)
        .bind(targets.obj_mises_en_demeure)
        .bind(targets.obj_dossiers_juridiques)
        .bind(targets.obj_coupures)
        .bind(Utc::now().timestamp())
        .bind(objective.cree_par)
        .bind(objective.est_actif)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to create objective"))?;

        Ok(row.into())
    }

    async fn update(&self, id: i64, objective: &NewObjectif) -> Result<Option<Objectif>, Error> {
        let targets = &objective.targets;
        let row = sqlx::query_as::<_, SqliteObjectif>(&format!(
            r#"
            UPDATE DIM_OBJECTIF
            SET FK_Agence = ?2, Titre = ?3, Description = ?4, Date_Debut = ?5, Date_Fin = ?6,
                Obj_Encaissement = ?7, Obj_Relances = ?8, Obj_MisesEnDemeure = ?9,
                Obj_Dossiers_Juridiques = ?10, Obj_Coupures = ?11, Est_Actif = ?12
            WHERE Objectif_ID = ?1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(objective.agence_id)
        .bind(&objective.titre)
        .bind(&objective.description)
        .bind(objective.date_debut)
        .bind(objective.date_fin)
        .bind(targets.obj_encaissement)
        .bind(targets.obj_relances)
        .bind(targets.obj_mises_en_demeure)
        .bind(targets.obj_dossiers_juridiques)
        .bind(targets.obj_coupures)
        .bind(objective.est_actif)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to update objective"))?;

        Ok(row.map(Objectif::from))
    }

    async fn delete(&self, id: i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM DIM_OBJECTIF WHERE Objectif_ID = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error(e, "Failed to delete objective"))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::migrated_provider;
    use ade_core::{
        agence::AgenceInput,
        centre::CentreInput,
        repositories::{
            AgenceRepository, AgenceRepositoryProvider, CentreRepository,
            CentreRepositoryProvider, ObjectiveRepositoryProvider,
        },
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn objective(agence_id: i64, debut: NaiveDate, fin: NaiveDate) -> NewObjectif {
        NewObjectif {
            agence_id,
            titre: Some("Relances T2".to_string()),
            description: None,
            date_debut: debut,
            date_fin: fin,
            targets: ObjectiveTargets {
                obj_relances: 300,
                obj_encaissement: 1_500_000.0,
                ..Default::default()
            },
            cree_par: None,
            est_actif: true,
        }
    }

    async fn agence_id(provider: &crate::SqliteRepositoryProvider) -> i64 {
        let centre = provider
            .centre()
            .create(&CentreInput {
                nom_centre: "Centre".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
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

    #[test]
    fn test_period_bounds() {
        let filter = ObjectiveFilter {
            annee: Some(2024),
            mois: Some(2),
            ..Default::default()
        };
        assert_eq!(
            period_bounds(&filter),
            (Some(date(2024, 2, 1)), Some(date(2024, 2, 29)))
        );

        let filter = ObjectiveFilter {
            annee: Some(2025),
            mois: Some(12),
            ..Default::default()
        };
        assert_eq!(
            period_bounds(&filter),
            (Some(date(2025, 12, 1)), Some(date(2025, 12, 31)))
        );

        assert_eq!(period_bounds(&ObjectiveFilter::default()), (None, None));
    }

    #[tokio::test]
    async fn test_list_by_overlapping_month() {
        let provider = migrated_provider().await;
        let agence_id = agence_id(&provider).await;
        let repo = provider.objective();

        let quarter = repo
            .create(&objective(agence_id, date(2025, 4, 1), date(2025, 6, 30)))
            .await
            .unwrap();
        repo.create(&objective(agence_id, date(2025, 7, 1), date(2025, 7, 31)))
            .await
            .unwrap();

        assert_eq!(quarter.targets.obj_relances, 300);
        assert_eq!(quarter.date_debut, date(2025, 4, 1));

        let may = ObjectiveFilter {
            annee: Some(2025),
            mois: Some(5),
            ..Default::default()
        };
        let found = repo.list(&may).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, quarter.id);

        let all = repo.list(&ObjectiveFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let inactive = ObjectiveFilter {
            actif: Some(false),
            ..Default::default()
        };
        assert!(repo.list(&inactive).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let provider = migrated_provider().await;
        let agence_id = agence_id(&provider).await;
        let repo = provider.objective();

        let created = repo
            .create(&objective(agence_id, date(2025, 6, 1), date(2025, 6, 30)))
            .await
            .unwrap();

        let mut changes = objective(agence_id, date(2025, 6, 1), date(2025, 6, 30));
        changes.est_actif = false;
        changes.targets.obj_coupures = 12;
        let updated = repo.update(created.id, &changes).await.unwrap().unwrap();
        assert!(!updated.est_actif);
        assert_eq!(updated.targets.obj_coupures, 12);
        assert_eq!(updated.date_creation, created.date_creation);

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
    }
}
