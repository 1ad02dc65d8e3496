use crate::storage_error;
use ade_core::{
    Error,
    commune::{Commune, CommuneInput},
    repositories::CommuneRepository,
};
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteCommuneRepository {
    pool: SqlitePool,
}

impl SqliteCommuneRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteCommune {
    id: i64,
    nom_commune: String,
    agence_id: i64,
}

impl From<SqliteCommune> for Commune {
    fn from(row: SqliteCommune) -> Self {
        Commune {
            id: row.id,
            nom_commune: row.nom_commune,
            agence_id: row.agence_id,
        }
    }
}

#[async_trait]
impl CommuneRepository for SqliteCommuneRepository {
    async fn list(&self, agence_id: Option<i64>) -> Result<Vec<Commune>, Error> {
        let rows = sqlx::query_as::<_, SqliteCommune>(
            r#"
            SELECT Commune_ID AS id, Nom_Commune AS nom_commune, FK_Agence AS agence_id
            FROM DIM_COMMUNE
            WHERE (?1 IS NULL OR FK_Agence = ?1)
            ORDER BY Nom_Commune
            "#,
        )
        .bind(agence_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to list communes"))?;

        Ok(rows.into_iter().map(Commune::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Commune>, Error> {
        let row = sqlx::query_as::<_, SqliteCommune>(
            r#"
            SELECT Commune_ID AS id, Nom_Commune AS nom_commune, FK_Agence AS agence_id
            FROM DIM_COMMUNE
            WHERE Commune_ID = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to find commune"))?;

        Ok(row.map(Commune::from))
    }

    async fn create(&self, commune: &CommuneInput) -> Result<Commune, Error> {
        let row = sqlx::query_as::<_, SqliteCommune>(
            r#"
            INSERT INTO DIM_COMMUNE (Nom_Commune, FK_Agence)
            VALUES (?1, ?2)
            RETURNING Commune_ID AS id, Nom_Commune AS nom_commune, FK_Agence AS agence_id
            "#,
        )
        .bind(&commune.nom_commune)
        .bind(commune.agence_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to create commune"))?;

        Ok(row.into())
    }

    async fn update(&self, id: i64, commune: &CommuneInput) -> Result<Option<Commune>, Error> {
        let row = sqlx::query_as::<_, SqliteCommune>(
            r#"
            UPDATE DIM_COMMUNE
            SET Nom_Commune = ?2, FK_Agence = ?3
            WHERE Commune_ID = ?1
            RETURNING Commune_ID AS id, Nom_Commune AS nom_commune, FK_Agence AS agence_id
            "#,
        )
        .bind(id)
        .bind(&commune.nom_commune)
        .bind(commune.agence_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to update commune"))?;

        Ok(row.map(Commune::from))
    }

    async fn delete(&self, id: i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM DIM_COMMUNE WHERE Commune_ID = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error(e, "Failed to delete commune"))?;

        Ok(result.rows_affected() > 0)
    }
}
