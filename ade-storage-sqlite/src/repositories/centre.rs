use crate::storage_error;
use ade_core::{
    Error,
    agence::CentreAgenceCount,
    centre::{Centre, CentreInput},
    repositories::CentreRepository,
};
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteCentreRepository {
    pool: SqlitePool,
}

impl SqliteCentreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteCentre {
    id: i64,
    nom_centre: String,
    adresse: Option<String>,
    telephone: Option<String>,
    email: Option<String>,
}

impl From<SqliteCentre> for Centre {
    fn from(row: SqliteCentre) -> Self {
        Centre {
            id: row.id,
            nom_centre: row.nom_centre,
            adresse: row.adresse,
            telephone: row.telephone,
            email: row.email,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteCentreAgenceCount {
    centre_id: i64,
    nom_centre: String,
    nombre_agences: i64,
}

const COLUMNS: &str = r#"
    Centre_ID AS id,
    Nom_Centre AS nom_centre,
    Adresse AS adresse,
    Telephone AS telephone,
    Email AS email
"#;

#[async_trait]
impl CentreRepository for SqliteCentreRepository {
    async fn list(&self) -> Result<Vec<Centre>, Error> {
        let rows = sqlx::query_as::<_, SqliteCentre>(&format!(
            "SELECT {COLUMNS} FROM DIM_CENTRE ORDER BY Nom_Centre"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to list centres"))?;

        Ok(rows.into_iter().map(Centre::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Centre>, Error> {
        let row = sqlx::query_as::<_, SqliteCentre>(&format!(
            "SELECT {COLUMNS} FROM DIM_CENTRE WHERE Centre_ID = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to find centre"))?;

        Ok(row.map(Centre::from))
    }

    async fn create(&self, centre: &CentreInput) -> Result<Centre, Error> {
        let row = sqlx::query_as::<_, SqliteCentre>(&format!(
            r#"
            INSERT INTO DIM_CENTRE (Nom_Centre, Adresse, Telephone, Email)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&centre.nom_centre)
        .bind(&centre.adresse)
        .bind(&centre.telephone)
        .bind(&centre.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to create centre"))?;

        Ok(row.into())
    }

    async fn update(&self, id: i64, centre: &CentreInput) -> Result<Option<Centre>, Error> {
        let row = sqlx::query_as::<_, SqliteCentre>(&format!(
            r#"
            UPDATE DIM_CENTRE
            SET Nom_Centre = ?2, Adresse = ?3, Telephone = ?4, Email = ?5
            WHERE Centre_ID = ?1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&centre.nom_centre)
        .bind(&centre.adresse)
        .bind(&centre.telephone)
        .bind(&centre.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to update centre"))?;

        Ok(row.map(Centre::from))
    }

    async fn delete(&self, id: i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM DIM_CENTRE WHERE Centre_ID = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error(e, "Failed to delete centre"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn agence_counts(&self) -> Result<Vec<CentreAgenceCount>, Error> {
        let rows = sqlx::query_as::<_, SqliteCentreAgenceCount>(
            r#"
            SELECT
                c.Centre_ID AS centre_id,
                c.Nom_Centre AS nom_centre,
                COUNT(a.Agence_ID) AS nombre_agences
            FROM DIM_CENTRE c
            LEFT JOIN DIM_AGENCE a ON a.FK_Centre = c.Centre_ID
            GROUP BY c.Centre_ID, c.Nom_Centre
            ORDER BY c.Nom_Centre
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to count agences per centre"))?;

        Ok(rows
            .into_iter()
            .map(|row| CentreAgenceCount {
                centre_id: row.centre_id,
                nom_centre: row.nom_centre,
                nombre_agences: row.nombre_agences,
            })
            .collect())
    }
}
