use crate::storage_error;
use ade_core::{
    Error,
    agence::{Agence, AgenceInput},
    repositories::AgenceRepository,
};
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteAgenceRepository {
    pool: SqlitePool,
}

impl SqliteAgenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteAgence {
    id: i64,
    nom_agence: String,
    adresse: Option<String>,
    telephone: Option<String>,
    email: Option<String>,
    fax: Option<String>,
    nom_banque: Option<String>,
    compte_bancaire: Option<String>,
    nif: Option<String>,
    nc: Option<String>,
    centre_id: i64,
}

impl From<SqliteAgence> for Agence {
    fn from(row: SqliteAgence) -> Self {
        Agence {
            id: row.id,
            nom_agence: row.nom_agence,
            adresse: row.adresse,
            telephone: row.telephone,
            email: row.email,
            fax: row.fax,
            nom_banque: row.nom_banque,
            compte_bancaire: row.compte_bancaire,
            nif: row.nif,
            nc: row.nc,
            centre_id: row.centre_id,
        }
    }
}

const COLUMNS: &str = r#"
    Agence_ID AS id,
    Nom_Agence AS nom_agence,
    Adresse AS adresse,
    Telephone AS telephone,
    Email AS email,
    Fax AS fax,
    Nom_Banque AS nom_banque,
    Compte_Bancaire AS compte_bancaire,
    NIF AS nif,
    NC AS nc,
    FK_Centre AS centre_id
"#;

#[async_trait]
impl AgenceRepository for SqliteAgenceRepository {
    async fn list(&self, centre_id: Option<i64>) -> Result<Vec<Agence>, Error> {
        let rows = sqlx::query_as::<_, SqliteAgence>(&format!(
            r#"
            SELECT {COLUMNS} FROM DIM_AGENCE
            WHERE (?1 IS NULL OR FK_Centre = ?1)
            ORDER BY Nom_Agence
            "#
        ))
        .bind(centre_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to list agences"))?;

        Ok(rows.into_iter().map(Agence::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Agence>, Error> {
        let row = sqlx::query_as::<_, SqliteAgence>(&format!(
            "SELECT {COLUMNS} FROM DIM_AGENCE WHERE Agence_ID = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to find agence"))?;

        Ok(row.map(Agence::from))
    }

    async fn create(&self, agence: &AgenceInput) -> Result<Agence, Error> {
        let row = sqlx::query_as::<_, SqliteAgence>(&format!(
            r#"
            INSERT INTO DIM_AGENCE (
                Nom_Agence, Adresse, Telephone, Email, Fax,
                Nom_Banque, Compte_Bancaire, NIF, NC, FK_Centre
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&agence.nom_agence)
        .bind(&agence.adresse)
        .bind(&agence.telephone)
        .bind(&agence.email)
        .bind(&agence.fax)
        .bind(&agence.nom_banque)
        .bind(&agence.compte_bancaire)
        .bind(&agence.nif)
        .bind(&agence.nc)
        .bind(agence.centre_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to create agence"))?;

        Ok(row.into())
    }

    async fn update(&self, id: i64, agence: &AgenceInput) -> Result<Option<Agence>, Error> {
        let row = sqlx::query_as::<_, SqliteAgence>(&format!(
            r#"
            UPDATE DIM_AGENCE
            SET Nom_Agence = ?2, Adresse = ?3, Telephone = ?4, Email = ?5, Fax = ?6,
                Nom_Banque = ?7, Compte_Bancaire = ?8, NIF = ?9, NC = ?10, FK_Centre = ?11
            WHERE Agence_ID = ?1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&agence.nom_agence)
        .bind(&agence.adresse)
        .bind(&agence.telephone)
        .bind(&agence.email)
        .bind(&agence.fax)
        .bind(&agence.nom_banque)
        .bind(&agence.compte_bancaire)
        .bind(&agence.nif)
        .bind(&agence.nc)
        .bind(agence.centre_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to update agence"))?;

        Ok(row.map(Agence::from))
    }

    async fn delete(&self, id: i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM DIM_AGENCE WHERE Agence_ID = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error(e, "Failed to delete agence"))?;

        Ok(result.rows_affected() > 0)
    }
}
