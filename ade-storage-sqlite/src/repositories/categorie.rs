use crate::storage_error;
use ade_core::{
    Error,
    categorie::{Categorie, CategorieInput},
    repositories::CategorieRepository,
};
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteCategorieRepository {
    pool: SqlitePool,
}

impl SqliteCategorieRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteCategorie {
    code_type: String,
    libelle: String,
}

impl From<SqliteCategorie> for Categorie {
    fn from(row: SqliteCategorie) -> Self {
        Categorie {
            code_type: row.code_type,
            libelle: row.libelle,
        }
    }
}

#[async_trait]
impl CategorieRepository for SqliteCategorieRepository {
    async fn list(&self) -> Result<Vec<Categorie>, Error> {
        let rows = sqlx::query_as::<_, SqliteCategorie>(
            "SELECT CODE_TYPE AS code_type, Libelle AS libelle FROM DIM_CATEGORIE ORDER BY CODE_TYPE",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to list categories"))?;

        Ok(rows.into_iter().map(Categorie::from).collect())
    }

    async fn find_by_code(&self, code_type: &str) -> Result<Option<Categorie>, Error> {
        let row = sqlx::query_as::<_, SqliteCategorie>(
            "SELECT CODE_TYPE AS code_type, Libelle AS libelle FROM DIM_CATEGORIE WHERE CODE_TYPE = ?1",
        )
        .bind(code_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to find category"))?;

        Ok(row.map(Categorie::from))
    }

    async fn create(&self, categorie: &CategorieInput) -> Result<Categorie, Error> {
        let row = sqlx::query_as::<_, SqliteCategorie>(
            r#"
            INSERT INTO DIM_CATEGORIE (CODE_TYPE, Libelle)
            VALUES (?1, ?2)
            RETURNING CODE_TYPE AS code_type, Libelle AS libelle
            "#,
        )
        .bind(&categorie.code_type)
        .bind(&categorie.libelle)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to create category"))?;

        Ok(row.into())
    }

    async fn update(&self, code_type: &str, libelle: &str) -> Result<Option<Categorie>, Error> {
        let row = sqlx::query_as::<_, SqliteCategorie>(
            r#"
            UPDATE DIM_CATEGORIE SET Libelle = ?2
            WHERE CODE_TYPE = ?1
            RETURNING CODE_TYPE AS code_type, Libelle AS libelle
            "#,
        )
        .bind(code_type)
        .bind(libelle)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to update category"))?;

        Ok(row.map(Categorie::from))
    }

    async fn delete(&self, code_type: &str) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM DIM_CATEGORIE WHERE CODE_TYPE = ?1")
            .bind(code_type)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error(e, "Failed to delete category"))?;

        Ok(result.rows_affected() > 0)
    }
}
