use crate::storage_error;
use ade_core::{
    Error,
    error::{StorageError, ValidationError},
    repositories::UserRepository,
    role::Role,
    user::{Credentials, Utilisateur, UtilisateurRecord},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteUser {
    id: i64,
    nom_utilisateur: String,
    email: Option<String>,
    role: String,
    agence_id: Option<i64>,
    actif: bool,
    date_creation: i64,
    derniere_connexion: Option<i64>,
}

impl TryFrom<SqliteUser> for Utilisateur {
    type Error = Error;

    fn try_from(row: SqliteUser) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(|e| {
            tracing::error!(user_id = row.id, error = %e, "Unknown role stored for user");
            Error::Storage(StorageError::Database(format!(
                "Unknown role stored for user {}",
                row.id
            )))
        })?;

        Ok(Utilisateur {
            id: row.id,
            nom_utilisateur: row.nom_utilisateur,
            email: row.email,
            role,
            agence_id: row.agence_id,
            actif: row.actif,
            date_creation: DateTime::from_timestamp(row.date_creation, 0).unwrap_or_default(),
            derniere_connexion: row
                .derniere_connexion
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteCredentials {
    #[sqlx(flatten)]
    user: SqliteUser,
    password_hash: String,
}

const COLUMNS: &str = r#"
    User_ID AS id,
    Nom_Utilisateur AS nom_utilisateur,
    Email AS email,
    Role AS role,
    FK_Agence AS agence_id,
    Actif AS actif,
    Date_Creation AS date_creation,
    Derniere_Connexion AS derniere_connexion
"#;

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn list(&self) -> Result<Vec<Utilisateur>, Error> {
        let rows = sqlx::query_as::<_, SqliteUser>(&format!(
            "SELECT {COLUMNS} FROM DIM_UTILISATEUR ORDER BY Nom_Utilisateur"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to list users"))?;

        rows.into_iter().map(Utilisateur::try_from).collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Utilisateur>, Error> {
        let row = sqlx::query_as::<_, SqliteUser>(&format!(
            "SELECT {COLUMNS} FROM DIM_UTILISATEUR WHERE User_ID = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to find user"))?;

        row.map(Utilisateur::try_from).transpose()
    }

    async fn find_credentials(&self, nom_utilisateur: &str) -> Result<Option<Credentials>, Error> {
        let row = sqlx::query_as::<_, SqliteCredentials>(&format!(
            r#"
            SELECT {COLUMNS}, Mot_de_Passe AS password_hash
            FROM DIM_UTILISATEUR
            WHERE Nom_Utilisateur = ?1
            "#
        ))
        .bind(nom_utilisateur)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to load credentials"))?;

        row.map(|row| {
            Ok(Credentials {
                user: row.user.try_into()?,
                password_hash: row.password_hash,
            })
        })
        .transpose()
    }

    async fn create(&self, record: &UtilisateurRecord) -> Result<Utilisateur, Error> {
        let password_hash = record
            .password_hash
            .as_deref()
            .ok_or_else(|| ValidationError::MissingField("motDePasse".to_string()))?;

        let row = sqlx::query_as::<_, SqliteUser>(&format!(
            r#"
            INSERT INTO DIM_UTILISATEUR (
                Nom_Utilisateur, Email, Mot_de_Passe, Role, FK_Agence, Actif, Date_Creation
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&record.nom_utilisateur)
        .bind(&record.email)
        .bind(password_hash)
        .bind(record.role.as_str())
        .bind(record.agence_id)
        .bind(record.actif)
        .bind(Utc::now().timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to create user"))?;

        row.try_into()
    }

    async fn update(
        &self,
        id: i64,
        record: &UtilisateurRecord,
    ) -> Result<Option<Utilisateur>, Error> {
        let row = sqlx::query_as::<_, SqliteUser>(&format!(
            r#"
            UPDATE DIM_UTILISATEUR
            SET Nom_Utilisateur = ?2, Email = ?3, Role = ?4, FK_Agence = ?5, Actif = ?6,
                Mot_de_Passe = COALESCE(?7, Mot_de_Passe)
            WHERE User_ID = ?1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&record.nom_utilisateur)
        .bind(&record.email)
        .bind(record.role.as_str())
        .bind(record.agence_id)
        .bind(record.actif)
        .bind(&record.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(e, "Failed to update user"))?;

        row.map(Utilisateur::try_from).transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM DIM_UTILISATEUR WHERE User_ID = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error(e, "Failed to delete user"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn touch_last_login(&self, id: i64) -> Result<(), Error> {
        sqlx::query("UPDATE DIM_UTILISATEUR SET Derniere_Connexion = ?1 WHERE User_ID = ?2")
            .bind(Utc::now().timestamp())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error(e, "Failed to record last login"))?;

        Ok(())
    }

    async fn count(&self) -> Result<i64, Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM DIM_UTILISATEUR")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error(e, "Failed to count users"))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::migrated_provider;
    use ade_core::{
        repositories::{UserRepository, UserRepositoryProvider},
        role::Role,
        user::UtilisateurRecord,
    };

    fn record(nom: &str, hash: Option<&str>) -> UtilisateurRecord {
        UtilisateurRecord {
            nom_utilisateur: nom.to_string(),
            email: Some(format!("{nom}@ade.dz")),
            role: Role::Admin,
            agence_id: None,
            actif: true,
            password_hash: hash.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_and_load_credentials() {
        let provider = migrated_provider().await;
        let repo = provider.user();

        assert_eq!(repo.count().await.unwrap(), 0);

        let user = repo.create(&record("samir", Some("hash-1"))).await.unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(user.actif);
        assert!(user.derniere_connexion.is_none());

        let credentials = repo.find_credentials("samir").await.unwrap().unwrap();
        assert_eq!(credentials.user.id, user.id);
        assert_eq!(credentials.password_hash, "hash-1");

        assert!(repo.find_credentials("inconnu").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_constraint_violation() {
        let provider = migrated_provider().await;
        provider.user().create(&record("samir", Some("h"))).await.unwrap();

        let err = provider
            .user()
            .create(&record("samir", Some("h")))
            .await
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[tokio::test]
    async fn test_update_without_hash_keeps_password() {
        let provider = migrated_provider().await;
        let user = provider.user().create(&record("leila", Some("old"))).await.unwrap();

        let mut changes = record("leila", None);
        changes.actif = false;
        let updated = provider.user().update(user.id, &changes).await.unwrap().unwrap();
        assert!(!updated.actif);

        let credentials = provider.user().find_credentials("leila").await.unwrap().unwrap();
        assert_eq!(credentials.password_hash, "old");

        let changes = record("leila", Some("new"));
        provider.user().update(user.id, &changes).await.unwrap();
        let credentials = provider.user().find_credentials("leila").await.unwrap().unwrap();
        assert_eq!(credentials.password_hash, "new");
    }

    #[tokio::test]
    async fn test_touch_last_login() {
        let provider = migrated_provider().await;
        let user = provider.user().create(&record("nadia", Some("h"))).await.unwrap();

        provider.user().touch_last_login(user.id).await.unwrap();
        let user = provider.user().find_by_id(user.id).await.unwrap().unwrap();
        assert!(user.derniere_connexion.is_some());
    }
}
