//! Schema of the ADE reporting database
//!
//! Reference tables (`DIM_*`) and the daily fact table `FAIT_KPI_ADE`.
use ade_migration::{Migration, MigrationError, MigrationManager, MigrationRecord, check_order};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Database, Sqlite, SqlitePool};

pub struct SqliteMigrationManager {
    pool: SqlitePool,
}

impl SqliteMigrationManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MigrationManager<Sqlite> for SqliteMigrationManager {
    async fn initialize(&self) -> Result<(), MigrationError> {
        sqlx::query(
            format!(
                r#"
            CREATE TABLE IF NOT EXISTS {} (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at INTEGER NOT NULL DEFAULT (unixepoch())
            );"#,
                self.get_migration_table_name()
            )
            .as_str(),
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn up(&self, migrations: &[Box<dyn Migration<Sqlite>>]) -> Result<(), MigrationError> {
        check_order(migrations)?;

        for migration in migrations {
            if self.is_applied(migration.version()).await? {
                continue;
            }

            let mut tx = self.pool.begin().await?;

            tracing::info!(
                version = migration.version(),
                name = migration.name(),
                "Applying migration"
            );

            migration
                .up(&mut *tx as &mut <Sqlite as Database>::Connection)
                .await?;

            sqlx::query(
                format!(
                    "INSERT INTO {} (version, name, applied_at) VALUES (?, ?, ?)",
                    self.get_migration_table_name()
                )
                .as_str(),
            )
            .bind(migration.version())
            .bind(migration.name())
            .bind(Utc::now().timestamp())
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
        }
        Ok(())
    }

    async fn down(&self, migrations: &[Box<dyn Migration<Sqlite>>]) -> Result<(), MigrationError> {
        for migration in migrations.iter().rev() {
            if !self.is_applied(migration.version()).await? {
                continue;
            }

            let mut tx = self.pool.begin().await?;

            tracing::info!(
                version = migration.version(),
                name = migration.name(),
                "Rolling back migration"
            );

            migration
                .down(&mut *tx as &mut <Sqlite as Database>::Connection)
                .await?;

            sqlx::query(
                format!(
                    "DELETE FROM {} WHERE version = ?",
                    self.get_migration_table_name()
                )
                .as_str(),
            )
            .bind(migration.version())
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
        }
        Ok(())
    }

    async fn get_applied_migrations(&self) -> Result<Vec<MigrationRecord>, MigrationError> {
        let records = sqlx::query_as::<_, MigrationRecord>(
            format!(
                "SELECT version, name, applied_at FROM {} ORDER BY version",
                self.get_migration_table_name()
            )
            .as_str(),
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn is_applied(&self, version: i64) -> Result<bool, MigrationError> {
        let result: bool = sqlx::query_scalar(
            format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE version = ?)",
                self.get_migration_table_name()
            )
            .as_str(),
        )
        .bind(version)
        .fetch_one(&self.pool)
        .await?;
        Ok(result)
    }
}

/// A migration made of plain SQL statements, run one at a time.
pub struct SqlMigration {
    pub version: i64,
    pub name: &'static str,
    pub up: &'static [&'static str],
    pub down: &'static [&'static str],
}

#[async_trait]
impl Migration<Sqlite> for SqlMigration {
    fn version(&self) -> i64 {
        self.version
    }

    fn name(&self) -> &str {
        self.name
    }

    async fn up<'a>(
        &'a self,
        conn: &'a mut <Sqlite as Database>::Connection,
    ) -> Result<(), MigrationError> {
        for statement in self.up.iter().copied() {
            sqlx::query(statement).execute(&mut *conn).await?;
        }
        Ok(())
    }

    async fn down<'a>(
        &'a self,
        conn: &'a mut <Sqlite as Database>::Connection,
    ) -> Result<(), MigrationError> {
        for statement in self.down.iter().copied() {
            sqlx::query(statement).execute(&mut *conn).await?;
        }
        Ok(())
    }
}

pub const CREATE_CENTRES: SqlMigration = SqlMigration {
    version: 1,
    name: "CreateCentresTable",
    up: &[r#"
        CREATE TABLE IF NOT EXISTS DIM_CENTRE (
            Centre_ID INTEGER PRIMARY KEY AUTOINCREMENT,
            Nom_Centre TEXT NOT NULL,
            Adresse TEXT,
            Telephone TEXT,
            Email TEXT
        );"#],
    down: &["DROP TABLE IF EXISTS DIM_CENTRE"],
};

pub const CREATE_AGENCES: SqlMigration = SqlMigration {
    version: 2,
    name: "CreateAgencesTable",
    up: &[r#"
        CREATE TABLE IF NOT EXISTS DIM_AGENCE (
            Agence_ID INTEGER PRIMARY KEY AUTOINCREMENT,
            Nom_Agence TEXT NOT NULL,
            Adresse TEXT,
            Telephone TEXT,
            Email TEXT,
            Fax TEXT,
            Nom_Banque TEXT,
            Compte_Bancaire TEXT,
            NIF TEXT,
            NC TEXT,
            FK_Centre INTEGER NOT NULL REFERENCES DIM_CENTRE(Centre_ID)
        );"#],
    down: &["DROP TABLE IF EXISTS DIM_AGENCE"],
};

pub const CREATE_COMMUNES: SqlMigration = SqlMigration {
    version: 3,
    name: "CreateCommunesTable",
    up: &[r#"
        CREATE TABLE IF NOT EXISTS DIM_COMMUNE (
            Commune_ID INTEGER PRIMARY KEY AUTOINCREMENT,
            Nom_Commune TEXT NOT NULL,
            FK_Agence INTEGER NOT NULL REFERENCES DIM_AGENCE(Agence_ID)
        );"#],
    down: &["DROP TABLE IF EXISTS DIM_COMMUNE"],
};

pub const CREATE_CATEGORIES: SqlMigration = SqlMigration {
    version: 4,
    name: "CreateCategoriesTable",
    up: &[r#"
        CREATE TABLE IF NOT EXISTS DIM_CATEGORIE (
            CODE_TYPE TEXT PRIMARY KEY,
            Libelle TEXT NOT NULL
        );"#],
    down: &["DROP TABLE IF EXISTS DIM_CATEGORIE"],
};

pub const CREATE_UTILISATEURS: SqlMigration = SqlMigration {
    version: 5,
    name: "CreateUtilisateursTable",
    up: &[r#"
        CREATE TABLE IF NOT EXISTS DIM_UTILISATEUR (
            User_ID INTEGER PRIMARY KEY AUTOINCREMENT,
            Nom_Utilisateur TEXT NOT NULL UNIQUE,
            Email TEXT,
            Mot_de_Passe TEXT NOT NULL,
            Role TEXT NOT NULL CHECK (Role IN ('Administrateur', 'Standard')),
            FK_Agence INTEGER REFERENCES DIM_AGENCE(Agence_ID),
            Actif INTEGER NOT NULL DEFAULT 1,
            Date_Creation INTEGER NOT NULL DEFAULT (unixepoch()),
            Derniere_Connexion INTEGER
        );"#],
    down: &["DROP TABLE IF EXISTS DIM_UTILISATEUR"],
};

pub const CREATE_OBJECTIFS: SqlMigration = SqlMigration {
    version: 6,
    name: "CreateObjectifsTable",
    up: &[r#"
        CREATE TABLE IF NOT EXISTS DIM_OBJECTIF (
            Objectif_ID INTEGER PRIMARY KEY AUTOINCREMENT,
            FK_Agence INTEGER NOT NULL REFERENCES DIM_AGENCE(Agence_ID),
            Titre TEXT,
            Description TEXT,
            Date_Debut TEXT NOT NULL,
            Date_Fin TEXT NOT NULL,
            Obj_Encaissement REAL NOT NULL DEFAULT 0,
            Obj_Relances INTEGER NOT NULL DEFAULT 0,
            Obj_MisesEnDemeure INTEGER NOT NULL DEFAULT 0,
            Obj_Dossiers_Juridiques INTEGER NOT NULL DEFAULT 0,
            Obj_Coupures INTEGER NOT NULL DEFAULT 0,
            Date_Creation INTEGER NOT NULL DEFAULT (unixepoch()),
            Cree_Par INTEGER REFERENCES DIM_UTILISATEUR(User_ID) ON DELETE SET NULL,
            Est_Actif INTEGER NOT NULL DEFAULT 1,
            CHECK (Date_Fin >= Date_Debut)
        );"#],
    down: &["DROP TABLE IF EXISTS DIM_OBJECTIF"],
};

pub const CREATE_KPIS: SqlMigration = SqlMigration {
    version: 7,
    name: "CreateKpiFactTable",
    up: &[r#"
        CREATE TABLE IF NOT EXISTS FAIT_KPI_ADE (
            DateKPI TEXT NOT NULL,
            FK_Agence INTEGER NOT NULL REFERENCES DIM_AGENCE(Agence_ID),
            FK_Categorie TEXT NOT NULL REFERENCES DIM_CATEGORIE(CODE_TYPE),
            Nb_RelancesEnvoyees INTEGER NOT NULL DEFAULT 0,
            Mt_RelancesEnvoyees REAL NOT NULL DEFAULT 0,
            Nb_RelancesReglees INTEGER NOT NULL DEFAULT 0,
            Mt_RelancesReglees REAL NOT NULL DEFAULT 0,
            Nb_MisesEnDemeure_Envoyees INTEGER NOT NULL DEFAULT 0,
            Mt_MisesEnDemeure_Envoyees REAL NOT NULL DEFAULT 0,
            Nb_MisesEnDemeure_Reglees INTEGER NOT NULL DEFAULT 0,
            Mt_MisesEnDemeure_Reglees REAL NOT NULL DEFAULT 0,
            Nb_Dossiers_Juridiques INTEGER NOT NULL DEFAULT 0,
            Mt_Dossiers_Juridiques REAL NOT NULL DEFAULT 0,
            Nb_Coupures INTEGER NOT NULL DEFAULT 0,
            Mt_Coupures REAL NOT NULL DEFAULT 0,
            Nb_Retablissements INTEGER NOT NULL DEFAULT 0,
            Mt_Retablissements REAL NOT NULL DEFAULT 0,
            Encaissement_Journalier_Global REAL NOT NULL DEFAULT 0,
            PRIMARY KEY (DateKPI, FK_Agence, FK_Categorie)
        );"#],
    down: &["DROP TABLE IF EXISTS FAIT_KPI_ADE"],
};

pub const CREATE_INDEXES: SqlMigration = SqlMigration {
    version: 8,
    name: "CreateIndexes",
    up: &[
        "CREATE INDEX IF NOT EXISTS idx_agence_centre ON DIM_AGENCE(FK_Centre)",
        "CREATE INDEX IF NOT EXISTS idx_commune_agence ON DIM_COMMUNE(FK_Agence)",
        "CREATE INDEX IF NOT EXISTS idx_objectif_agence_dates ON DIM_OBJECTIF(FK_Agence, Date_Debut, Date_Fin)",
        "CREATE INDEX IF NOT EXISTS idx_kpi_agence_date ON FAIT_KPI_ADE(FK_Agence, DateKPI)",
    ],
    down: &[
        "DROP INDEX IF EXISTS idx_kpi_agence_date",
        "DROP INDEX IF EXISTS idx_objectif_agence_dates",
        "DROP INDEX IF EXISTS idx_commune_agence",
        "DROP INDEX IF EXISTS idx_agence_centre",
    ],
};

/// Every migration of this backend, in version order.
pub fn all() -> Vec<Box<dyn Migration<Sqlite>>> {
    vec![
        Box::new(CREATE_CENTRES),
        Box::new(CREATE_AGENCES),
        Box::new(CREATE_COMMUNES),
        Box::new(CREATE_CATEGORIES),
        Box::new(CREATE_UTILISATEURS),
        Box::new(CREATE_OBJECTIFS),
        Box::new(CREATE_KPIS),
        Box::new(CREATE_INDEXES),
    ]
}
