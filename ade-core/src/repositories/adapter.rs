use crate::{
    Error,
    agence::{Agence, AgenceInput, CentreAgenceCount},
    categorie::{Categorie, CategorieInput},
    centre::{Centre, CentreInput},
    commune::{Commune, CommuneInput},
    kpi::{KpiFilter, KpiKey, KpiMeasures, KpiRecord, KpiSummary},
    objective::{NewObjectif, Objectif, ObjectiveFilter},
    repositories::{
        AgenceRepository, CategorieRepository, CentreRepository, CommuneRepository,
        KpiRepository, ObjectiveRepository, RepositoryProvider, UserRepository,
    },
    user::{Credentials, Utilisateur, UtilisateurRecord},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Adapter that wraps a RepositoryProvider and implements individual repository traits
pub struct CentreRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> CentreRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> CentreRepository for CentreRepositoryAdapter<R> {
    async fn list(&self) -> Result<Vec<Centre>, Error> {
        self.provider.centre().list().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Centre>, Error> {
        self.provider.centre().find_by_id(id).await
    }

    async fn create(&self, centre: &CentreInput) -> Result<Centre, Error> {
        self.provider.centre().create(centre).await
    }

    async fn update(&self, id: i64, centre: &CentreInput) -> Result<Option<Centre>, Error> {
        self.provider.centre().update(id, centre).await
    }

    async fn delete(&self, id: i64) -> Result<bool, Error> {
        self.provider.centre().delete(id).await
    }

    async fn agence_counts(&self) -> Result<Vec<CentreAgenceCount>, Error> {
        self.provider.centre().agence_counts().await
    }
}

pub struct AgenceRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> AgenceRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> AgenceRepository for AgenceRepositoryAdapter<R> {
    async fn list(&self, centre_id: Option<i64>) -> Result<Vec<Agence>, Error> {
        self.provider.agence().list(centre_id).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Agence>, Error> {
        self.provider.agence().find_by_id(id).await
    }

    async fn create(&self, agence: &AgenceInput) -> Result<Agence, Error> {
        self.provider.agence().create(agence).await
    }

    async fn update(&self, id: i64, agence: &AgenceInput) -> Result<Option<Agence>, Error> {
        self.provider.agence().update(id, agence).await
    }

    async fn delete(&self, id: i64) -> Result<bool, Error> {
        self.provider.agence().delete(id).await
    }
}

pub struct CommuneRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> CommuneRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> CommuneRepository for CommuneRepositoryAdapter<R> {
    async fn list(&self, agence_id: Option<i64>) -> Result<Vec<Commune>, Error> {
        self.provider.commune().list(agence_id).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Commune>, Error> {
        self.provider.commune().find_by_id(id).await
    }

    async fn create(&self, commune: &CommuneInput) -> Result<Commune, Error> {
        self.provider.commune().create(commune).await
    }

    async fn update(&self, id: i64, commune: &CommuneInput) -> Result<Option<Commune>, Error> {
        self.provider.commune().update(id, commune).await
    }

    async fn delete(&self, id: i64) -> Result<bool, Error> {
        self.provider.commune().delete(id).await
    }
}

pub struct CategorieRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> CategorieRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> CategorieRepository for CategorieRepositoryAdapter<R> {
    async fn list(&self) -> Result<Vec<Categorie>, Error> {
        self.provider.categorie().list().await
    }

    async fn find_by_code(&self, code_type: &str) -> Result<Option<Categorie>, Error> {
        self.provider.categorie().find_by_code(code_type).await
    }

    async fn create(&self, categorie: &CategorieInput) -> Result<Categorie, Error> {
        self.provider.categorie().create(categorie).await
    }

    async fn update(&self, code_type: &str, libelle: &str) -> Result<Option<Categorie>, Error> {
        self.provider.categorie().update(code_type, libelle).await
    }

    async fn delete(&self, code_type: &str) -> Result<bool, Error> {
        self.provider.categorie().delete(code_type).await
    }
}

pub struct UserRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> UserRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> UserRepository for UserRepositoryAdapter<R> {
    async fn list(&self) -> Result<Vec<Utilisateur>, Error> {
        self.provider.user().list().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Utilisateur>, Error> {
        self.provider.user().find_by_id(id).await
    }

    async fn find_credentials(&self, nom_utilisateur: &str) -> Result<Option<Credentials>, Error> {
        self.provider.user().find_credentials(nom_utilisateur).await
    }

    async fn create(&self, record: &UtilisateurRecord) -> Result<Utilisateur, Error> {
        self.provider.user().create(record).await
    }

    async fn update(
        &self,
        id: i64,
        record: &UtilisateurRecord,
    ) -> Result<Option<Utilisateur>, Error> {
        self.provider.user().update(id, record).await
    }

    async fn delete(&self, id: i64) -> Result<bool, Error> {
        self.provider.user().delete(id).await
    }

    async fn touch_last_login(&self, id: i64) -> Result<(), Error> {
        self.provider.user().touch_last_login(id).await
    }

    async fn count(&self) -> Result<i64, Error> {
        self.provider.user().count().await
    }
}

pub struct ObjectiveRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> ObjectiveRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> ObjectiveRepository for ObjectiveRepositoryAdapter<R> {
    async fn list(&self, filter: &ObjectiveFilter) -> Result<Vec<Objectif>, Error> {
        self.provider.objective().list(filter).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Objectif>, Error> {
        self.provider.objective().find_by_id(id).await
    }

    async fn create(&self, objective: &NewObjectif) -> Result<Objectif, Error> {
        self.provider.objective().create(objective).await
    }

    async fn update(&self, id: i64, objective: &NewObjectif) -> Result<Option<Objectif>, Error> {
        self.provider.objective().update(id, objective).await
    }

    async fn delete(&self, id: i64) -> Result<bool, Error> {
        self.provider.objective().delete(id).await
    }
}

pub struct KpiRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> KpiRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> KpiRepository for KpiRepositoryAdapter<R> {
    async fn list(&self, filter: &KpiFilter) -> Result<Vec<KpiRecord>, Error> {
        self.provider.kpi().list(filter).await
    }

    async fn find(&self, key: &KpiKey) -> Result<Option<KpiRecord>, Error> {
        self.provider.kpi().find(key).await
    }

    async fn create(&self, record: &KpiRecord) -> Result<KpiRecord, Error> {
        self.provider.kpi().create(record).await
    }

    async fn update(
        &self,
        key: &KpiKey,
        measures: &KpiMeasures,
    ) -> Result<Option<KpiRecord>, Error> {
        self.provider.kpi().update(key, measures).await
    }

    async fn delete(&self, key: &KpiKey) -> Result<bool, Error> {
        self.provider.kpi().delete(key).await
    }

    async fn summarize(&self, filter: &KpiFilter) -> Result<KpiSummary, Error> {
        self.provider.kpi().summarize(filter).await
    }
}
