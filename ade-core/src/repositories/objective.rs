use crate::{
    Error,
    objective::{NewObjectif, Objectif, ObjectiveFilter},
};
use async_trait::async_trait;

/// Repository for `DIM_OBJECTIF`
#[async_trait]
pub trait ObjectiveRepository: Send + Sync + 'static {
    async fn list(&self, filter: &ObjectiveFilter) -> Result<Vec<Objectif>, Error>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Objectif>, Error>;

    async fn create(&self, objective: &NewObjectif) -> Result<Objectif, Error>;

    async fn update(&self, id: i64, objective: &NewObjectif) -> Result<Option<Objectif>, Error>;

    async fn delete(&self, id: i64) -> Result<bool, Error>;
}
