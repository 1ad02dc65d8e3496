use crate::{
    Error,
    commune::{Commune, CommuneInput},
};
use async_trait::async_trait;

/// Repository for `DIM_COMMUNE`
#[async_trait]
pub trait CommuneRepository: Send + Sync + 'static {
    /// List communes, optionally restricted to one agence
    async fn list(&self, agence_id: Option<i64>) -> Result<Vec<Commune>, Error>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Commune>, Error>;

    async fn create(&self, commune: &CommuneInput) -> Result<Commune, Error>;

    async fn update(&self, id: i64, commune: &CommuneInput) -> Result<Option<Commune>, Error>;

    async fn delete(&self, id: i64) -> Result<bool, Error>;
}
