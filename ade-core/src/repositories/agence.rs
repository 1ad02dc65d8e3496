use crate::{
    Error,
    agence::{Agence, AgenceInput},
};
use async_trait::async_trait;

/// Repository for `DIM_AGENCE`
#[async_trait]
pub trait AgenceRepository: Send + Sync + 'static {
    async fn list(&self, centre_id: Option<i64>) -> Result<Vec<Agence>, Error>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Agence>, Error>;

    /// Create a new agence. The input must carry a `centre_id`.
    async fn create(&self, agence: &AgenceInput) -> Result<Agence, Error>;

    async fn update(&self, id: i64, agence: &AgenceInput) -> Result<Option<Agence>, Error>;

    async fn delete(&self, id: i64) -> Result<bool, Error>;
}
