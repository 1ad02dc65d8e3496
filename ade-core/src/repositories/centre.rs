use crate::{
    Error,
    agence::CentreAgenceCount,
    centre::{Centre, CentreInput},
};
use async_trait::async_trait;

/// Repository for `DIM_CENTRE`
#[async_trait]
pub trait CentreRepository: Send + Sync + 'static {
    /// List every centre ordered by name
    async fn list(&self) -> Result<Vec<Centre>, Error>;

    /// Find a centre by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Centre>, Error>;

    /// Create a new centre
    async fn create(&self, centre: &CentreInput) -> Result<Centre, Error>;

    /// Replace a centre; `None` when it does not exist
    async fn update(&self, id: i64, centre: &CentreInput) -> Result<Option<Centre>, Error>;

    /// Delete a centre; `false` when it does not exist
    async fn delete(&self, id: i64) -> Result<bool, Error>;

    /// Count agences attached to each centre
    async fn agence_counts(&self) -> Result<Vec<CentreAgenceCount>, Error>;
}
