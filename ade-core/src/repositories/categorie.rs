use crate::{
    Error,
    categorie::{Categorie, CategorieInput},
};
use async_trait::async_trait;

/// Repository for `DIM_CATEGORIE`, keyed by `code_type`
#[async_trait]
pub trait CategorieRepository: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Categorie>, Error>;

    async fn find_by_code(&self, code_type: &str) -> Result<Option<Categorie>, Error>;

    async fn create(&self, categorie: &CategorieInput) -> Result<Categorie, Error>;

    /// Update the label of a category. The code itself is immutable.
    async fn update(&self, code_type: &str, libelle: &str) -> Result<Option<Categorie>, Error>;

    async fn delete(&self, code_type: &str) -> Result<bool, Error>;
}
