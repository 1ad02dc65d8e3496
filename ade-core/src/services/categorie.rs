use crate::{
    Error,
    categorie::{Categorie, CategorieInput},
    services::{deleted, found},
    repositories::CategorieRepository,
    validation::require_text,
};
use std::sync::Arc;

/// Maximum length of a category code.
pub const CODE_TYPE_MAX_LEN: usize = 10;

/// Service for customer category management
pub struct CategorieService<R: CategorieRepository> {
    repository: Arc<R>,
}

impl<R: CategorieRepository> CategorieService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> Result<Vec<Categorie>, Error> {
        self.repository.list().await
    }

    pub async fn get(&self, code_type: &str) -> Result<Categorie, Error> {
        found(self.repository.find_by_code(code_type).await?)
    }

    pub async fn create(&self, input: &CategorieInput) -> Result<Categorie, Error> {
        let input = CategorieInput {
            code_type: require_text("codeType", &input.code_type, CODE_TYPE_MAX_LEN)?,
            libelle: require_text("libelle", &input.libelle, 100)?,
        };
        self.repository.create(&input).await
    }

    /// Rename a category; the code itself is immutable.
    pub async fn update(&self, code_type: &str, libelle: &str) -> Result<Categorie, Error> {
        let libelle = require_text("libelle", libelle, 100)?;
        found(self.repository.update(code_type, &libelle).await?)
    }

    pub async fn delete(&self, code_type: &str) -> Result<(), Error> {
        deleted(self.repository.delete(code_type).await?)
    }
}
