use crate::{
    Error,
    agence::CentreAgenceCount,
    centre::{Centre, CentreInput},
    repositories::CentreRepository,
    services::{deleted, found},
    validation::{optional_text, require_text, validate_optional_email},
};
use std::sync::Arc;

/// Service for centre management
pub struct CentreService<R: CentreRepository> {
    repository: Arc<R>,
}

impl<R: CentreRepository> CentreService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> Result<Vec<Centre>, Error> {
        self.repository.list().await
    }

    pub async fn get(&self, id: i64) -> Result<Centre, Error> {
        found(self.repository.find_by_id(id).await?)
    }

    pub async fn create(&self, input: &CentreInput) -> Result<Centre, Error> {
        let input = normalize(input)?;
        let centre = self.repository.create(&input).await?;
        tracing::info!(centre_id = centre.id, "Centre created");
        Ok(centre)
    }

    pub async fn update(&self, id: i64, input: &CentreInput) -> Result<Centre, Error> {
        let input = normalize(input)?;
        found(self.repository.update(id, &input).await?)
    }

    /// Fails with a constraint error while agences still reference the centre.
    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        deleted(self.repository.delete(id).await?)
    }

    pub async fn agence_counts(&self) -> Result<Vec<CentreAgenceCount>, Error> {
        self.repository.agence_counts().await
    }
}

fn normalize(input: &CentreInput) -> Result<CentreInput, Error> {
    let email = optional_text("email", input.email.as_deref(), 100)?;
    validate_optional_email(email.as_deref())?;

    Ok(CentreInput {
        nom_centre: require_text("nomCentre", &input.nom_centre, 100)?,
        adresse: optional_text("adresse", input.adresse.as_deref(), 255)?,
        telephone: optional_text("telephone", input.telephone.as_deref(), 20)?,
        email,
    })
}
