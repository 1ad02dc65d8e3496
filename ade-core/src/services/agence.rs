use crate::{
    Error,
    agence::{Agence, AgenceInput},
    error::ValidationError,
    repositories::AgenceRepository,
    services::{deleted, found},
    validation::{optional_text, require_text, validate_optional_email},
};
use std::sync::Arc;

/// Service for agence management
pub struct AgenceService<R: AgenceRepository> {
    repository: Arc<R>,
}

impl<R: AgenceRepository> AgenceService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// List agences, optionally restricted to one centre.
    pub async fn list(&self, centre_id: Option<i64>) -> Result<Vec<Agence>, Error> {
        self.repository.list(centre_id).await
    }

    pub async fn get(&self, id: i64) -> Result<Agence, Error> {
        found(self.repository.find_by_id(id).await?)
    }

    pub async fn create(&self, input: &AgenceInput) -> Result<Agence, Error> {
        let input = normalize(input)?;
        let agence = self.repository.create(&input).await?;
        tracing::info!(agence_id = agence.id, centre_id = agence.centre_id, "Agence created");
        Ok(agence)
    }

    pub async fn update(&self, id: i64, input: &AgenceInput) -> Result<Agence, Error> {
        let input = normalize(input)?;
        found(self.repository.update(id, &input).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        deleted(self.repository.delete(id).await?)
    }
}

fn normalize(input: &AgenceInput) -> Result<AgenceInput, Error> {
    let centre_id = input
        .centre_id
        .ok_or_else(|| ValidationError::MissingField("centreId".to_string()))?;

    let email = optional_text("email", input.email.as_deref(), 100)?;
    validate_optional_email(email.as_deref())?;

    Ok(AgenceInput {
        nom_agence: require_text("nomAgence", &input.nom_agence, 100)?,
        adresse: optional_text("adresse", input.adresse.as_deref(), 255)?,
        telephone: optional_text("telephone", input.telephone.as_deref(), 20)?,
        email,
        fax: optional_text("fax", input.fax.as_deref(), 20)?,
        nom_banque: optional_text("nomBanque", input.nom_banque.as_deref(), 100)?,
        compte_bancaire: optional_text("compteBancaire", input.compte_bancaire.as_deref(), 50)?,
        nif: optional_text("nif", input.nif.as_deref(), 50)?,
        nc: optional_text("nc", input.nc.as_deref(), 50)?,
        centre_id: Some(centre_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> AgenceInput {
        AgenceInput {
            nom_agence: " Agence Bab Ezzouar ".to_string(),
            adresse: None,
            telephone: None,
            email: None,
            fax: None,
            nom_banque: None,
            compte_bancaire: None,
            nif: Some("".to_string()),
            nc: None,
            centre_id: Some(1),
        }
    }

    #[test]
    fn test_normalize_requires_centre() {
        let mut agence = input();
        agence.centre_id = None;
        assert!(normalize(&agence).unwrap_err().is_validation_error());
    }

    #[test]
    fn test_normalize_trims_name() {
        let normalized = normalize(&input()).unwrap();
        assert_eq!(normalized.nom_agence, "Agence Bab Ezzouar");
        assert_eq!(normalized.nif, None);
        assert_eq!(normalized.centre_id, Some(1));
    }
}
