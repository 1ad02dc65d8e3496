use crate::{
    Error,
    commune::{Commune, CommuneInput},
    error::ValidationError,
    repositories::CommuneRepository,
    services::{deleted, found},
    validation::require_text,
};
use std::sync::Arc;

/// Service for commune management
pub struct CommuneService<R: CommuneRepository> {
    repository: Arc<R>,
}

impl<R: CommuneRepository> CommuneService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, agence_id: Option<i64>) -> Result<Vec<Commune>, Error> {
        self.repository.list(agence_id).await
    }

    pub async fn get(&self, id: i64) -> Result<Commune, Error> {
        found(self.repository.find_by_id(id).await?)
    }

    pub async fn create(&self, input: &CommuneInput) -> Result<Commune, Error> {
        let input = normalize(input)?;
        self.repository.create(&input).await
    }

    pub async fn update(&self, id: i64, input: &CommuneInput) -> Result<Commune, Error> {
        let input = normalize(input)?;
        found(self.repository.update(id, &input).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        deleted(self.repository.delete(id).await?)
    }
}

fn normalize(input: &CommuneInput) -> Result<CommuneInput, Error> {
    let agence_id = input
        .agence_id
        .ok_or_else(|| ValidationError::MissingField("agenceId".to_string()))?;

    Ok(CommuneInput {
        nom_commune: require_text("nomCommune", &input.nom_commune, 100)?,
        agence_id: Some(agence_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_requires_name_and_agence() {
        let missing_agence = CommuneInput {
            nom_commune: "Rouiba".to_string(),
            agence_id: None,
        };
        assert!(normalize(&missing_agence).is_err());

        let missing_name = CommuneInput {
            nom_commune: " ".to_string(),
            agence_id: Some(3),
        };
        assert!(normalize(&missing_name).is_err());
    }
}
