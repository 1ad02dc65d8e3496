use crate::{
    Error,
    error::ValidationError,
    repositories::UserRepository,
    role::Role,
    services::{auth::hash_password, deleted, found},
    user::{Utilisateur, UtilisateurInput, UtilisateurRecord},
    validation::{optional_text, require_text, validate_optional_email, validate_password},
};
use std::sync::Arc;

/// Service for user account management
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> Result<Vec<Utilisateur>, Error> {
        self.repository.list().await
    }

    pub async fn get(&self, id: i64) -> Result<Utilisateur, Error> {
        found(self.repository.find_by_id(id).await?)
    }

    /// Create an account. A password is mandatory.
    pub async fn create(&self, input: &UtilisateurInput) -> Result<Utilisateur, Error> {
        let password = input
            .mot_de_passe
            .as_deref()
            .ok_or_else(|| ValidationError::MissingField("motDePasse".to_string()))?;

        let record = to_record(input, Some(password))?;
        let user = self.repository.create(&record).await?;
        tracing::info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Update an account; the password is only replaced when one is supplied.
    pub async fn update(&self, id: i64, input: &UtilisateurInput) -> Result<Utilisateur, Error> {
        let password = input.mot_de_passe.as_deref().filter(|p| !p.is_empty());
        let record = to_record(input, password)?;
        found(self.repository.update(id, &record).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        deleted(self.repository.delete(id).await?)
    }

    /// Create the first administrator when no account exists yet.
    ///
    /// Returns `None` when accounts are already present.
    pub async fn bootstrap_admin(
        &self,
        nom_utilisateur: &str,
        password: &str,
    ) -> Result<Option<Utilisateur>, Error> {
        if self.repository.count().await? > 0 {
            return Ok(None);
        }

        let input = UtilisateurInput {
            nom_utilisateur: nom_utilisateur.to_string(),
            email: None,
            role: Role::Admin,
            agence_id: None,
            actif: Some(true),
            mot_de_passe: Some(password.to_string()),
        };
        let user = self.create(&input).await?;
        tracing::warn!(user_id = user.id, "Bootstrap administrator account created");
        Ok(Some(user))
    }
}

fn to_record(
    input: &UtilisateurInput,
    password: Option<&str>,
) -> Result<UtilisateurRecord, Error> {
    let nom_utilisateur = require_text("nomUtilisateur", &input.nom_utilisateur, 50)?;
    let email = optional_text("email", input.email.as_deref(), 100)?;
    validate_optional_email(email.as_deref())?;

    if input.role == Role::Standard && input.agence_id.is_none() {
        return Err(ValidationError::MissingField("agenceId".to_string()).into());
    }

    let password_hash = match password {
        Some(password) => {
            validate_password(password)?;
            Some(hash_password(password))
        }
        None => None,
    };

    Ok(UtilisateurRecord {
        nom_utilisateur,
        email,
        role: input.role,
        agence_id: input.agence_id,
        actif: input.actif.unwrap_or(true),
        password_hash,
    })
}
