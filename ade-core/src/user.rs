//! Back-office user accounts
//!
//! | Field               | Type               | Description                                        |
//! | ------------------- | ------------------ | -------------------------------------------------- |
//! | `id`                | `i64`              | Row identifier.                                    |
//! | `nom_utilisateur`   | `String`           | Login name, unique.                                |
//! | `email`             | `Option<String>`   | Contact address.                                   |
//! | `role`              | `Role`             | `Administrateur` or `Standard`.                    |
//! | `agence_id`         | `Option<i64>`      | Home agence; mandatory for `Standard` users.       |
//! | `actif`             | `bool`             | Inactive accounts cannot log in.                   |
//! | `date_creation`     | `DateTime`         | When the account was created.                      |
//! | `derniere_connexion`| `Option<DateTime>` | Last successful login.                             |
//!
//! The password hash is never part of [`Utilisateur`]; it only travels inside
//! [`UtilisateurRecord`] on its way to storage.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::role::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utilisateur {
    pub id: i64,
    pub nom_utilisateur: String,
    pub email: Option<String>,
    pub role: Role,
    pub agence_id: Option<i64>,
    pub actif: bool,
    pub date_creation: DateTime<Utc>,
    pub derniere_connexion: Option<DateTime<Utc>>,
}

/// Fields accepted from clients when creating or updating an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilisateurInput {
    #[serde(default)]
    pub nom_utilisateur: String,
    pub email: Option<String>,
    pub role: Role,
    pub agence_id: Option<i64>,
    pub actif: Option<bool>,
    pub mot_de_passe: Option<String>,
}

/// Validated account data handed to storage.
///
/// `password_hash` is `None` on updates that keep the current password.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilisateurRecord {
    pub nom_utilisateur: String,
    pub email: Option<String>,
    pub role: Role,
    pub agence_id: Option<i64>,
    pub actif: bool,
    pub password_hash: Option<String>,
}

/// An account together with its stored password hash, used only to verify logins.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: Utilisateur,
    pub password_hash: String,
}
