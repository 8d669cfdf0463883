//! Account domain types.

use chrono::{DateTime, Utc};

use marche_core::{Email, Uid};

/// A password account.
///
/// The credential record of the identity provider; the public facing data
/// lives in [`super::UserProfile`].
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub uid: Uid,
    pub email: Email,
    pub display_name: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Data needed to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub uid: Uid,
    pub email: Email,
    pub display_name: String,
    pub password_hash: String,
}
