//! Authentication error types.

use axum::http::StatusCode;
use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] marche_core::EmailError),

    /// Display name too short.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Invalid credentials (wrong password or unknown email).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message shown on the login and signup forms.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Adresse e-mail invalide.".to_string(),
            Self::InvalidName(msg) | Self::WeakPassword(msg) => msg.clone(),
            Self::InvalidCredentials => "E-mail ou mot de passe incorrect.".to_string(),
            Self::UserAlreadyExists => "Un compte existe déjà avec cet e-mail.".to_string(),
            Self::Repository(_) | Self::PasswordHash => {
                "Une erreur est survenue. Veuillez réessayer.".to_string()
            }
        }
    }

    /// HTTP status of the form response carrying this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::InvalidEmail(_) | Self::InvalidName(_) | Self::WeakPassword(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Repository(_) | Self::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error is caused by the server rather than the input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::PasswordHash)
    }
}
