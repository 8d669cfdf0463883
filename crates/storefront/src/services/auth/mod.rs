//! Identity provider.
//!
//! Password accounts backed by the [`MarketStore`], plus the signed ID
//! tokens that server actions verify (see [`tokens`]).

mod error;
pub mod tokens;

pub use error::AuthError;
pub use tokens::{TokenError, TokenService, VerifiedIdentity};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use marche_core::{Email, Uid};

use crate::db::{MarketStore, RepositoryError};
use crate::models::{CurrentUser, NewAccount, UserAccount};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Minimum display name length, in characters.
const MIN_NAME_LENGTH: usize = 2;

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a dyn MarketStore,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn MarketStore) -> Self {
        Self { store }
    }

    /// Create a password account and its empty profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidName` if the name is shorter than 2 characters.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserAccount, AuthError> {
        let name = validate_name(name)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let account = self
            .store
            .create_account(NewAccount {
                uid: Uid::generate(),
                email,
                display_name: name,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(uid = %account.uid, "Account created");
        Ok(account)
    }

    /// Login with email and password.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserAccount, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let account = self
            .store
            .account_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &account.password_hash)?;

        Ok(account)
    }
}

impl From<&UserAccount> for CurrentUser {
    fn from(account: &UserAccount) -> Self {
        Self {
            uid: account.uid,
            email: Some(account.email.clone()),
            display_name: Some(account.display_name.clone()),
            is_anonymous: false,
        }
    }
}

fn validate_name(name: &str) -> Result<String, AuthError> {
    let name = name.trim();
    if name.chars().count() < MIN_NAME_LENGTH {
        return Err(AuthError::InvalidName(
            "Le nom doit contenir au moins 2 caractères.".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(
            "Le mot de passe doit contenir au moins 6 caractères.".to_string(),
        ));
    }
    Ok(())
}

/// Hash a password using Argon2.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
