//! Signed ID tokens.
//!
//! Server actions are called with a bearer token instead of relying on the
//! session cookie. Tokens are HS256 JWTs carrying the session identity.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use marche_core::Uid;

use crate::models::CurrentUser;

/// Token lifetime.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Errors returned when a token cannot be trusted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid signature")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uid,
    anon: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    iat: i64,
    exp: i64,
}

/// Identity recovered from a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: Uid,
    pub is_anonymous: bool,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl VerifiedIdentity {
    /// Name to attach to content created by this identity.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.email.as_deref().and_then(|e| e.split('@').next()))
            .unwrap_or("Invité")
    }
}

/// Issues and verifies ID tokens.
#[derive(Clone)]
pub struct TokenService {
    secret: SecretString,
    validation: Validation,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // No clock-skew allowance on `exp`.
        validation.leeway = 0;
        Self { secret, validation }
    }

    /// Issue a token for `user`, valid for [`TOKEN_LIFETIME`].
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` if the claims cannot be encoded.
    pub fn issue(&self, user: &CurrentUser) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        #[allow(clippy::cast_possible_wrap)]
        let lifetime = TOKEN_LIFETIME.as_secs() as i64;
        self.issue_at(user, now, now + lifetime)
    }

    fn issue_at(&self, user: &CurrentUser, iat: i64, exp: i64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user.uid,
            anon: user.is_anonymous,
            email: user.email.as_ref().map(|e| e.as_str().to_string()),
            name: user.display_name.clone(),
            iat,
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|_| TokenError::Malformed)
    }

    /// Verify a token's signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the token is malformed, forged or expired.
    pub fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenError> {
        let claims = decode::<Claims>(
            token.trim(),
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &self.validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
            _ => TokenError::Malformed,
        })?
        .claims;

        Ok(VerifiedIdentity {
            uid: claims.sub,
            is_anonymous: claims.anon,
            email: claims.email,
            display_name: claims.name,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marche_core::Email;

    use super::*;

    fn service() -> TokenService {
        TokenService::new(SecretString::from("k3y-f0r-t3sts-0nly-9f8e7d6c5b4a3210"))
    }

    fn account() -> CurrentUser {
        CurrentUser {
            uid: Uid::generate(),
            email: Some(Email::parse("awa@marche.sn").unwrap()),
            display_name: Some("Awa".to_string()),
            is_anonymous: false,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let user = account();
        let token = service().issue(&user).unwrap();
        let identity = service().verify(&token).unwrap();
        assert_eq!(identity.uid, user.uid);
        assert!(!identity.is_anonymous);
        assert_eq!(identity.email.as_deref(), Some("awa@marche.sn"));
        assert_eq!(identity.display_name(), "Awa");
    }

    #[test]
    fn test_anonymous_flag_survives() {
        let token = service().issue(&CurrentUser::anonymous()).unwrap();
        assert!(service().verify(&token).unwrap().is_anonymous);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = service().issue(&account()).unwrap();
        let forged_claims = service().issue(&account()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged_claims.split('.').nth(1).unwrap();
        let forged = parts.join(".");
        assert_eq!(service().verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let token = service().issue(&account()).unwrap();
        let (unsigned, _) = token.rsplit_once('.').unwrap();
        let forged = format!("{unsigned}.");
        assert!(service().verify(&forged).is_err());
    }

    #[test]
    fn test_other_key_rejected() {
        let token = service().issue(&account()).unwrap();
        let other = TokenService::new(SecretString::from("an0ther-k3y-entirely-1234567890abcd"));
        assert_eq!(other.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_expired_rejected() {
        let now = Utc::now().timestamp();
        let token = service().issue_at(&account(), now - 7200, now - 3600).unwrap();
        assert_eq!(service().verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(service().verify("pas-un-jeton"), Err(TokenError::Malformed));
        assert_eq!(service().verify("a.!!!"), Err(TokenError::Malformed));
    }
}
