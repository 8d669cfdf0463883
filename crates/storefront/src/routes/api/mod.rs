//! JSON API: ID tokens and server actions.

pub mod actions;
pub mod token;

use axum::{extract::FromRequestParts, http::request::Parts};

/// Bearer token of the `Authorization` header, if any.
///
/// Never rejects: a missing token is reported by the action itself, with the
/// same envelope as an invalid one.
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    fn parse(header: &str) -> Option<String> {
        let (scheme, token) = header.trim().split_once(' ')?;
        let token = token.trim();
        (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(Self::parse);
        Ok(Self(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(BearerToken::parse("Bearer abc.def").as_deref(), Some("abc.def"));
        assert_eq!(BearerToken::parse("bearer  abc ").as_deref(), Some("abc"));
        assert_eq!(BearerToken::parse("Basic abc"), None);
        assert_eq!(BearerToken::parse("Bearer"), None);
        assert_eq!(BearerToken::parse("Bearer "), None);
    }
}
