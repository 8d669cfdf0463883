//! ID token endpoint.
//!
//! Pages call `GET /api/auth/token` right before invoking a server action
//! and send the token back as `Authorization: Bearer <token>`.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::CurrentIdentity;
use crate::services::auth::tokens::TOKEN_LIFETIME;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    /// Seconds until expiry.
    pub expires_in: u64,
    pub anonymous: bool,
}

/// Issue a token for the session identity, anonymous or not.
#[instrument(skip_all)]
pub async fn issue(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<impl IntoResponse> {
    let user = identity.ok_or_else(|| AppError::Unauthorized("session indisponible".to_string()))?;
    let token = state.tokens().issue(&user)?;
    Ok(Json(TokenResponse {
        token,
        expires_in: TOKEN_LIFETIME.as_secs(),
        anonymous: user.is_anonymous,
    }))
}
