//! Server actions.
//!
//! Every mutation of the marketplace goes through an action. Each action
//! runs the same steps in order:
//!
//! 1. validate the request shape into a typed value
//! 2. verify the caller's ID token (anonymous identities are rejected)
//! 3. check ownership of the record being changed
//! 4. write to the store
//! 5. invalidate the cached views the write affects
//!
//! Results use a uniform JSON envelope: `{"data": ...}` on success,
//! `{"error": "...", "fields": [...]}` on failure. An ownership failure is
//! reported exactly like an authentication failure.

mod account;
mod catalog;
pub mod forms;
mod live;
mod orders;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::db::{MarketStore, RepositoryError};
use crate::services::ai::{AiError, GenerativeModel};
use crate::services::auth::{TokenService, VerifiedIdentity};
use crate::services::cache::ViewCache;
use crate::services::live::LiveHub;
use crate::services::storage::ImageStorage;

pub use catalog::{ImageUploaded, ProductSaved};
pub use forms::{FieldError, ValidationErrors};
pub use orders::OrderPlaced;

/// Message for every authentication and authorization failure.
pub const UNAUTHORIZED_MESSAGE: &str = "Action non autorisée.";

/// Errors returned by server actions.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The request failed shape validation.
    #[error("validation failed")]
    Validation(ValidationErrors),

    /// Missing, invalid or anonymous token, or the caller does not own the record.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The record does not exist.
    #[error("not found: {0}")]
    NotFound(&'static str),

    /// The store failed; `message` is the user-facing text.
    #[error("store error: {source}")]
    Store {
        message: &'static str,
        #[source]
        source: RepositoryError,
    },

    /// The AI flow failed or is not configured.
    #[error("ai error: {message}")]
    Ai {
        message: &'static str,
        #[source]
        source: Option<AiError>,
    },
}

impl ActionError {
    /// Validation error on a single field.
    #[must_use]
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, message))
    }

    #[must_use]
    pub fn store(message: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |source| Self::Store { message, source }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Ai { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to show to the caller.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.summary(),
            Self::Unauthenticated => UNAUTHORIZED_MESSAGE.to_string(),
            Self::NotFound(message) | Self::Store { message, .. } | Self::Ai { message, .. } => {
                (*message).to_string()
            }
        }
    }
}

/// Failure envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub fields: Vec<FieldError>,
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        match &self {
            Self::Store { .. } | Self::Ai { .. } => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    source = ?std::error::Error::source(&self).map(ToString::to_string),
                    sentry_event_id = %event_id,
                    "Action failed"
                );
            }
            Self::Unauthenticated => warn!("Action rejected: unauthenticated or not owner"),
            Self::Validation(_) | Self::NotFound(_) => {}
        }

        let body = ErrorBody {
            error: self.user_message(),
            fields: match &self {
                Self::Validation(errors) => errors.fields().to_vec(),
                _ => Vec::new(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ActionData<T> {
    pub data: T,
}

impl<T: Serialize> IntoResponse for ActionData<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Payload of actions that only report a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Done {
    pub message: String,
}

impl Done {
    fn new(message: &str) -> ActionData<Self> {
        ActionData {
            data: Self {
                message: message.to_string(),
            },
        }
    }
}

/// Result type of every action.
pub type ActionResult<T> = Result<ActionData<T>, ActionError>;

/// Dependencies shared by the actions.
pub struct Actions<'a> {
    store: &'a dyn MarketStore,
    tokens: &'a TokenService,
    cache: &'a ViewCache,
    live: &'a LiveHub,
    storage: &'a ImageStorage,
    ai: Option<&'a dyn GenerativeModel>,
}

impl<'a> Actions<'a> {
    #[must_use]
    pub const fn new(
        store: &'a dyn MarketStore,
        tokens: &'a TokenService,
        cache: &'a ViewCache,
        live: &'a LiveHub,
        storage: &'a ImageStorage,
        ai: Option<&'a dyn GenerativeModel>,
    ) -> Self {
        Self {
            store,
            tokens,
            cache,
            live,
            storage,
            ai,
        }
    }

    /// Verify the caller's token and reject anonymous identities.
    fn authenticate(&self, token: Option<&str>) -> Result<VerifiedIdentity, ActionError> {
        let token = token.ok_or(ActionError::Unauthenticated)?;
        let identity = self.tokens.verify(token).map_err(|e| {
            warn!(error = %e, "Rejected ID token");
            ActionError::Unauthenticated
        })?;
        if identity.is_anonymous {
            return Err(ActionError::Unauthenticated);
        }
        sentry::configure_scope(|scope| scope.set_tag("uid", identity.uid));
        Ok(identity)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use secrecy::SecretString;

    use marche_core::Email;

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::CurrentUser;

    /// Everything an action needs, backed by the in-memory store.
    pub struct Harness {
        pub store: MemoryStore,
        pub tokens: TokenService,
        pub cache: ViewCache,
        pub live: LiveHub,
        pub storage: ImageStorage,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                store: MemoryStore::new(),
                tokens: TokenService::new(SecretString::from(
                    "t3st-t0ken-k3y-for-act10ns-0123456789",
                )),
                cache: ViewCache::new(),
                live: LiveHub::new(),
                storage: ImageStorage::new(std::env::temp_dir().join("marche-action-tests")),
            }
        }

        pub fn actions(&self) -> Actions<'_> {
            Actions::new(
                &self.store,
                &self.tokens,
                &self.cache,
                &self.live,
                &self.storage,
                None,
            )
        }

        pub fn actions_with<'a>(&'a self, model: &'a dyn GenerativeModel) -> Actions<'a> {
            Actions::new(
                &self.store,
                &self.tokens,
                &self.cache,
                &self.live,
                &self.storage,
                Some(model),
            )
        }

        /// Token of a fresh account identity.
        #[allow(clippy::unwrap_used)]
        pub fn account_token(&self, name: &str) -> (marche_core::Uid, String) {
            let user = CurrentUser {
                uid: marche_core::Uid::generate(),
                email: Some(Email::parse(&format!("{}@marche.sn", name.to_lowercase())).unwrap()),
                display_name: Some(name.to_string()),
                is_anonymous: false,
            };
            (user.uid, self.tokens.issue(&user).unwrap())
        }

        #[allow(clippy::unwrap_used)]
        pub fn anonymous_token(&self) -> String {
            self.tokens.issue(&CurrentUser::anonymous()).unwrap()
        }
    }
}
