//! HTTP bindings of the server actions.
//!
//! Every handler takes the caller's bearer token and a JSON body and
//! returns the action envelope. Malformed bodies are reported as a
//! validation error on `body` rather than axum's plain-text rejection.

use axum::extract::{FromRequest, Multipart, Path, State, rejection::JsonRejection};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use marche_core::{NotificationId, ProductId};

use super::BearerToken;
use crate::models::ChatMessage;
use crate::routes::cart::{load_cart, save_cart};
use crate::services::actions::forms::{AdOptimizerForm, ChatForm, ProductForm, ProfileForm};
use crate::services::actions::{
    ActionError, ActionResult, Done, ImageUploaded, OrderPlaced, ProductSaved,
};
use crate::services::ai::{AdPlatformRecommendation, ChatSummary};
use crate::state::AppState;

/// Multipart field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image";

/// JSON body whose rejection uses the action envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ActionError))]
pub struct ActionJson<T>(pub T);

impl From<JsonRejection> for ActionError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection, "Malformed action body");
        Self::field("body", "Requête invalide.")
    }
}

#[derive(Debug, Deserialize)]
pub struct FeatureToggle {
    pub featured: bool,
}

// =============================================================================
// Catalog
// =============================================================================

#[instrument(skip_all)]
pub async fn add_product(
    State(state): State<AppState>,
    token: BearerToken,
    ActionJson(form): ActionJson<ProductForm>,
) -> ActionResult<ProductSaved> {
    state.actions().add_product(token.as_deref(), &form).await
}

#[instrument(skip(state, token, form))]
pub async fn update_product(
    State(state): State<AppState>,
    token: BearerToken,
    Path(id): Path<ProductId>,
    ActionJson(form): ActionJson<ProductForm>,
) -> ActionResult<ProductSaved> {
    state.actions().update_product(token.as_deref(), id, &form).await
}

#[instrument(skip(state, token))]
pub async fn delete_product(
    State(state): State<AppState>,
    token: BearerToken,
    Path(id): Path<ProductId>,
) -> ActionResult<Done> {
    state.actions().delete_product(token.as_deref(), id).await
}

/// Store the `image` field of a multipart upload.
#[instrument(skip_all)]
pub async fn upload_image(
    State(state): State<AppState>,
    token: BearerToken,
    mut multipart: Multipart,
) -> ActionResult<ImageUploaded> {
    let unreadable = |e: axum::extract::multipart::MultipartError| {
        warn!(error = %e, "Unreadable upload");
        ActionError::field(IMAGE_FIELD, "Le fichier n'a pas pu être lu.")
    };

    while let Some(field) = multipart.next_field().await.map_err(unreadable)? {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field.bytes().await.map_err(unreadable)?;
            return state.actions().upload_image(token.as_deref(), &bytes).await;
        }
    }
    Err(ActionError::field(IMAGE_FIELD, "Aucune image fournie."))
}

// =============================================================================
// Account
// =============================================================================

#[instrument(skip_all)]
pub async fn upgrade_to_pro(State(state): State<AppState>, token: BearerToken) -> ActionResult<Done> {
    state.actions().upgrade_to_pro(token.as_deref()).await
}

#[instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    token: BearerToken,
    ActionJson(form): ActionJson<ProfileForm>,
) -> ActionResult<Done> {
    state.actions().update_user_profile(token.as_deref(), &form).await
}

#[instrument(skip(state, token))]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    token: BearerToken,
    Path(id): Path<NotificationId>,
) -> ActionResult<Done> {
    state.actions().mark_notification_read(token.as_deref(), id).await
}

#[instrument(skip_all)]
pub async fn recommend_ad_platform(
    State(state): State<AppState>,
    token: BearerToken,
    ActionJson(form): ActionJson<AdOptimizerForm>,
) -> ActionResult<AdPlatformRecommendation> {
    state.actions().recommend_ad_platform(token.as_deref(), &form).await
}

// =============================================================================
// Orders
// =============================================================================

/// Turn the session cart into an order and empty the cart.
#[instrument(skip_all)]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    token: BearerToken,
) -> ActionResult<OrderPlaced> {
    const CART_UNAVAILABLE: &str = "Impossible de lire votre panier.";

    let mut cart = load_cart(&session).await.map_err(|e| {
        warn!(error = %e, "Cart unavailable at checkout");
        ActionError::field("cart", CART_UNAVAILABLE)
    })?;

    let placed = state.actions().place_order(token.as_deref(), &cart).await?;

    cart.clear();
    if let Err(e) = save_cart(&session, &cart).await {
        // The order is already stored.
        warn!(error = %e, order_id = %placed.data.order_id, "Failed to empty cart");
    }
    Ok(placed)
}

// =============================================================================
// Live session
// =============================================================================

#[instrument(skip_all)]
pub async fn post_chat_message(
    State(state): State<AppState>,
    token: BearerToken,
    ActionJson(form): ActionJson<ChatForm>,
) -> ActionResult<ChatMessage> {
    state.actions().post_chat_message(token.as_deref(), &form).await
}

#[instrument(skip(state, token, toggle))]
pub async fn set_featured_product(
    State(state): State<AppState>,
    token: BearerToken,
    Path(id): Path<ProductId>,
    ActionJson(toggle): ActionJson<FeatureToggle>,
) -> ActionResult<Done> {
    state
        .actions()
        .set_featured_product(token.as_deref(), id, toggle.featured)
        .await
}

#[instrument(skip_all)]
pub async fn summarize_live_chat(
    State(state): State<AppState>,
    token: BearerToken,
) -> ActionResult<ChatSummary> {
    state.actions().summarize_live_chat(token.as_deref()).await
}
