//! Live-selling page and its event stream.

use std::collections::HashSet;
use std::convert::Infallible;
use std::time::Duration;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::{Stream, StreamExt};
use tracing::{instrument, warn};

use super::views::{FeaturedView, format_date};
use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, RequireAccount};
use crate::models::ChatMessage;
use crate::services::actions::forms::MAX_CHAT_MESSAGE;
use crate::state::AppState;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct MessageView {
    pub sender_name: String,
    pub text: String,
    pub time: String,
    pub mine: bool,
}

impl MessageView {
    fn new(message: &ChatMessage, viewer: marche_core::Uid) -> Self {
        Self {
            sender_name: message.sender_name.clone(),
            text: message.text.clone(),
            time: format!("{} {}", format_date(message.sent_at), message.sent_at.format("%H:%M")),
            mine: message.sender_id == viewer,
        }
    }
}

/// A product of the signed-in seller with its live toggle.
#[derive(Debug, Clone)]
pub struct ToggleView {
    pub product_id: String,
    pub name: String,
    pub featured: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "live.html")]
pub struct LiveTemplate {
    pub ctx: PageContext,
    pub messages: Vec<MessageView>,
    pub featured: Vec<FeaturedView>,
    pub own_products: Vec<ToggleView>,
    pub max_message: usize,
}

#[instrument(skip_all, fields(uid = %user.uid))]
pub async fn page(
    State(state): State<AppState>,
    RequireAccount(user): RequireAccount,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let store = state.store();
    let (messages, featured) = tokio::join!(store.messages(), store.featured_products());
    let (messages, featured) = (messages?, featured?);

    let own_products = if ctx.roles.is_seller {
        let featured_ids: HashSet<_> = featured.iter().map(|f| f.product_id).collect();
        state
            .cache()
            .seller_products(store, user.uid)
            .await?
            .iter()
            .map(|p| ToggleView {
                product_id: p.id.to_string(),
                name: p.name.clone(),
                featured: featured_ids.contains(&p.id),
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(LiveTemplate {
        ctx,
        messages: messages.iter().map(|m| MessageView::new(m, user.uid)).collect(),
        featured: featured.iter().map(FeaturedView::from).collect(),
        own_products,
        max_message: MAX_CHAT_MESSAGE,
    })
}

/// Server-Sent Events feed of live-session changes.
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let stream = state.live().subscribe().filter_map(|event| async move {
        Event::default()
            .event(event.name())
            .json_data(&event)
            .inspect_err(|e| warn!(error = %e, "Failed to encode live event"))
            .ok()
            .map(Ok)
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
