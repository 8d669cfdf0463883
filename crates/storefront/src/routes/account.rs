//! Buyer pages: orders, notifications, profile and subscription.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use marche_core::Email;

use super::views::{NotificationView, OrderView};
use crate::error::Result;
use crate::filters;
use crate::middleware::{CurrentIdentity, PageContext, RequireAccount};
use crate::models::{Address, UserProfile};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub ctx: PageContext,
    pub orders: Vec<OrderView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "account/notifications.html")]
pub struct NotificationsTemplate {
    pub ctx: PageContext,
    pub signed_in: bool,
    pub notifications: Vec<NotificationView>,
    pub unread: usize,
}

/// Profile form values.
#[derive(Debug, Clone, Default)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
}

#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub ctx: PageContext,
    pub profile: ProfileView,
    pub is_pro: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "account/subscription.html")]
pub struct SubscriptionTemplate {
    pub ctx: PageContext,
    pub is_pro: bool,
    pub features_free: &'static [&'static str],
    pub features_pro: &'static [&'static str],
}

const FEATURES_FREE: [&str; 3] = [
    "Jusqu'à 10 produits",
    "Gestion des commandes de base",
    "Profil de vendeur public",
];

const FEATURES_PRO: [&str; 4] = [
    "Nombre de produits illimité",
    "Accès à l'Optimiseur de Publicité IA",
    "Mise en avant des produits",
    "Support prioritaire",
];

#[instrument(skip_all, fields(uid = %user.uid))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAccount(user): RequireAccount,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let orders = state.store().orders_for(user.uid).await?;
    Ok(OrdersTemplate {
        ctx,
        orders: orders.iter().map(OrderView::from).collect(),
    })
}

/// Notifications of the signed-in user; guests get a login prompt.
#[instrument(skip_all)]
pub async fn notifications(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let Some(user) = identity.filter(|user| !user.is_anonymous) else {
        return Ok(NotificationsTemplate {
            ctx,
            signed_in: false,
            notifications: Vec::new(),
            unread: 0,
        });
    };

    let notifications: Vec<NotificationView> = state
        .store()
        .notifications_for(user.uid)
        .await?
        .iter()
        .map(NotificationView::from)
        .collect();
    let unread = notifications.iter().filter(|n| !n.is_read).count();

    Ok(NotificationsTemplate {
        ctx,
        signed_in: true,
        notifications,
        unread,
    })
}

/// Profile form, prefilled from the stored profile or the session.
#[instrument(skip_all, fields(uid = %user.uid))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAccount(user): RequireAccount,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let stored = state.store().profile(user.uid).await?;
    let is_pro = stored.as_ref().is_some_and(|p| p.is_pro);

    let profile = match stored {
        Some(UserProfile {
            name,
            email,
            phone,
            address,
            ..
        }) => ProfileView {
            name: if name.is_empty() { user.display_name().to_string() } else { name },
            email: email
                .or_else(|| user.email.clone())
                .map(Email::into_inner)
                .unwrap_or_default(),
            phone,
            address,
        },
        None => ProfileView {
            name: user.display_name().to_string(),
            email: user.email.as_ref().map(ToString::to_string).unwrap_or_default(),
            ..ProfileView::default()
        },
    };

    Ok(ProfileTemplate {
        ctx,
        profile,
        is_pro,
    })
}

pub async fn subscription(ctx: PageContext) -> impl IntoResponse {
    let is_pro = ctx.roles.is_pro_user;
    SubscriptionTemplate {
        ctx,
        is_pro,
        features_free: &FEATURES_FREE,
        features_pro: &FEATURES_PRO,
    }
}
