//! Identity bootstrap, route guard and identity extractors.
//!
//! Every request passes through [`identity_middleware`] first: it reads the
//! session identity, minting an anonymous one on the first visit, and stores
//! the result as a [`RequestIdentity`] extension. [`route_guard_middleware`]
//! then asks [`marche_core::access::evaluate`] whether the path renders.
//!
//! A session store failure leaves the identity unresolved, which the guard
//! and the role gate both treat as "no session".

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{FromRequestParts, Request},
    http::{StatusCode, header::LOCATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{Span, debug, info, warn};

use marche_core::access::{
    Decision, Input, LOGIN_PATH, NavLink, NavMenu, RoleGate, Roles, SessionState, evaluate, menu,
};

use crate::models::{Cart, CurrentUser, session_keys};
use crate::state::AppState;

/// Identity attached to the request by [`identity_middleware`].
///
/// `None` means the session could not be read.
#[derive(Debug, Clone)]
pub struct RequestIdentity(pub Option<CurrentUser>);

impl RequestIdentity {
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.0
            .as_ref()
            .map_or(SessionState::Failed, |user| SessionState::Resolved(Some(user.viewer())))
    }
}

/// Resolve the session identity, minting an anonymous one if needed.
pub async fn identity_middleware(session: Session, mut request: Request, next: Next) -> Response {
    let identity = match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            let user = CurrentUser::anonymous();
            match session.insert(session_keys::CURRENT_USER, &user).await {
                Ok(()) => {
                    debug!(uid = %user.uid, "Minted anonymous identity");
                    Some(user)
                }
                Err(e) => {
                    warn!(error = %e, "Failed to store anonymous identity");
                    None
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to read session identity");
            None
        }
    };

    if let Some(user) = &identity {
        Span::current().record("uid", tracing::field::display(user.uid));
    }
    request.extensions_mut().insert(RequestIdentity(identity));
    next.run(request).await
}

/// Body of redirects and of pages whose session is not known yet.
#[derive(Template, WebTemplate)]
#[template(path = "placeholder.html")]
pub struct PlaceholderTemplate;

/// Apply the route guard to the request path.
///
/// Requests that skipped the identity middleware count as failed sessions.
pub async fn route_guard_middleware(request: Request, next: Next) -> Response {
    let session = request
        .extensions()
        .get::<RequestIdentity>()
        .map_or(SessionState::Failed, RequestIdentity::session_state);

    match evaluate(request.uri().path(), session) {
        Decision::Render => next.run(request).await,
        Decision::Redirect(to) => {
            info!(path = %request.uri().path(), to, "Route guard redirect");
            (StatusCode::SEE_OTHER, [(LOCATION, to)], PlaceholderTemplate).into_response()
        }
        Decision::Placeholder => PlaceholderTemplate.into_response(),
    }
}

fn request_identity(parts: &Parts) -> Option<CurrentUser> {
    parts
        .extensions
        .get::<RequestIdentity>()
        .and_then(|identity| identity.0.clone())
}

/// The current identity, anonymous or not. `None` if the session failed.
pub struct CurrentIdentity(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(request_identity(parts)))
    }
}

/// Extractor that requires a signed-in (non-anonymous) identity.
///
/// Pages are redirected to the login page, `/api/` requests get a bare 401.
pub struct RequireAccount(pub CurrentUser);

/// Rejection of [`RequireAccount`].
pub enum AccountRejection {
    RedirectToLogin,
    Unauthorized,
}

impl IntoResponse for AccountRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAccount
where
    S: Send + Sync,
{
    type Rejection = AccountRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match request_identity(parts) {
            Some(user) if !user.is_anonymous => Ok(Self(user)),
            _ if parts.uri.path().starts_with("/api/") => Err(AccountRejection::Unauthorized),
            _ => Err(AccountRejection::RedirectToLogin),
        }
    }
}

/// One menu entry ready for the layout template.
#[derive(Debug, Clone)]
pub struct NavItem {
    pub href: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub pro: bool,
    pub active: bool,
}

impl NavItem {
    fn new(link: &NavLink, path: &str) -> Self {
        Self {
            href: link.href,
            label: link.label,
            icon: link.icon.name(),
            pro: link.pro,
            active: link.is_active(path),
        }
    }
}

/// Everything the shared layout needs: identity, roles, menu and cart badge.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub roles: Roles,
    pub path: String,
    pub nav: Vec<NavItem>,
    /// Skeleton rows shown instead of `nav` while roles are unsettled.
    pub nav_loading_rows: usize,
    pub logout: Option<NavItem>,
    pub cart_count: u32,
}

impl PageContext {
    /// Gather the role inputs for `identity` and build the context.
    ///
    /// The profile and the product count are only loaded for real accounts;
    /// a failed load settles as absent.
    pub async fn load(state: &AppState, identity: Option<CurrentUser>, path: &str, cart_count: u32) -> Self {
        let session = identity
            .as_ref()
            .map_or(Input::Failed, |user| Input::Ready(Some(user.viewer())));
        let mut gate = RoleGate::new().with_session(session);

        if let Some(uid) = gate.account_to_load() {
            let store = state.store();
            let (profile, count) =
                tokio::join!(store.profile(uid), store.count_products_by_seller(uid));
            let profile = profile
                .inspect_err(|e| warn!(error = %e, %uid, "Failed to load profile for roles"))
                .map(|p| p.map(|p| p.is_pro));
            let count = count
                .inspect_err(|e| warn!(error = %e, %uid, "Failed to count seller products"));
            gate = gate
                .with_profile(Input::from(profile))
                .with_product_count(Input::from(count));
        }

        let roles = gate.settle();
        let (nav, nav_loading_rows, logout) = match menu(roles) {
            NavMenu::Loading { rows } => (Vec::new(), rows, None),
            NavMenu::Ready { links, logout } => (
                links.iter().map(|link| NavItem::new(link, path)).collect(),
                0,
                logout.map(|link| NavItem::new(&link, path)),
            ),
        };

        Self {
            user: identity,
            roles: roles.unwrap_or(Roles::GUEST),
            path: path.to_string(),
            nav,
            nav_loading_rows,
            logout,
            cart_count,
        }
    }

    /// Name shown in the header, if signed in.
    #[must_use]
    pub fn account_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .filter(|user| !user.is_anonymous)
            .map(CurrentUser::display_name)
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = request_identity(parts);
        let cart_count = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<Cart>(session_keys::CART)
                .await
                .ok()
                .flatten()
                .map_or(0, |cart| cart.item_count()),
            None => 0,
        };

        Ok(Self::load(state, identity, parts.uri.path(), cart_count).await)
    }
}
