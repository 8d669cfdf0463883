//! HTTP route handlers for the marketplace.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                            - Redirect to /products
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (store ping)
//!
//! # Catalog
//! GET  /products                    - Product grid (?categorie=)
//! GET  /products/{id}               - Product detail
//! GET  /strategie                   - Communication strategy
//! GET  /devenir-vendeur             - Seller landing page
//!
//! # Cart & checkout
//! GET  /cart                        - Cart page
//! POST /cart/add                    - Add a product
//! POST /cart/update                 - Set a line's quantity (0 removes)
//! POST /cart/remove                 - Remove a line
//! GET  /checkout                    - Summary and payment providers
//!
//! # Auth (rate limited)
//! GET  /login, POST /login          - Login form
//! GET  /signup, POST /signup        - Signup form
//! GET  /logout, POST /logout        - Drop the session
//!
//! # Account (protected except notifications)
//! GET  /orders                      - Order history
//! GET  /notifications               - Notifications
//! GET  /profile                     - Profile form
//! GET  /subscription                - Pro subscription
//!
//! # Seller (protected)
//! GET  /live                        - Live session
//! GET  /live/events                 - Live session SSE feed
//! GET  /vendeur/mes-produits        - Own products
//! GET  /vendeur/ajouter-produit     - New product form
//! GET  /vendeur/modifier-produit/{id} - Edit form
//! GET  /vendeur/ad-optimizer        - AI ad optimizer (pro sellers)
//!
//! # JSON API
//! GET    /api/auth/token                          - ID token for the session
//! POST   /api/actions/products                    - add_product
//! PUT    /api/actions/products/{id}               - update_product
//! DELETE /api/actions/products/{id}               - delete_product
//! POST   /api/actions/uploads                     - upload_image (multipart)
//! POST   /api/actions/subscription                - upgrade_to_pro
//! PUT    /api/actions/profile                     - update_user_profile
//! POST   /api/actions/notifications/{id}/read     - mark_notification_read
//! POST   /api/actions/orders                      - place_order (session cart)
//! POST   /api/actions/live/messages               - post_chat_message
//! PUT    /api/actions/live/featured/{id}          - set_featured_product
//! POST   /api/actions/live/summary                - summarize_live_chat
//! POST   /api/actions/ad-optimizer                - recommend_ad_platform
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod live;
pub mod seller;
pub mod views;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use crate::middleware::{action_rate_limiter, auth_rate_limiter};
use crate::services::storage::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Multipart framing allowance on top of the image itself.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Catalog and content pages.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::home))
        .route("/products", get(catalog::index))
        .route("/products/{id}", get(catalog::show))
        .route("/strategie", get(catalog::strategie))
        .route("/devenir-vendeur", get(catalog::devenir_vendeur))
}

/// Cart and checkout pages.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/checkout", get(cart::checkout))
}

/// Login, signup and logout.
pub fn auth_routes(rate_limit: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup));
    let router = if rate_limit {
        router.layer(auth_rate_limiter())
    } else {
        router
    };
    router.route("/logout", get(auth::logout).post(auth::logout))
}

/// Buyer account pages.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(account::orders))
        .route("/notifications", get(account::notifications))
        .route("/profile", get(account::profile))
        .route("/subscription", get(account::subscription))
}

/// Live session and seller pages.
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/live", get(live::page))
        .route("/live/events", get(live::events))
        .route("/vendeur/mes-produits", get(seller::my_products))
        .route("/vendeur/ajouter-produit", get(seller::add_product))
        .route("/vendeur/modifier-produit/{id}", get(seller::edit_product))
        .route("/vendeur/ad-optimizer", get(seller::ad_optimizer))
}

/// Token endpoint and server actions, nested under `/api`.
pub fn api_routes(rate_limit: bool) -> Router<AppState> {
    use api::actions;

    let action_routes = Router::new()
        .route("/products", post(actions::add_product))
        .route(
            "/products/{id}",
            put(actions::update_product).delete(actions::delete_product),
        )
        .route(
            "/uploads",
            post(actions::upload_image)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + UPLOAD_OVERHEAD_BYTES)),
        )
        .route("/subscription", post(actions::upgrade_to_pro))
        .route("/profile", put(actions::update_profile))
        .route("/notifications/{id}/read", post(actions::mark_notification_read))
        .route("/orders", post(actions::place_order))
        .route("/live/messages", post(actions::post_chat_message))
        .route("/live/featured/{id}", put(actions::set_featured_product))
        .route("/live/summary", post(actions::summarize_live_chat))
        .route("/ad-optimizer", post(actions::recommend_ad_platform));
    let action_routes = if rate_limit {
        action_routes.layer(action_rate_limiter())
    } else {
        action_routes
    };

    Router::new()
        .route("/auth/token", get(api::token::issue))
        .nest("/actions", action_routes)
}

/// Every page and API route.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .merge(cart_routes())
        .merge(auth_routes(rate_limit))
        .merge(account_routes())
        .merge(seller_routes())
        .nest("/api", api_routes(rate_limit))
}
