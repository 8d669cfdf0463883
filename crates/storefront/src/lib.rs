//! Marché marketplace library.
//!
//! The binary in `main.rs` only wires configuration, the store and the
//! session store into [`app`]; everything else lives here so the router can
//! be exercised in-process by the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header::CACHE_CONTROL},
    middleware::from_fn,
    routing::get,
};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tower_sessions::SessionStore;

use crate::middleware::{
    create_session_layer, identity_middleware, request_id_middleware, route_guard_middleware,
    security_headers_middleware,
};
use crate::services::storage::UPLOADS_ROUTE;
use crate::state::AppState;

/// Directory of the stylesheet and page scripts.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the full application router.
///
/// Pages and the API sit behind the session, identity and route-guard
/// layers; health checks and static files do not touch the session.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(session_store, state.config());

    let pages = routes::routes(state.config().rate_limit)
        .layer(from_fn(route_guard_middleware))
        .layer(from_fn(identity_middleware))
        .layer(session_layer);

    Router::new()
        .merge(pages)
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest_service(
            "/static",
            // Asset URLs carry a content version, see `filters::asset_version`.
            tower::ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    CACHE_CONTROL,
                    HeaderValue::from_static("public, max-age=31536000, immutable"),
                ))
                .service(ServeDir::new(STATIC_DIR)),
        )
        .nest_service(UPLOADS_ROUTE, ServeDir::new(state.storage().root()))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                uid = tracing::field::Empty,
            )
        }))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
