//! Route guard behavior when the session store is unavailable.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};

use marche_integration_tests::{body_text, test_config};
use marche_storefront::app;
use marche_storefront::db::{MarketStore, MemoryStore};
use marche_storefront::middleware::session::SESSION_COOKIE_NAME;
use marche_storefront::state::AppState;

/// Session store whose backend is always down.
#[derive(Debug, Clone)]
struct UnavailableStore;

fn unavailable() -> session_store::Error {
    session_store::Error::Backend("session backend unavailable".to_string())
}

#[async_trait]
impl SessionStore for UnavailableStore {
    async fn save(&self, _record: &Record) -> session_store::Result<()> {
        Err(unavailable())
    }

    async fn load(&self, _session_id: &Id) -> session_store::Result<Option<Record>> {
        Err(unavailable())
    }

    async fn delete(&self, _session_id: &Id) -> session_store::Result<()> {
        Err(unavailable())
    }
}

#[tokio::test]
async fn test_unreadable_session_is_redirected_to_login() {
    let store: Arc<dyn MarketStore> = Arc::new(MemoryStore::new());
    let state = AppState::with_model(test_config(), store, None);
    let router = app(state, UnavailableStore);

    // A returning visitor: the cookie forces a load from the failing store.
    let cookie = format!("{SESSION_COOKIE_NAME}={}", Id::default());

    for path in ["/orders", "/profile", "/vendeur/mes-produits"] {
        let request = Request::get(path)
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.headers()[header::LOCATION], "/login");
        let html = body_text(response).await;
        assert!(html.contains("Chargement"), "{path} should only show the placeholder");
        assert!(!html.contains("Mes commandes"));
    }
}
