//! Integration tests for Marché.
//!
//! The whole router runs in-process against the in-memory store and an
//! in-memory session store; no database or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marche-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `navigation` - Menu composition and route guard
//! - `catalog_actions` - Product actions and ownership
//! - `account` - Signup, login, subscription and profile
//! - `checkout` - Cart, orders and notifications
//! - `live_session` - Chat, featured products and chat summary
//! - `session_failure` - Route guard with an unavailable session store

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderValue, Method, Request, StatusCode, header};
use axum::response::Response;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use marche_storefront::app;
use marche_storefront::config::MarketConfig;
use marche_storefront::db::{MarketStore, MemoryStore};
use marche_storefront::middleware::session::SESSION_COOKIE_NAME;
use marche_storefront::services::ai::{AiError, GenerativeModel, StructuredPrompt};
use marche_storefront::state::AppState;

/// Password used by every test account.
pub const PASSWORD: &str = "motdepasse-solide";

/// Configuration for tests: no database, no AI key, no rate limiting and
/// uploads in a fresh temporary directory.
#[must_use]
pub fn test_config() -> MarketConfig {
    MarketConfig {
        database_url: None,
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        token_secret: SecretString::from("k9Xq2vLm7Rt4Wz8Bn3Hc6Yp1Ds5Gf0Ja".to_string()),
        uploads_dir: std::env::temp_dir().join(format!("marche-test-{}", uuid::Uuid::new_v4())),
        ai: None,
        rate_limit: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Model that answers every prompt with the same JSON and counts calls.
pub struct FixedModel {
    answer: Value,
    pub calls: AtomicUsize,
}

impl FixedModel {
    #[must_use]
    pub const fn new(answer: Value) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeModel for FixedModel {
    async fn generate(&self, _prompt: StructuredPrompt) -> Result<Value, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}

/// The application plus the shared store, for tests that inspect state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Application without an AI model.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Application whose AI flows use `model`.
    #[must_use]
    pub fn with_model(model: Arc<dyn GenerativeModel>) -> Self {
        Self::build(Some(model))
    }

    fn build(model: Option<Arc<dyn GenerativeModel>>) -> Self {
        let store: Arc<dyn MarketStore> = Arc::new(MemoryStore::new());
        let state = AppState::with_model(test_config(), store, model);
        let router = app(state.clone(), tower_sessions::MemoryStore::default());
        Self { router, state }
    }

    #[must_use]
    pub fn store(&self) -> &dyn MarketStore {
        self.state.store()
    }

    /// A browser with an empty cookie jar.
    #[must_use]
    pub fn client(&self) -> Client {
        Client {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// A browser signed in to a fresh account.
    pub async fn signed_in(&self, name: &str, email: &str) -> Client {
        let mut client = self.client();
        let response = client
            .post_form(
                "/signup",
                &format!("name={name}&email={email}&password={PASSWORD}"),
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "signup failed for {email}");
        client
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoded JSON reply of an action.
#[derive(Debug)]
pub struct ActionReply {
    pub status: StatusCode,
    pub body: Value,
}

impl ActionReply {
    /// The `data` payload of a successful action.
    #[must_use]
    pub fn data(&self) -> &Value {
        assert!(self.status.is_success(), "action failed: {} {}", self.status, self.body);
        &self.body["data"]
    }

    /// The `error` message of a failed action.
    #[must_use]
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// One browser session: keeps the session cookie between requests.
pub struct Client {
    router: Router,
    cookie: Option<String>,
}

impl Client {
    /// Send a request with the session cookie and remember any new one.
    pub async fn send(&mut self, mut request: Request<Body>) -> Response {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let value = value.to_str().unwrap();
            if let Some(pair) = value.split(';').next()
                && pair.starts_with(&format!("{SESSION_COOKIE_NAME}="))
            {
                self.cookie = Some(pair.to_string());
            }
        }
        response
    }

    pub async fn get(&mut self, path: &str) -> Response {
        self.send(Request::get(path).body(Body::empty()).unwrap()).await
    }

    /// GET a page and return its status and HTML.
    pub async fn page(&mut self, path: &str) -> (StatusCode, String) {
        let response = self.get(path).await;
        let status = response.status();
        (status, body_text(response).await)
    }

    pub async fn post_form(&mut self, path: &str, body: &str) -> Response {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Fetch an ID token for the current session.
    pub async fn token(&mut self) -> String {
        let response = self.get("/api/auth/token").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    /// Call a server action with a fresh token.
    pub async fn action(&mut self, method: Method, path: &str, body: Option<Value>) -> ActionReply {
        let token = self.token().await;
        self.action_with_token(method, path, body, Some(&token)).await
    }

    /// Call a server action with an explicit (possibly missing) token.
    pub async fn action_with_token(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> ActionReply {
        let mut request = Request::builder()
            .method(method)
            .uri(format!("/api/actions{path}"))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = body.map_or_else(|| "{}".to_string(), |v| v.to_string());
        let response = self.send(request.body(Body::from(body)).unwrap()).await;

        let status = response.status();
        let text = body_text(response).await;
        ActionReply {
            status,
            body: serde_json::from_str(&text).unwrap_or(Value::Null),
        }
    }

    /// Add a product owned by this client and return its id.
    pub async fn add_product(&mut self, name: &str, price: &str) -> String {
        let reply = self
            .action(Method::POST, "/products", Some(product_json(name, price)))
            .await;
        reply.data()["product_id"].as_str().unwrap().to_string()
    }
}

/// A valid product form.
#[must_use]
pub fn product_json(name: &str, price: &str) -> Value {
    serde_json::json!({
        "name": name,
        "description": "Un produit frais du marché local.",
        "price": price,
        "category": "Fruits",
        "image_url": "https://picsum.photos/seed/test/600/400",
        "image_hint": "fruits",
    })
}

/// Read a response body as UTF-8 text.
pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
