//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::MarketConfig;
use crate::db::MarketStore;
use crate::services::actions::Actions;
use crate::services::ai::{AiError, ClaudeClient, GenerativeModel};
use crate::services::auth::{AuthService, TokenService};
use crate::services::cache::ViewCache;
use crate::services::live::LiveHub;
use crate::services::storage::ImageStorage;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store, the services built on it, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MarketConfig,
    store: Arc<dyn MarketStore>,
    tokens: TokenService,
    cache: ViewCache,
    live: LiveHub,
    storage: ImageStorage,
    ai: Option<Arc<dyn GenerativeModel>>,
}

impl AppState {
    /// Create the application state, connecting the AI flows when an API
    /// key is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the AI client cannot be built.
    pub fn new(config: MarketConfig, store: Arc<dyn MarketStore>) -> Result<Self, AiError> {
        let ai = match &config.ai {
            Some(ai_config) => {
                Some(Arc::new(ClaudeClient::new(ai_config)?) as Arc<dyn GenerativeModel>)
            }
            None => {
                tracing::warn!("ANTHROPIC_API_KEY not set, AI flows disabled");
                None
            }
        };
        Ok(Self::with_model(config, store, ai))
    }

    /// Create the application state with an explicit model.
    #[must_use]
    pub fn with_model(
        config: MarketConfig,
        store: Arc<dyn MarketStore>,
        ai: Option<Arc<dyn GenerativeModel>>,
    ) -> Self {
        let tokens = TokenService::new(config.token_secret.clone());
        let storage = ImageStorage::new(config.uploads_dir.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                tokens,
                cache: ViewCache::new(),
                live: LiveHub::new(),
                storage,
                ai,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn MarketStore {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    #[must_use]
    pub fn cache(&self) -> &ViewCache {
        &self.inner.cache
    }

    #[must_use]
    pub fn live(&self) -> &LiveHub {
        &self.inner.live
    }

    #[must_use]
    pub fn storage(&self) -> &ImageStorage {
        &self.inner.storage
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.store())
    }

    /// Server actions bound to this state.
    #[must_use]
    pub fn actions(&self) -> Actions<'_> {
        Actions::new(
            self.store(),
            &self.inner.tokens,
            &self.inner.cache,
            &self.inner.live,
            &self.inner.storage,
            self.inner.ai.as_deref(),
        )
    }
}
