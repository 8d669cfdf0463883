//! Document store for the marketplace.
//!
//! Everything the application persists goes through [`MarketStore`]. Two
//! implementations exist:
//!
//! - [`PgStore`] - `PostgreSQL`, used whenever a database URL is configured
//! - [`MemoryStore`] - process memory, used for local development and tests
//!
//! # Tables (schema `marche`)
//!
//! - `user_account` - Password accounts
//! - `user_profile` - Contact details and pro flag
//! - `product` - Catalog
//! - `customer_order` - Orders with denormalized line items
//! - `notification` - Per-user notifications
//! - `live_message`, `live_featured_product` - Live session sub-collections
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p marche-cli -- migrate
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use marche_core::{Email, NotificationId, ProductId, Uid};

use crate::models::{
    ChatMessage, FeaturedProduct, NewAccount, Notification, Order, Product, ProductFields,
    ProfileFields, UserAccount, UserProfile,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Store operations used by the marketplace.
///
/// Collections are returned in a fixed order: products and orders newest
/// first, notifications newest first, chat messages oldest first.
#[async_trait]
pub trait MarketStore: Send + Sync {
    // Accounts

    /// Create an account and its empty profile (`is_pro = false`).
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken.
    async fn create_account(&self, account: NewAccount) -> Result<UserAccount, RepositoryError>;
    async fn account_by_email(&self, email: &Email) -> Result<Option<UserAccount>, RepositoryError>;
    async fn account_by_uid(&self, uid: Uid) -> Result<Option<UserAccount>, RepositoryError>;

    // Profiles

    async fn profile(&self, uid: Uid) -> Result<Option<UserProfile>, RepositoryError>;
    /// Merge contact fields into the profile, creating it if needed.
    async fn upsert_profile(
        &self,
        uid: Uid,
        fields: ProfileFields,
    ) -> Result<UserProfile, RepositoryError>;
    /// Set `is_pro`, creating an empty profile if needed. Idempotent.
    async fn set_pro(&self, uid: Uid) -> Result<(), RepositoryError>;

    // Products

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn products_by_seller(&self, seller_id: Uid) -> Result<Vec<Product>, RepositoryError>;
    async fn count_products_by_seller(&self, seller_id: Uid) -> Result<u64, RepositoryError>;
    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError>;
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    async fn update_product(
        &self,
        id: ProductId,
        fields: ProductFields,
    ) -> Result<Product, RepositoryError>;
    /// Deletes the product and its live-session feature, if any.
    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError>;

    // Orders

    /// Store the order and its notification atomically.
    async fn insert_order(
        &self,
        order: &Order,
        notification: &Notification,
    ) -> Result<(), RepositoryError>;
    async fn orders_for(&self, buyer_id: Uid) -> Result<Vec<Order>, RepositoryError>;

    // Notifications

    async fn insert_notification(&self, notification: &Notification) -> Result<(), RepositoryError>;
    async fn notifications_for(&self, user_id: Uid) -> Result<Vec<Notification>, RepositoryError>;
    /// Returns `RepositoryError::NotFound` unless `user_id` owns the notification.
    async fn mark_notification_read(
        &self,
        user_id: Uid,
        id: NotificationId,
    ) -> Result<(), RepositoryError>;

    // Live session

    async fn append_message(&self, message: &ChatMessage) -> Result<(), RepositoryError>;
    async fn messages(&self) -> Result<Vec<ChatMessage>, RepositoryError>;
    async fn feature_product(&self, featured: &FeaturedProduct) -> Result<(), RepositoryError>;
    async fn unfeature_product(&self, product_id: ProductId) -> Result<(), RepositoryError>;
    async fn featured_products(&self) -> Result<Vec<FeaturedProduct>, RepositoryError>;

    /// Cheap connectivity probe for readiness checks.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
