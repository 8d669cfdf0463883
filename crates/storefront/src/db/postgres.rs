//! `PostgreSQL` store.
//!
//! Queries are checked at runtime (`sqlx::query_as`) so the crate builds
//! without a live database. Rows are decoded into `*Row` structs and then
//! validated into domain models.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use marche_core::{
    Email, MessageId, NotificationId, NotificationKind, OrderId, OrderStatus, Price,
    ProductCategory, ProductId, Uid,
};

use super::{MarketStore, RepositoryError};
use crate::models::{
    Address, ChatMessage, FeaturedProduct, LIVE_SESSION_ID, NewAccount, Notification, Order,
    OrderItem, Product, ProductFields, ProfileFields, UserAccount, UserProfile,
};

/// Store backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn price(amount: Decimal, what: &str) -> Result<Price, RepositoryError> {
    Price::new(amount)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {what} price: {e}")))
}

fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

// =============================================================================
// Rows
// =============================================================================

#[derive(FromRow)]
struct AccountRow {
    uid: Uid,
    email: Email,
    display_name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for UserAccount {
    fn from(r: AccountRow) -> Self {
        Self {
            uid: r.uid,
            email: r.email,
            display_name: r.display_name,
            password_hash: r.password_hash,
            created_at: r.created_at,
        }
    }
}

#[derive(FromRow)]
struct ProfileRow {
    uid: Uid,
    name: String,
    email: Option<Email>,
    phone: String,
    street: String,
    city: String,
    state: String,
    zip: String,
    country: String,
    is_pro: bool,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for UserProfile {
    fn from(r: ProfileRow) -> Self {
        Self {
            uid: r.uid,
            name: r.name,
            email: r.email,
            phone: r.phone,
            address: Address {
                street: r.street,
                city: r.city,
                state: r.state,
                zip: r.zip,
                country: r.country,
            },
            is_pro: r.is_pro,
            updated_at: r.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    category: ProductCategory,
    image_url: String,
    image_hint: String,
    seller_id: Uid,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(r: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            name: r.name,
            description: r.description,
            price: price(r.price, "product")?,
            category: r.category,
            image_url: r.image_url,
            image_hint: r.image_hint,
            seller_id: r.seller_id,
            created_at: r.created_at,
        })
    }
}

#[derive(FromRow)]
struct OrderRow {
    id: OrderId,
    buyer_id: Uid,
    order_date: DateTime<Utc>,
    total_amount: Decimal,
    status: OrderStatus,
    items: Json<Vec<OrderItem>>,
}

impl From<OrderRow> for Order {
    fn from(r: OrderRow) -> Self {
        Self {
            id: r.id,
            buyer_id: r.buyer_id,
            order_date: r.order_date,
            total_amount: r.total_amount,
            status: r.status,
            items: r.items.0,
        }
    }
}

#[derive(FromRow)]
struct NotificationRow {
    id: NotificationId,
    user_id: Uid,
    title: String,
    description: String,
    kind: NotificationKind,
    is_read: bool,
    link: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(r: NotificationRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            description: r.description,
            kind: r.kind,
            is_read: r.is_read,
            link: r.link,
            created_at: r.created_at,
        }
    }
}

#[derive(FromRow)]
struct MessageRow {
    id: MessageId,
    sender_id: Uid,
    sender_name: String,
    text: String,
    sent_at: DateTime<Utc>,
}

impl From<MessageRow> for ChatMessage {
    fn from(r: MessageRow) -> Self {
        Self {
            id: r.id,
            sender_id: r.sender_id,
            sender_name: r.sender_name,
            text: r.text,
            sent_at: r.sent_at,
        }
    }
}

#[derive(FromRow)]
struct FeaturedRow {
    product_id: ProductId,
    name: String,
    price: Decimal,
    image_url: String,
    image_hint: String,
    category: ProductCategory,
    seller_id: Uid,
    featured_at: DateTime<Utc>,
}

impl TryFrom<FeaturedRow> for FeaturedProduct {
    type Error = RepositoryError;

    fn try_from(r: FeaturedRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: r.product_id,
            name: r.name,
            price: price(r.price, "featured product")?,
            image_url: r.image_url,
            image_hint: r.image_hint,
            category: r.category,
            seller_id: r.seller_id,
            featured_at: r.featured_at,
        })
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, category, image_url, image_hint, seller_id, created_at";

const PROFILE_COLUMNS: &str =
    "uid, name, email, phone, street, city, state, zip, country, is_pro, updated_at";

// =============================================================================
// Store
// =============================================================================

#[async_trait]
impl MarketStore for PgStore {
    async fn create_account(&self, account: NewAccount) -> Result<UserAccount, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: AccountRow = sqlx::query_as(
            r"
            INSERT INTO marche.user_account (uid, email, display_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING uid, email, display_name, password_hash, created_at
            ",
        )
        .bind(account.uid)
        .bind(&account.email)
        .bind(&account.display_name)
        .bind(&account.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "email already exists"))?;

        sqlx::query(
            r"
            INSERT INTO marche.user_profile (uid, name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (uid) DO NOTHING
            ",
        )
        .bind(account.uid)
        .bind(&account.display_name)
        .bind(&account.email)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn account_by_email(&self, email: &Email) -> Result<Option<UserAccount>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r"
            SELECT uid, email, display_name, password_hash, created_at
            FROM marche.user_account
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn account_by_uid(&self, uid: Uid) -> Result<Option<UserAccount>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r"
            SELECT uid, email, display_name, password_hash, created_at
            FROM marche.user_account
            WHERE uid = $1
            ",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn profile(&self, uid: Uid) -> Result<Option<UserProfile>, RepositoryError> {
        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM marche.user_profile WHERE uid = $1"
        ))
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn upsert_profile(
        &self,
        uid: Uid,
        fields: ProfileFields,
    ) -> Result<UserProfile, RepositoryError> {
        let row: ProfileRow = sqlx::query_as(&format!(
            r"
            INSERT INTO marche.user_profile
                (uid, name, email, phone, street, city, state, zip, country)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (uid) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                street = EXCLUDED.street,
                city = EXCLUDED.city,
                state = EXCLUDED.state,
                zip = EXCLUDED.zip,
                country = EXCLUDED.country,
                updated_at = NOW()
            RETURNING {PROFILE_COLUMNS}
            "
        ))
        .bind(uid)
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(&fields.address.street)
        .bind(&fields.address.city)
        .bind(&fields.address.state)
        .bind(&fields.address.zip)
        .bind(&fields.address.country)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn set_pro(&self, uid: Uid) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO marche.user_profile (uid, is_pro)
            VALUES ($1, TRUE)
            ON CONFLICT (uid) DO UPDATE SET is_pro = TRUE, updated_at = NOW()
            ",
        )
        .bind(uid)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM marche.product ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Product::try_from).collect()
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM marche.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Product::try_from).transpose()
    }

    async fn products_by_seller(&self, seller_id: Uid) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM marche.product WHERE seller_id = $1 ORDER BY created_at DESC"
        ))
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Product::try_from).collect()
    }

    async fn count_products_by_seller(&self, seller_id: Uid) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM marche.product WHERE seller_id = $1")
            .bind(seller_id)
            .fetch_one(&self.pool)
            .await?;
        u64::try_from(count).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO marche.product
                (id, name, description, price, category, image_url, image_hint, seller_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(product.category)
        .bind(&product.image_url)
        .bind(&product.image_hint)
        .bind(product.seller_id)
        .bind(product.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "product already exists"))?;
        Ok(())
    }

    async fn update_product(
        &self,
        id: ProductId,
        fields: ProductFields,
    ) -> Result<Product, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r"
            UPDATE marche.product
            SET name = $2, description = $3, price = $4, category = $5,
                image_url = $6, image_hint = $7
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.price.amount())
        .bind(fields.category)
        .bind(&fields.image_url)
        .bind(&fields.image_hint)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM marche.live_featured_product WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM marche.product WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn insert_order(
        &self,
        order: &Order,
        notification: &Notification,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO marche.customer_order (id, buyer_id, order_date, total_amount, status, items)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(order.id)
        .bind(order.buyer_id)
        .bind(order.order_date)
        .bind(order.total_amount)
        .bind(order.status)
        .bind(Json(&order.items))
        .execute(&mut *tx)
        .await?;

        insert_notification_row(&mut *tx, notification).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn orders_for(&self, buyer_id: Uid) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r"
            SELECT id, buyer_id, order_date, total_amount, status, items
            FROM marche.customer_order
            WHERE buyer_id = $1
            ORDER BY order_date DESC
            ",
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<(), RepositoryError> {
        insert_notification_row(&self.pool, notification).await
    }

    async fn notifications_for(&self, user_id: Uid) -> Result<Vec<Notification>, RepositoryError> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            r"
            SELECT id, user_id, title, description, kind, is_read, link, created_at
            FROM marche.notification
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn mark_notification_read(
        &self,
        user_id: Uid,
        id: NotificationId,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE marche.notification SET is_read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO marche.live_message (id, session_id, sender_id, sender_name, text, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(message.id)
        .bind(LIVE_SESSION_ID)
        .bind(message.sender_id)
        .bind(&message.sender_name)
        .bind(&message.text)
        .bind(message.sent_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn messages(&self) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            r"
            SELECT id, sender_id, sender_name, text, sent_at
            FROM marche.live_message
            WHERE session_id = $1
            ORDER BY sent_at ASC
            ",
        )
        .bind(LIVE_SESSION_ID)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn feature_product(&self, featured: &FeaturedProduct) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO marche.live_featured_product
                (session_id, product_id, name, price, image_url, image_hint, category, seller_id, featured_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (session_id, product_id) DO UPDATE SET
                name = EXCLUDED.name,
                price = EXCLUDED.price,
                image_url = EXCLUDED.image_url,
                image_hint = EXCLUDED.image_hint,
                category = EXCLUDED.category,
                featured_at = EXCLUDED.featured_at
            ",
        )
        .bind(LIVE_SESSION_ID)
        .bind(featured.product_id)
        .bind(&featured.name)
        .bind(featured.price.amount())
        .bind(&featured.image_url)
        .bind(&featured.image_hint)
        .bind(featured.category)
        .bind(featured.seller_id)
        .bind(featured.featured_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn unfeature_product(&self, product_id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM marche.live_featured_product WHERE session_id = $1 AND product_id = $2")
            .bind(LIVE_SESSION_ID)
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn featured_products(&self) -> Result<Vec<FeaturedProduct>, RepositoryError> {
        let rows: Vec<FeaturedRow> = sqlx::query_as(
            r"
            SELECT product_id, name, price, image_url, image_hint, category, seller_id, featured_at
            FROM marche.live_featured_product
            WHERE session_id = $1
            ORDER BY featured_at ASC
            ",
        )
        .bind(LIVE_SESSION_ID)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(FeaturedProduct::try_from).collect()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

async fn insert_notification_row<'e, E>(
    executor: E,
    notification: &Notification,
) -> Result<(), RepositoryError>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query(
        r"
        INSERT INTO marche.notification
            (id, user_id, title, description, kind, is_read, link, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ",
    )
    .bind(notification.id)
    .bind(notification.user_id)
    .bind(&notification.title)
    .bind(&notification.description)
    .bind(notification.kind)
    .bind(notification.is_read)
    .bind(&notification.link)
    .bind(notification.created_at)
    .execute(executor)
    .await?;
    Ok(())
}
