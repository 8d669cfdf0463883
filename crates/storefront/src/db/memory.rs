//! In-memory store.
//!
//! Holds every collection behind a single `tokio::sync::RwLock`. Used when
//! no database is configured and by the test suites.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use marche_core::{Email, NotificationId, ProductId, Uid};

use super::{MarketStore, RepositoryError};
use crate::models::{
    ChatMessage, FeaturedProduct, NewAccount, Notification, Order, Product, ProductFields,
    ProfileFields, UserAccount, UserProfile,
};

#[derive(Default)]
struct Collections {
    accounts: HashMap<Uid, UserAccount>,
    profiles: HashMap<Uid, UserProfile>,
    products: HashMap<ProductId, Product>,
    orders: Vec<Order>,
    notifications: Vec<Notification>,
    messages: Vec<ChatMessage>,
    featured: Vec<FeaturedProduct>,
}

/// Store kept in process memory. Data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn create_account(&self, account: NewAccount) -> Result<UserAccount, RepositoryError> {
        let mut data = self.data.write().await;
        if data.accounts.values().any(|a| a.email == account.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let created = UserAccount {
            uid: account.uid,
            email: account.email,
            display_name: account.display_name,
            password_hash: account.password_hash,
            created_at: Utc::now(),
        };
        let mut profile = UserProfile::empty(created.uid);
        profile.name.clone_from(&created.display_name);
        profile.email = Some(created.email.clone());

        data.profiles.insert(created.uid, profile);
        data.accounts.insert(created.uid, created.clone());
        Ok(created)
    }

    async fn account_by_email(&self, email: &Email) -> Result<Option<UserAccount>, RepositoryError> {
        let data = self.data.read().await;
        Ok(data.accounts.values().find(|a| &a.email == email).cloned())
    }

    async fn account_by_uid(&self, uid: Uid) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(self.data.read().await.accounts.get(&uid).cloned())
    }

    async fn profile(&self, uid: Uid) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.data.read().await.profiles.get(&uid).cloned())
    }

    async fn upsert_profile(
        &self,
        uid: Uid,
        fields: ProfileFields,
    ) -> Result<UserProfile, RepositoryError> {
        let mut data = self.data.write().await;
        let profile = data
            .profiles
            .entry(uid)
            .or_insert_with(|| UserProfile::empty(uid));
        profile.merge(fields);
        Ok(profile.clone())
    }

    async fn set_pro(&self, uid: Uid) -> Result<(), RepositoryError> {
        let mut data = self.data.write().await;
        let profile = data
            .profiles
            .entry(uid)
            .or_insert_with(|| UserProfile::empty(uid));
        profile.is_pro = true;
        profile.updated_at = Utc::now();
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let data = self.data.read().await;
        let mut products: Vec<Product> = data.products.values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.data.read().await.products.get(&id).cloned())
    }

    async fn products_by_seller(&self, seller_id: Uid) -> Result<Vec<Product>, RepositoryError> {
        let mut products = self.list_products().await?;
        products.retain(|p| p.seller_id == seller_id);
        Ok(products)
    }

    async fn count_products_by_seller(&self, seller_id: Uid) -> Result<u64, RepositoryError> {
        let data = self.data.read().await;
        let count = data
            .products
            .values()
            .filter(|p| p.seller_id == seller_id)
            .count();
        Ok(count as u64)
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut data = self.data.write().await;
        if data.products.contains_key(&product.id) {
            return Err(RepositoryError::Conflict("product already exists".to_owned()));
        }
        data.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update_product(
        &self,
        id: ProductId,
        fields: ProductFields,
    ) -> Result<Product, RepositoryError> {
        let mut data = self.data.write().await;
        let product = data.products.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        product.apply(fields);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut data = self.data.write().await;
        data.products.remove(&id).ok_or(RepositoryError::NotFound)?;
        data.featured.retain(|f| f.product_id != id);
        Ok(())
    }

    async fn insert_order(
        &self,
        order: &Order,
        notification: &Notification,
    ) -> Result<(), RepositoryError> {
        let mut data = self.data.write().await;
        data.orders.push(order.clone());
        data.notifications.push(notification.clone());
        Ok(())
    }

    async fn orders_for(&self, buyer_id: Uid) -> Result<Vec<Order>, RepositoryError> {
        let data = self.data.read().await;
        let mut orders: Vec<Order> = data
            .orders
            .iter()
            .filter(|o| o.buyer_id == buyer_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(orders)
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<(), RepositoryError> {
        self.data.write().await.notifications.push(notification.clone());
        Ok(())
    }

    async fn notifications_for(&self, user_id: Uid) -> Result<Vec<Notification>, RepositoryError> {
        let data = self.data.read().await;
        let mut notifications: Vec<Notification> = data
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn mark_notification_read(
        &self,
        user_id: Uid,
        id: NotificationId,
    ) -> Result<(), RepositoryError> {
        let mut data = self.data.write().await;
        let notification = data
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .ok_or(RepositoryError::NotFound)?;
        notification.is_read = true;
        Ok(())
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        self.data.write().await.messages.push(message.clone());
        Ok(())
    }

    async fn messages(&self) -> Result<Vec<ChatMessage>, RepositoryError> {
        let mut messages = self.data.read().await.messages.clone();
        // Stable sort keeps insertion order for equal timestamps.
        messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
        Ok(messages)
    }

    async fn feature_product(&self, featured: &FeaturedProduct) -> Result<(), RepositoryError> {
        let mut data = self.data.write().await;
        data.featured.retain(|f| f.product_id != featured.product_id);
        data.featured.push(featured.clone());
        Ok(())
    }

    async fn unfeature_product(&self, product_id: ProductId) -> Result<(), RepositoryError> {
        self.data
            .write()
            .await
            .featured
            .retain(|f| f.product_id != product_id);
        Ok(())
    }

    async fn featured_products(&self) -> Result<Vec<FeaturedProduct>, RepositoryError> {
        Ok(self.data.read().await.featured.clone())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marche_core::{Price, ProductCategory};

    use super::*;

    fn fields(name: &str) -> ProductFields {
        ProductFields {
            name: name.to_string(),
            description: "Une description suffisante".to_string(),
            price: Price::parse("4.20").unwrap(),
            category: ProductCategory::Bakery,
            image_url: "https://picsum.photos/seed/pain/600/400".to_string(),
            image_hint: "pain".to_string(),
        }
    }

    fn account(email: &str) -> NewAccount {
        NewAccount {
            uid: Uid::generate(),
            email: Email::parse(email).unwrap(),
            display_name: "Awa".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_account_creates_profile() {
        let store = MemoryStore::new();
        let created = store.create_account(account("awa@marche.sn")).await.unwrap();
        let profile = store.profile(created.uid).await.unwrap().unwrap();
        assert!(!profile.is_pro);
        assert_eq!(profile.name, "Awa");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_account(account("awa@marche.sn")).await.unwrap();
        let result = store.create_account(account("awa@marche.sn")).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_set_pro_is_idempotent_and_creates_profile() {
        let store = MemoryStore::new();
        let uid = Uid::generate();
        store.set_pro(uid).await.unwrap();
        store.set_pro(uid).await.unwrap();
        assert!(store.profile(uid).await.unwrap().unwrap().is_pro);
    }

    #[tokio::test]
    async fn test_seller_products_and_count() {
        let store = MemoryStore::new();
        let seller = Uid::generate();
        store.insert_product(&Product::new(seller, fields("Pain"))).await.unwrap();
        store
            .insert_product(&Product::new(Uid::generate(), fields("Autre")))
            .await
            .unwrap();
        assert_eq!(store.count_products_by_seller(seller).await.unwrap(), 1);
        assert_eq!(store.products_by_seller(seller).await.unwrap().len(), 1);
        assert_eq!(store.list_products().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_removes_feature() {
        let store = MemoryStore::new();
        let product = Product::new(Uid::generate(), fields("Pain"));
        store.insert_product(&product).await.unwrap();
        store.feature_product(&FeaturedProduct::from(&product)).await.unwrap();
        store.delete_product(product.id).await.unwrap();
        assert!(store.featured_products().await.unwrap().is_empty());
        assert!(matches!(
            store.delete_product(product.id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_mark_read_checks_owner() {
        let store = MemoryStore::new();
        let owner = Uid::generate();
        let notification = Notification::new(
            owner,
            marche_core::NotificationKind::System,
            "Bienvenue",
            "Bienvenue sur Marché",
            None,
        );
        store.insert_notification(&notification).await.unwrap();
        assert!(matches!(
            store.mark_notification_read(Uid::generate(), notification.id).await,
            Err(RepositoryError::NotFound)
        ));
        store.mark_notification_read(owner, notification.id).await.unwrap();
        assert!(store.notifications_for(owner).await.unwrap()[0].is_read);
    }
}
