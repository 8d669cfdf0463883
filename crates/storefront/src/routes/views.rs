//! Display data shared by several templates.
//!
//! Templates receive preformatted strings only: prices, dates and labels
//! are rendered here so the markup stays logic-free.

use chrono::{DateTime, Utc};

use marche_core::format_amount;

use crate::models::{CartLine, FeaturedProduct, Notification, Order, Product};

/// Date as shown on orders and notifications, e.g. `05/03/2026`.
#[must_use]
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    /// Raw amount, used to prefill the edit form.
    pub price_value: String,
    pub category: &'static str,
    pub image_url: String,
    pub image_hint: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.display(),
            price_value: product.price.amount().to_string(),
            category: product.category.label(),
            image_url: product.image_url.clone(),
            image_hint: product.image_hint.clone(),
        }
    }
}

/// Live-session card, from the featured copy rather than the catalog.
#[derive(Debug, Clone)]
pub struct FeaturedView {
    pub product_id: String,
    pub name: String,
    pub price: String,
    pub category: &'static str,
    pub image_url: String,
    pub image_hint: String,
}

impl From<&FeaturedProduct> for FeaturedView {
    fn from(featured: &FeaturedProduct) -> Self {
        Self {
            product_id: featured.product_id.to_string(),
            name: featured.name.clone(),
            price: featured.price.display(),
            category: featured.category.label(),
            image_url: featured.image_url.clone(),
            image_hint: featured.image_hint.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
    pub image_url: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.to_string(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price.display(),
            subtotal: format_amount(line.subtotal()),
            image_url: line.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub subtotal: String,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    /// First eight characters of the id, as shown to buyers.
    pub reference: String,
    pub date: String,
    pub status: &'static str,
    pub total: String,
    pub items: Vec<OrderItemView>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let id = order.id.to_string();
        Self {
            reference: id.chars().take(8).collect(),
            date: format_date(order.order_date),
            status: order.status.label(),
            total: format_amount(order.total_amount),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item.product_name.clone(),
                    quantity: item.quantity,
                    subtotal: format_amount(item.subtotal()),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: &'static str,
    pub is_read: bool,
    pub link: Option<String>,
    pub date: String,
}

impl From<&Notification> for NotificationView {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            title: notification.title.clone(),
            description: notification.description.clone(),
            icon: notification.kind.icon(),
            is_read: notification.is_read,
            link: notification.link.clone(),
            date: format_date(notification.created_at),
        }
    }
}
