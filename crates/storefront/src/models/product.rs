//! Catalog products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marche_core::{Price, ProductCategory, ProductId, Uid};

/// A product listed by a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: ProductCategory,
    pub image_url: String,
    pub image_hint: String,
    /// Owner; the only identity allowed to change or delete the product.
    pub seller_id: Uid,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Build a new product owned by `seller_id`.
    #[must_use]
    pub fn new(seller_id: Uid, fields: ProductFields) -> Self {
        Self {
            id: ProductId::generate(),
            name: fields.name,
            description: fields.description,
            price: fields.price,
            category: fields.category,
            image_url: fields.image_url,
            image_hint: fields.image_hint,
            seller_id,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_owned_by(&self, uid: Uid) -> bool {
        self.seller_id == uid
    }

    /// Replace the editable fields, keeping identity and ownership.
    pub fn apply(&mut self, fields: ProductFields) {
        self.name = fields.name;
        self.description = fields.description;
        self.price = fields.price;
        self.category = fields.category;
        self.image_url = fields.image_url;
        self.image_hint = fields.image_hint;
    }
}

/// Validated, seller-editable product fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: ProductCategory,
    pub image_url: String,
    pub image_hint: String,
}
