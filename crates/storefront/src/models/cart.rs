//! Session-stored shopping cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marche_core::{Price, ProductId};

use super::{OrderItem, Product};

/// Maximum quantity of a single line.
pub const MAX_LINE_QUANTITY: u32 = 99;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub image_url: String,
}

impl CartLine {
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Add `quantity` units of `product`, merging with an existing line.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity).min(MAX_LINE_QUANTITY);
            return;
        }
        self.lines.push(CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity: quantity.min(MAX_LINE_QUANTITY),
            image_url: product.image_url.clone(),
        });
    }

    /// Set a line's quantity; zero removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity.min(MAX_LINE_QUANTITY);
        }
    }

    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Lines as denormalized order items.
    #[must_use]
    pub fn order_items(&self) -> Vec<OrderItem> {
        self.lines
            .iter()
            .map(|l| OrderItem {
                product_id: l.product_id,
                product_name: l.name.clone(),
                quantity: l.quantity,
                unit_price: l.unit_price,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marche_core::{ProductCategory, Uid};

    use super::*;
    use crate::models::ProductFields;

    fn product(name: &str, price: &str) -> Product {
        Product::new(
            Uid::generate(),
            ProductFields {
                name: name.to_string(),
                description: "Produit de test du marché".to_string(),
                price: Price::parse(price).unwrap(),
                category: ProductCategory::Fruits,
                image_url: String::new(),
                image_hint: String::new(),
            },
        )
    }

    #[test]
    fn test_add_merges_lines() {
        let mango = product("Mangue", "2");
        let mut cart = Cart::default();
        cart.add(&mango, 1);
        cart.add(&mango, 2);
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Decimal::new(6, 0));
    }

    #[test]
    fn test_quantity_capped() {
        let mango = product("Mangue", "2");
        let mut cart = Cart::default();
        cart.add(&mango, 500);
        assert_eq!(cart.item_count(), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mango = product("Mangue", "2");
        let bread = product("Pain", "0.5");
        let mut cart = Cart::default();
        cart.add(&mango, 1);
        cart.add(&bread, 4);
        cart.set_quantity(mango.id, 0);
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total(), Decimal::new(2, 0));
    }

    #[test]
    fn test_order_items_copy_lines() {
        let bread = product("Pain", "0.5");
        let mut cart = Cart::default();
        cart.add(&bread, 2);
        let items = cart.order_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, "Pain");
        assert_eq!(items[0].quantity, 2);
    }
}
