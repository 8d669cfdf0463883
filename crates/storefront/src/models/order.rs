//! Buyer orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marche_core::{OrderId, OrderStatus, Price, ProductId, Uid};

/// Denormalized order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Price,
}

impl OrderItem {
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: Uid,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// A pending order whose total is the sum of its lines.
    #[must_use]
    pub fn pending(buyer_id: Uid, items: Vec<OrderItem>) -> Self {
        let total_amount = items.iter().map(OrderItem::subtotal).sum();
        Self {
            id: OrderId::generate(),
            buyer_id,
            order_date: Utc::now(),
            total_amount,
            status: OrderStatus::Pending,
            items,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_total() {
        let items = vec![
            OrderItem {
                product_id: ProductId::generate(),
                product_name: "Mangues".to_string(),
                quantity: 3,
                unit_price: Price::parse("1.50").unwrap(),
            },
            OrderItem {
                product_id: ProductId::generate(),
                product_name: "Pain".to_string(),
                quantity: 1,
                unit_price: Price::parse("0.75").unwrap(),
            },
        ];
        let order = Order::pending(Uid::generate(), items);
        assert_eq!(order.total_amount, Decimal::new(525, 2));
        assert_eq!(order.status, OrderStatus::Pending);
    }
}
