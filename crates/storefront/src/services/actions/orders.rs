//! Checkout simulation.

use serde::Serialize;
use tracing::{info, instrument};

use marche_core::{NotificationKind, OrderId, format_amount};

use super::{ActionData, ActionError, ActionResult, Actions};
use crate::models::{Cart, Notification, Order};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderPlaced {
    pub message: String,
    pub order_id: OrderId,
}

impl Actions<'_> {
    /// Turn the cart into a pending order plus an order notification.
    ///
    /// The caller empties the cart once this succeeds.
    ///
    /// # Errors
    ///
    /// Returns a `cart` validation error for an empty cart.
    #[instrument(skip_all, fields(lines = cart.lines.len()))]
    pub async fn place_order(&self, token: Option<&str>, cart: &Cart) -> ActionResult<OrderPlaced> {
        if cart.is_empty() {
            return Err(ActionError::field("cart", "Votre panier est vide."));
        }
        let identity = self.authenticate(token)?;

        let order = Order::pending(identity.uid, cart.order_items());
        let notification = Notification::new(
            identity.uid,
            NotificationKind::Order,
            "Commande confirmée",
            format!(
                "Votre commande de {} a bien été enregistrée.",
                format_amount(order.total_amount)
            ),
            Some("/orders".to_string()),
        );

        self.store
            .insert_order(&order, &notification)
            .await
            .map_err(ActionError::store("Impossible de passer la commande."))?;

        info!(order_id = %order.id, buyer_id = %identity.uid, total = %order.total_amount, "Order placed");
        self.cache.invalidate(&["/orders", "/notifications"]);

        Ok(ActionData {
            data: OrderPlaced {
                message: "Commande passée avec succès !".to_string(),
                order_id: order.id,
            },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marche_core::{OrderStatus, Price, ProductCategory, Uid};

    use super::super::test_support::Harness;
    use super::*;
    use crate::db::MarketStore;
    use crate::models::{Product, ProductFields};

    #[tokio::test]
    async fn test_place_order_creates_order_and_notification() {
        let harness = Harness::new();
        let (buyer, token) = harness.account_token("Fatou");
        let bread = Product::new(
            Uid::generate(),
            ProductFields {
                name: "Pain de mie".to_string(),
                description: "Pain frais du matin".to_string(),
                price: Price::parse("1.25").unwrap(),
                category: ProductCategory::Bakery,
                image_url: String::new(),
                image_hint: String::new(),
            },
        );
        let mut cart = Cart::default();
        cart.add(&bread, 2);

        harness.actions().place_order(Some(&token), &cart).await.unwrap();

        let orders = harness.store.orders_for(buyer).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Pending);
        assert_eq!(orders[0].total_amount, cart.total());

        let notifications = harness.store.notifications_for(buyer).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Order);
        assert_eq!(notifications[0].link.as_deref(), Some("/orders"));
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let harness = Harness::new();
        let (_, token) = harness.account_token("Fatou");
        let err = harness
            .actions()
            .place_order(Some(&token), &Cart::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Validation(_)));
    }
}
