//! Live-selling session documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marche_core::{MessageId, Price, ProductCategory, ProductId, Uid};

use super::Product;

/// The marketplace runs a single live session.
pub const LIVE_SESSION_ID: &str = "main_session";

/// A chat message. Messages are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender_id: Uid,
    pub sender_name: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    #[must_use]
    pub fn new(sender_id: Uid, sender_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            sender_id,
            sender_name: sender_name.into(),
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Display-only copy of a product shown during the live session.
///
/// Later edits to the product do not propagate; the seller toggles the
/// product off and on again to refresh it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedProduct {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub image_url: String,
    pub image_hint: String,
    pub category: ProductCategory,
    pub seller_id: Uid,
    pub featured_at: DateTime<Utc>,
}

impl From<&Product> for FeaturedProduct {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            image_hint: product.image_hint.clone(),
            category: product.category,
            seller_id: product.seller_id,
            featured_at: Utc::now(),
        }
    }
}

/// Build the transcript sent to the chat summarizer: one `sender: text` line
/// per message, in delivery order.
#[must_use]
pub fn transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.sender_name, m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_lines() {
        let uid = Uid::generate();
        let messages = vec![
            ChatMessage::new(uid, "Awa", "Bonjour !"),
            ChatMessage::new(uid, "Moussa", "Le prix du sac ?"),
        ];
        assert_eq!(transcript(&messages), "Awa: Bonjour !\nMoussa: Le prix du sac ?");
        assert_eq!(transcript(&[]), "");
    }
}
