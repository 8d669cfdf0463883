//! Live-session fan-out.
//!
//! Writes to the live session are published on an in-process broadcast
//! channel and pushed to connected viewers over Server-Sent Events. Events
//! are passed through as they arrive; a viewer that falls behind skips the
//! events it missed and reloads the page for a full view.

use futures::Stream;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use marche_core::ProductId;

use crate::models::{ChatMessage, FeaturedProduct};

/// Events buffered per subscriber before it starts lagging.
const CHANNEL_CAPACITY: usize = 256;

/// A change to the live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    Message(ChatMessage),
    Featured(FeaturedProduct),
    Unfeatured { product_id: ProductId },
}

impl LiveEvent {
    /// SSE event name, equal to the serialized `type` tag.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Featured(_) => "featured",
            Self::Unfeatured { .. } => "unfeatured",
        }
    }
}

/// Broadcast hub for the live session.
#[derive(Debug, Clone)]
pub struct LiveHub {
    sender: broadcast::Sender<LiveEvent>,
}

impl Default for LiveHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveHub {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event. Having no subscriber is not an error.
    pub fn publish(&self, event: LiveEvent) {
        match self.sender.send(event) {
            Ok(receivers) => debug!(receivers, "Live event published"),
            Err(_) => debug!("Live event published with no viewers"),
        }
    }

    /// Stream of events published after this call.
    pub fn subscribe(&self) -> impl Stream<Item = LiveEvent> + Send + 'static + use<> {
        let mut receiver = self.sender.subscribe();
        async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(event) => yield event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Live viewer lagged behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures::StreamExt;
    use marche_core::Uid;

    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_in_order() {
        let hub = LiveHub::new();
        let stream = hub.subscribe();
        futures::pin_mut!(stream);

        let uid = Uid::generate();
        let first = ChatMessage::new(uid, "Awa", "Bonjour");
        let second = ChatMessage::new(uid, "Awa", "Combien ?");
        hub.publish(LiveEvent::Message(first.clone()));
        hub.publish(LiveEvent::Message(second.clone()));

        assert_eq!(stream.next().await.unwrap(), LiveEvent::Message(first));
        assert_eq!(stream.next().await.unwrap(), LiveEvent::Message(second));
    }

    #[test]
    fn test_publish_without_viewers() {
        LiveHub::new().publish(LiveEvent::Unfeatured {
            product_id: ProductId::generate(),
        });
    }

    #[test]
    fn test_event_json_is_tagged() {
        let json = serde_json::to_value(LiveEvent::Unfeatured {
            product_id: ProductId::generate(),
        })
        .unwrap();
        assert_eq!(json["type"], "unfeatured");
    }
}
