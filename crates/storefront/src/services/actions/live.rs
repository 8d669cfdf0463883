//! Live-session actions.

use tracing::{info, instrument};

use marche_core::ProductId;

use super::forms::ChatForm;
use super::{ActionData, ActionError, ActionResult, Actions, Done};
use crate::models::live::transcript;
use crate::models::{ChatMessage, FeaturedProduct};
use crate::services::ai::{ChatSummary, ChatSummaryInput, summarize_live_chat};
use crate::services::live::LiveEvent;

const SUMMARY_FAILED: &str = "L'analyse du chat par l'IA a échoué.";

impl Actions<'_> {
    /// Append a message to the live chat.
    ///
    /// # Errors
    ///
    /// Returns `ActionError` on an empty or too long message, an untrusted
    /// caller, or a store failure.
    #[instrument(skip_all)]
    pub async fn post_chat_message(&self, token: Option<&str>, form: &ChatForm) -> ActionResult<ChatMessage> {
        let text = form.validate().map_err(ActionError::Validation)?;
        let identity = self.authenticate(token)?;

        let message = ChatMessage::new(identity.uid, identity.display_name(), text);
        self.store
            .append_message(&message)
            .await
            .map_err(ActionError::store("Impossible d'envoyer le message."))?;

        self.live.publish(LiveEvent::Message(message.clone()));
        Ok(ActionData { data: message })
    }

    /// Show or hide one of the caller's products in the live session.
    ///
    /// Featuring stores a display copy of the product; toggling it off and
    /// on again refreshes that copy.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::Unauthenticated` when the caller is not the
    /// product's seller.
    #[instrument(skip_all, fields(%product_id, featured))]
    pub async fn set_featured_product(
        &self,
        token: Option<&str>,
        product_id: ProductId,
        featured: bool,
    ) -> ActionResult<Done> {
        const FAILED: &str = "Impossible de mettre à jour le live.";

        let identity = self.authenticate(token)?;
        let product = self.owned_product(product_id, identity.uid, FAILED).await?;

        if featured {
            let copy = FeaturedProduct::from(&product);
            self.store
                .feature_product(&copy)
                .await
                .map_err(ActionError::store(FAILED))?;
            self.live.publish(LiveEvent::Featured(copy));
        } else {
            self.store
                .unfeature_product(product_id)
                .await
                .map_err(ActionError::store(FAILED))?;
            self.live.publish(LiveEvent::Unfeatured { product_id });
        }

        info!(seller_id = %identity.uid, "Live feature toggled");
        self.cache.invalidate(&["/live"]);
        Ok(Done::new(if featured {
            "Produit mis en avant dans le live."
        } else {
            "Produit retiré du live."
        }))
    }

    /// Summarize the live chat for the seller.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::Ai` when the model is unavailable or fails.
    #[instrument(skip_all)]
    pub async fn summarize_live_chat(&self, token: Option<&str>) -> ActionResult<ChatSummary> {
        let identity = self.authenticate(token)?;

        let products = self
            .store
            .count_products_by_seller(identity.uid)
            .await
            .map_err(ActionError::store(SUMMARY_FAILED))?;
        if products == 0 {
            return Err(ActionError::Unauthenticated);
        }

        let messages = self
            .store
            .messages()
            .await
            .map_err(ActionError::store(SUMMARY_FAILED))?;
        let input = ChatSummaryInput {
            chat_transcription: transcript(&messages),
        };

        // A blank transcript is answered without the model.
        if input.chat_transcription.trim().is_empty() {
            return Ok(ActionData {
                data: ChatSummary::empty(),
            });
        }

        let model = self.ai.ok_or(ActionError::Ai {
            message: SUMMARY_FAILED,
            source: None,
        })?;
        let summary = summarize_live_chat(model, &input)
            .await
            .map_err(|e| ActionError::Ai {
                message: SUMMARY_FAILED,
                source: Some(e),
            })?;
        Ok(ActionData { data: summary })
    }
}
