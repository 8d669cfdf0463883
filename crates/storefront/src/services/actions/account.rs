//! Account actions: subscription, profile, notifications, ad optimizer.

use tracing::{info, instrument};

use marche_core::NotificationId;

use super::forms::{AdOptimizerForm, ProfileForm};
use super::{ActionData, ActionError, ActionResult, Actions, Done};
use crate::db::RepositoryError;
use crate::services::ai::{AdPlatformRecommendation, recommend_ad_platform};

const RECOMMENDATION_FAILED: &str = "La recommandation de l'IA a échoué.";

impl Actions<'_> {
    /// Mark the caller's profile as pro. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `ActionError` for an untrusted caller or a store failure.
    #[instrument(skip_all)]
    pub async fn upgrade_to_pro(&self, token: Option<&str>) -> ActionResult<Done> {
        let identity = self.authenticate(token)?;

        self.store
            .set_pro(identity.uid)
            .await
            .map_err(ActionError::store("Impossible de mettre à jour le compte."))?;

        info!(uid = %identity.uid, "Account upgraded to pro");
        self.cache.invalidate(&["/subscription"]);
        Ok(Done::new("Compte mis à jour vers Pro avec succès !"))
    }

    /// Merge contact details into the caller's profile.
    ///
    /// # Errors
    ///
    /// Returns `ActionError` on invalid input, an untrusted caller, or a
    /// store failure.
    #[instrument(skip_all)]
    pub async fn update_user_profile(&self, token: Option<&str>, form: &ProfileForm) -> ActionResult<Done> {
        let fields = form.validate().map_err(ActionError::Validation)?;
        let identity = self.authenticate(token)?;

        self.store
            .upsert_profile(identity.uid, fields)
            .await
            .map_err(ActionError::store("Impossible de mettre à jour le profil."))?;

        self.cache.invalidate(&["/profile"]);
        Ok(Done::new("Profil mis à jour avec succès !"))
    }

    /// Mark one of the caller's notifications as read.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NotFound` unless the caller owns the notification.
    #[instrument(skip_all, fields(%notification_id))]
    pub async fn mark_notification_read(
        &self,
        token: Option<&str>,
        notification_id: NotificationId,
    ) -> ActionResult<Done> {
        let identity = self.authenticate(token)?;

        self.store
            .mark_notification_read(identity.uid, notification_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ActionError::NotFound("La notification n'existe pas."),
                other => ActionError::store("Impossible de mettre à jour la notification.")(other),
            })?;

        self.cache.invalidate(&["/notifications"]);
        Ok(Done::new("Notification marquée comme lue."))
    }

    /// Ask the model which ad platform suits the seller's audience.
    ///
    /// Reserved to pro sellers.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::Ai` when the model is unavailable or fails.
    #[instrument(skip_all)]
    pub async fn recommend_ad_platform(
        &self,
        token: Option<&str>,
        form: &AdOptimizerForm,
    ) -> ActionResult<AdPlatformRecommendation> {
        let input = form.validate().map_err(ActionError::Validation)?;
        let identity = self.authenticate(token)?;

        let failed = ActionError::store(RECOMMENDATION_FAILED);
        let is_pro = self
            .store
            .profile(identity.uid)
            .await
            .map_err(failed)?
            .is_some_and(|p| p.is_pro);
        let products = self
            .store
            .count_products_by_seller(identity.uid)
            .await
            .map_err(ActionError::store(RECOMMENDATION_FAILED))?;
        if !is_pro || products == 0 {
            return Err(ActionError::Unauthenticated);
        }

        let model = self.ai.ok_or(ActionError::Ai {
            message: RECOMMENDATION_FAILED,
            source: None,
        })?;
        let recommendation = recommend_ad_platform(model, &input)
            .await
            .map_err(|e| ActionError::Ai {
                message: RECOMMENDATION_FAILED,
                source: Some(e),
            })?;

        Ok(ActionData {
            data: recommendation,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marche_core::{AdPlatform, Email, NotificationKind, Uid};

    use super::super::test_support::Harness;
    use super::*;
    use crate::db::MarketStore;
    use crate::models::{Notification, Product, ProductFields};
    use crate::services::ai::flows::tests::ScriptedModel;

    #[tokio::test]
    async fn test_upgrade_twice_succeeds() {
        let harness = Harness::new();
        let (uid, token) = harness.account_token("Awa");
        let actions = harness.actions();

        actions.upgrade_to_pro(Some(&token)).await.unwrap();
        let second = actions.upgrade_to_pro(Some(&token)).await.unwrap().data;
        assert_eq!(second.message, "Compte mis à jour vers Pro avec succès !");
        assert!(harness.store.profile(uid).await.unwrap().unwrap().is_pro);
    }

    #[tokio::test]
    async fn test_upgrade_rejects_anonymous() {
        let harness = Harness::new();
        let token = harness.anonymous_token();
        let err = harness.actions().upgrade_to_pro(Some(&token)).await.unwrap_err();
        assert!(matches!(err, ActionError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_profile_update_keeps_pro() {
        let harness = Harness::new();
        let (uid, token) = harness.account_token("Awa");
        let actions = harness.actions();
        actions.upgrade_to_pro(Some(&token)).await.unwrap();

        let form = ProfileForm {
            name: "Awa Diop".to_string(),
            email: "awa@marche.sn".to_string(),
            city: "Dakar".to_string(),
            ..ProfileForm::default()
        };
        actions.update_user_profile(Some(&token), &form).await.unwrap();

        let profile = harness.store.profile(uid).await.unwrap().unwrap();
        assert!(profile.is_pro);
        assert_eq!(profile.name, "Awa Diop");
        assert_eq!(profile.email, Some(Email::parse("awa@marche.sn").unwrap()));
    }

    #[tokio::test]
    async fn test_mark_other_users_notification() {
        let harness = Harness::new();
        let (_, token) = harness.account_token("Awa");
        let notification = Notification::new(
            Uid::generate(),
            NotificationKind::Promo,
            "Promo",
            "Soldes sur les sacs",
            None,
        );
        harness.store.insert_notification(&notification).await.unwrap();

        let err = harness
            .actions()
            .mark_notification_read(Some(&token), notification.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));
    }

    fn ad_form() -> AdOptimizerForm {
        AdOptimizerForm {
            customer_preferences: "Jeunes urbains, mode et accessoires".to_string(),
            sales_data: "Meilleures ventes via les stories".to_string(),
        }
    }

    #[tokio::test]
    async fn test_recommendation_requires_pro_seller() {
        let harness = Harness::new();
        let (uid, token) = harness.account_token("Awa");
        let model = ScriptedModel::answering(serde_json::json!({
            "recommendedPlatform": "Instagram",
            "reasoning": "Contenu visuel"
        }));
        let actions = harness.actions_with(&model);

        actions.upgrade_to_pro(Some(&token)).await.unwrap();
        let err = actions
            .recommend_ad_platform(Some(&token), &ad_form())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Unauthenticated));

        harness
            .store
            .insert_product(&Product::new(
                uid,
                ProductFields {
                    name: "Sac".to_string(),
                    description: "Sac en cuir tressé".to_string(),
                    price: marche_core::Price::parse("20").unwrap(),
                    category: marche_core::ProductCategory::Bags,
                    image_url: String::new(),
                    image_hint: String::new(),
                },
            ))
            .await
            .unwrap();

        let recommendation = actions
            .recommend_ad_platform(Some(&token), &ad_form())
            .await
            .unwrap()
            .data;
        assert_eq!(recommendation.recommended_platform, AdPlatform::Instagram);
    }

    #[tokio::test]
    async fn test_recommendation_failure_message() {
        let harness = Harness::new();
        let (uid, token) = harness.account_token("Awa");
        harness.store.set_pro(uid).await.unwrap();
        harness
            .store
            .insert_product(&Product::new(
                uid,
                ProductFields {
                    name: "Sac".to_string(),
                    description: "Sac en cuir tressé".to_string(),
                    price: marche_core::Price::parse("20").unwrap(),
                    category: marche_core::ProductCategory::Bags,
                    image_url: String::new(),
                    image_hint: String::new(),
                },
            ))
            .await
            .unwrap();

        let model = ScriptedModel::failing();
        let err = harness
            .actions_with(&model)
            .recommend_ad_platform(Some(&token), &ad_form())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "La recommandation de l'IA a échoué.");
        assert_eq!(err.status(), axum::http::StatusCode::BAD_GATEWAY);
    }
}
