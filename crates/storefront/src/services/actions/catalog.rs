//! Product actions.

use serde::Serialize;
use tracing::{info, instrument};

use marche_core::ProductId;

use super::forms::{ImageChoice, ProductForm};
use super::{ActionData, ActionError, ActionResult, Actions, Done};
use crate::db::RepositoryError;
use crate::models::Product;
use crate::services::cache::{CATALOG_PATH, SELLER_PRODUCTS_PATH, product_path};
use crate::services::live::LiveEvent;
use crate::services::storage::ImageStorage;

const PRODUCT_NOT_FOUND: &str = "Le produit n'existe pas.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSaved {
    pub message: String,
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUploaded {
    pub url: String,
}

impl Actions<'_> {
    /// Create a product owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns `ActionError` on invalid input, an untrusted caller, or a
    /// store failure.
    #[instrument(skip_all)]
    pub async fn add_product(&self, token: Option<&str>, form: &ProductForm) -> ActionResult<ProductSaved> {
        let valid = form.validate().map_err(ActionError::Validation)?;
        let identity = self.authenticate(token)?;

        let fields = valid.into_fields(|| ImageStorage::placeholder().into());
        let product = Product::new(identity.uid, fields);

        self.store
            .insert_product(&product)
            .await
            .map_err(ActionError::store("Impossible d'ajouter le produit."))?;

        info!(product_id = %product.id, seller_id = %identity.uid, "Product added");
        self.cache.invalidate(&["/", CATALOG_PATH, SELLER_PRODUCTS_PATH]);

        Ok(ActionData {
            data: ProductSaved {
                message: "Produit ajouté avec succès !".to_string(),
                product_id: product.id,
            },
        })
    }

    /// Replace the editable fields of a product the caller owns.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NotFound` for an unknown product and
    /// `ActionError::Unauthenticated` when the caller is not its seller.
    #[instrument(skip_all, fields(%product_id))]
    pub async fn update_product(
        &self,
        token: Option<&str>,
        product_id: ProductId,
        form: &ProductForm,
    ) -> ActionResult<ProductSaved> {
        const FAILED: &str = "Impossible de mettre à jour le produit.";

        let valid = form.validate().map_err(ActionError::Validation)?;
        let identity = self.authenticate(token)?;
        let existing = self.owned_product(product_id, identity.uid, FAILED).await?;

        let fields = valid.into_fields(|| ImageChoice {
            url: existing.image_url,
            hint: existing.image_hint,
        });

        self.store
            .update_product(product_id, fields)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ActionError::NotFound(PRODUCT_NOT_FOUND),
                other => ActionError::store(FAILED)(other),
            })?;

        info!(seller_id = %identity.uid, "Product updated");
        self.cache.invalidate(&[
            "/".to_string(),
            CATALOG_PATH.to_string(),
            product_path(product_id),
            SELLER_PRODUCTS_PATH.to_string(),
        ]);

        Ok(ActionData {
            data: ProductSaved {
                message: "Produit mis à jour avec succès !".to_string(),
                product_id,
            },
        })
    }

    /// Delete a product the caller owns, along with its live-session feature.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NotFound` for an unknown product and
    /// `ActionError::Unauthenticated` when the caller is not its seller.
    #[instrument(skip_all, fields(%product_id))]
    pub async fn delete_product(&self, token: Option<&str>, product_id: ProductId) -> ActionResult<Done> {
        const FAILED: &str = "Impossible de supprimer le produit.";

        let identity = self.authenticate(token)?;
        self.owned_product(product_id, identity.uid, FAILED).await?;

        self.store
            .delete_product(product_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ActionError::NotFound(PRODUCT_NOT_FOUND),
                other => ActionError::store(FAILED)(other),
            })?;

        info!(seller_id = %identity.uid, "Product deleted");
        self.live.publish(LiveEvent::Unfeatured { product_id });
        self.cache.invalidate(&[
            "/".to_string(),
            CATALOG_PATH.to_string(),
            product_path(product_id),
            SELLER_PRODUCTS_PATH.to_string(),
        ]);

        Ok(Done::new("Produit supprimé avec succès !"))
    }

    /// Store an uploaded product photo in the caller's namespace.
    ///
    /// # Errors
    ///
    /// Returns a validation error on the `image` field for empty, oversized
    /// or non-image files.
    #[instrument(skip_all, fields(size = bytes.len()))]
    pub async fn upload_image(&self, token: Option<&str>, bytes: &[u8]) -> ActionResult<ImageUploaded> {
        let identity = self.authenticate(token)?;
        let url = self
            .storage
            .save_upload(identity.uid, bytes)
            .await
            .map_err(|e| {
                if matches!(e, crate::services::storage::StorageError::Io(_)) {
                    tracing::error!(error = %e, "Image upload failed");
                }
                ActionError::field("image", e.user_message())
            })?;
        Ok(ActionData {
            data: ImageUploaded { url },
        })
    }

    /// Load a product and check the caller owns it.
    pub(super) async fn owned_product(
        &self,
        product_id: ProductId,
        uid: marche_core::Uid,
        failed: &'static str,
    ) -> Result<Product, ActionError> {
        let product = self
            .store
            .product(product_id)
            .await
            .map_err(ActionError::store(failed))?
            .ok_or(ActionError::NotFound(PRODUCT_NOT_FOUND))?;

        if !product.is_owned_by(uid) {
            return Err(ActionError::Unauthenticated);
        }
        Ok(product)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marche_core::{Price, ProductCategory};
    use rust_decimal::Decimal;

    use super::super::forms::RawPrice;
    use super::super::test_support::Harness;
    use super::*;
    use crate::db::MarketStore;

    fn form(name: &str, price: &str) -> ProductForm {
        ProductForm {
            name: name.to_string(),
            description: "Produit frais du marché de Sandaga".to_string(),
            price: RawPrice::Text(price.to_string()),
            category: "Fruits".to_string(),
            image_url: None,
            image_hint: None,
        }
    }

    #[tokio::test]
    async fn test_add_then_fetch_round_trips_fields() {
        let harness = Harness::new();
        let (seller, token) = harness.account_token("Awa");

        let saved = harness
            .actions()
            .add_product(Some(&token), &form("Mangues Kent", "3.75"))
            .await
            .unwrap()
            .data;
        assert_eq!(saved.message, "Produit ajouté avec succès !");

        let product = harness.store.product(saved.product_id).await.unwrap().unwrap();
        assert_eq!(product.name, "Mangues Kent");
        assert_eq!(product.description, "Produit frais du marché de Sandaga");
        assert_eq!(product.price, Price::new(Decimal::new(375, 2)).unwrap());
        assert_eq!(product.category, ProductCategory::Fruits);
        assert_eq!(product.seller_id, seller);
        assert!(!product.image_url.is_empty());
    }

    #[tokio::test]
    async fn test_zero_price_writes_nothing() {
        let harness = Harness::new();
        let (_, token) = harness.account_token("Awa");

        let err = harness
            .actions()
            .add_product(Some(&token), &form("Mangues", "0"))
            .await
            .unwrap_err();
        match err {
            ActionError::Validation(errors) => assert!(errors.has("price")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(harness.store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_cannot_add() {
        let harness = Harness::new();
        let token = harness.anonymous_token();
        let err = harness
            .actions()
            .add_product(Some(&token), &form("Mangues", "2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Unauthenticated));
        assert!(harness.store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_owner_update_and_delete_rejected() {
        let harness = Harness::new();
        let (_, owner) = harness.account_token("Awa");
        let (_, intruder) = harness.account_token("Moussa");
        let actions = harness.actions();

        let id = actions
            .add_product(Some(&owner), &form("Mangues", "2"))
            .await
            .unwrap()
            .data
            .product_id;

        let err = actions
            .update_product(Some(&intruder), id, &form("Volées", "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Unauthenticated));
        assert_eq!(err.user_message(), super::super::UNAUTHORIZED_MESSAGE);

        let err = actions.delete_product(Some(&intruder), id).await.unwrap_err();
        assert!(matches!(err, ActionError::Unauthenticated));

        let product = harness.store.product(id).await.unwrap().unwrap();
        assert_eq!(product.name, "Mangues");
    }

    #[tokio::test]
    async fn test_update_keeps_image_and_invalidates_detail() {
        let harness = Harness::new();
        let (_, token) = harness.account_token("Awa");
        let actions = harness.actions();

        let id = actions
            .add_product(Some(&token), &form("Mangues", "2"))
            .await
            .unwrap()
            .data
            .product_id;
        let before = harness.cache.product(&harness.store, id).await.unwrap().unwrap();

        actions
            .update_product(Some(&token), id, &form("Mangues Kent", "2.5"))
            .await
            .unwrap();

        let after = harness.cache.product(&harness.store, id).await.unwrap().unwrap();
        assert_eq!(after.name, "Mangues Kent");
        assert_eq!(after.image_url, before.image_url);
    }

    #[tokio::test]
    async fn test_update_unknown_product() {
        let harness = Harness::new();
        let (_, token) = harness.account_token("Awa");
        let err = harness
            .actions()
            .update_product(Some(&token), ProductId::generate(), &form("Mangues", "2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_owner_delete() {
        let harness = Harness::new();
        let (seller, token) = harness.account_token("Awa");
        let actions = harness.actions();
        let id = actions
            .add_product(Some(&token), &form("Mangues", "2"))
            .await
            .unwrap()
            .data
            .product_id;

        let done = actions.delete_product(Some(&token), id).await.unwrap().data;
        assert_eq!(done.message, "Produit supprimé avec succès !");
        assert_eq!(harness.store.count_products_by_seller(seller).await.unwrap(), 0);
    }
}
