//! Seller pages under `/vendeur/`.
//!
//! The route guard already keeps guests out; these handlers only load the
//! seller's data. Every write goes through a server action.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use marche_core::{ProductCategory, ProductId};

use super::views::ProductView;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{PageContext, RequireAccount};
use crate::services::storage::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Category option of the product form.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub label: &'static str,
    pub selected: bool,
}

fn category_options(selected: Option<&str>) -> Vec<CategoryOption> {
    ProductCategory::ALL
        .into_iter()
        .map(|category| CategoryOption {
            label: category.label(),
            selected: selected == Some(category.label()),
        })
        .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "seller/products.html")]
pub struct MyProductsTemplate {
    pub ctx: PageContext,
    pub products: Vec<ProductView>,
}

/// Shared by the add and edit pages.
#[derive(Template, WebTemplate)]
#[template(path = "seller/product_form.html")]
pub struct ProductFormTemplate {
    pub ctx: PageContext,
    pub title: &'static str,
    pub submit_label: &'static str,
    /// Action endpoint the form posts to.
    pub action: String,
    pub method: &'static str,
    pub product: Option<ProductView>,
    pub categories: Vec<CategoryOption>,
    pub max_upload_mb: usize,
}

#[derive(Template, WebTemplate)]
#[template(path = "seller/ad_optimizer.html")]
pub struct AdOptimizerTemplate {
    pub ctx: PageContext,
    pub allowed: bool,
}

#[instrument(skip_all, fields(uid = %user.uid))]
pub async fn my_products(
    State(state): State<AppState>,
    RequireAccount(user): RequireAccount,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let products = state.cache().seller_products(state.store(), user.uid).await?;
    Ok(MyProductsTemplate {
        ctx,
        products: products.iter().map(ProductView::from).collect(),
    })
}

pub async fn add_product(ctx: PageContext) -> impl IntoResponse {
    ProductFormTemplate {
        ctx,
        title: "Ajouter un produit",
        submit_label: "Publier le produit",
        action: "/api/actions/products".to_string(),
        method: "POST",
        product: None,
        categories: category_options(None),
        max_upload_mb: MAX_UPLOAD_BYTES / (1024 * 1024),
    }
}

/// Edit form. Products of other sellers are reported as missing.
#[instrument(skip(state, user, ctx), fields(uid = %user.uid))]
pub async fn edit_product(
    State(state): State<AppState>,
    RequireAccount(user): RequireAccount,
    ctx: PageContext,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = state
        .store()
        .product(id)
        .await?
        .filter(|p| p.is_owned_by(user.uid))
        .ok_or_else(|| AppError::NotFound("produit".to_string()))?;

    Ok(ProductFormTemplate {
        ctx,
        title: "Modifier le produit",
        submit_label: "Enregistrer",
        action: format!("/api/actions/products/{id}"),
        method: "PUT",
        categories: category_options(Some(product.category.label())),
        product: Some(ProductView::from(&product)),
        max_upload_mb: MAX_UPLOAD_BYTES / (1024 * 1024),
    })
}

/// Ad optimizer; the form is only shown to pro sellers.
pub async fn ad_optimizer(ctx: PageContext) -> impl IntoResponse {
    let allowed = ctx.roles.is_pro_seller();
    AdOptimizerTemplate { ctx, allowed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_options_select_current() {
        let options = category_options(Some("Sacs"));
        assert_eq!(options.len(), ProductCategory::ALL.len());
        assert_eq!(
            options.iter().filter(|o| o.selected).map(|o| o.label).collect::<Vec<_>>(),
            vec!["Sacs"]
        );
        assert!(category_options(None).iter().all(|o| !o.selected));
    }
}
