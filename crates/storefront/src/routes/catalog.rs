//! Catalog and public content pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use marche_core::{ProductCategory, ProductId};
use marche_core::access::HOME_PATH;

use super::views::ProductView;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::PageContext;
use crate::state::AppState;

/// Catalog filter.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Category label, e.g. `Fruits`.
    pub categorie: Option<String>,
}

/// One category chip above the grid.
#[derive(Debug, Clone)]
pub struct CategoryChip {
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub ctx: PageContext,
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryChip>,
    pub filtered: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub ctx: PageContext,
    pub product: ProductView,
    pub is_owner: bool,
}

/// A communication channel of the strategy page.
pub struct Channel {
    pub title: &'static str,
    pub icon: &'static str,
    pub content: &'static str,
}

const CHANNELS: [Channel; 4] = [
    Channel {
        title: "Réseaux sociaux : créer une communauté engagée",
        icon: "share-2",
        content: "Sur Facebook et Instagram, nous partageons les histoires de nos vendeurs, \
                  mettons en avant la qualité des produits et dialoguons directement avec nos clients.",
    },
    Channel {
        title: "Ateliers et formations : accompagner nos partenaires",
        icon: "users",
        content: "Des ateliers locaux forment les commerçants aux outils numériques, \
                  à la gestion de leur boutique en ligne et à la photographie de produits.",
    },
    Channel {
        title: "Site web : la vitrine de notre savoir-faire",
        icon: "globe",
        content: "Au-delà de la place de marché, le site héberge des guides pratiques, \
                  des articles sur les tendances du marché local et des portraits de vendeurs.",
    },
    Channel {
        title: "Relations presse : amplifier notre impact",
        icon: "newspaper",
        content: "Nous collaborons avec les médias locaux pour raconter l'impact de Marché \
                  sur la vie des commerçants et le commerce de proximité.",
    },
];

#[derive(Template, WebTemplate)]
#[template(path = "strategie.html")]
pub struct StrategieTemplate {
    pub ctx: PageContext,
    pub channels: &'static [Channel],
}

#[derive(Template, WebTemplate)]
#[template(path = "devenir_vendeur.html")]
pub struct DevenirVendeurTemplate {
    pub ctx: PageContext,
}

/// `/` has no page of its own.
pub async fn home() -> Redirect {
    Redirect::to(HOME_PATH)
}

/// Product grid, optionally filtered by category.
#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse> {
    let selected = query
        .categorie
        .as_deref()
        .and_then(|label| ProductCategory::from_label(label).ok());

    let catalog = state.cache().catalog(state.store()).await?;
    let products = catalog
        .iter()
        .filter(|p| selected.is_none_or(|category| p.category == category))
        .map(ProductView::from)
        .collect();

    let categories = ProductCategory::ALL
        .into_iter()
        .map(|category| CategoryChip {
            label: category.label(),
            selected: selected == Some(category),
        })
        .collect();

    Ok(ProductsIndexTemplate {
        ctx,
        products,
        categories,
        filtered: selected.is_some(),
    })
}

/// Product detail.
#[instrument(skip(state, ctx), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = state
        .cache()
        .product(state.store(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("produit".to_string()))?;

    let is_owner = ctx
        .user
        .as_ref()
        .is_some_and(|user| !user.is_anonymous && product.is_owned_by(user.uid));

    Ok(ProductShowTemplate {
        ctx,
        product: ProductView::from(&product),
        is_owner,
    })
}

pub async fn strategie(ctx: PageContext) -> impl IntoResponse {
    StrategieTemplate {
        ctx,
        channels: &CHANNELS,
    }
}

pub async fn devenir_vendeur(ctx: PageContext) -> impl IntoResponse {
    DevenirVendeurTemplate { ctx }
}
