//! Cart and checkout.
//!
//! The cart lives in the session under [`session_keys::CART`]. Cart forms
//! post and redirect back to `/cart`; checkout places the order through the
//! `place_order` server action.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use marche_core::{ProductId, format_amount};

use super::views::CartLineView;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::PageContext;
use crate::models::{Cart, session_keys};
use crate::state::AppState;

const CART_PATH: &str = "/cart";

/// A payment provider shown at checkout. Payments are not processed.
pub struct PaymentLink {
    pub label: &'static str,
    pub href: &'static str,
    pub icon: &'static str,
}

const PAYMENT_LINKS: [PaymentLink; 3] = [
    PaymentLink {
        label: "Payer par carte bancaire",
        href: "https://stripe.com",
        icon: "credit-card",
    },
    PaymentLink {
        label: "Payer avec Moov Money",
        href: "https://www.moov-africa.com/",
        icon: "smartphone",
    },
    PaymentLink {
        label: "Payer avec Airtel Money",
        href: "https://www.airtel.com/",
        icon: "smartphone",
    },
];

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: u32,
}

const fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub ctx: PageContext,
    pub lines: Vec<CartLineView>,
    pub total: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "cart/checkout.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub payment_links: &'static [PaymentLink],
    pub signed_in: bool,
}

/// Load the session cart, empty if none was stored yet.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

pub async fn show(session: Session, ctx: PageContext) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;
    Ok(CartTemplate {
        ctx,
        lines: cart.lines.iter().map(CartLineView::from).collect(),
        total: format_amount(cart.total()),
    })
}

#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let product = state
        .cache()
        .product(state.store(), form.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("produit".to_string()))?;

    let mut cart = load_cart(&session).await?;
    cart.add(&product, form.quantity);
    save_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product_id", product.id.to_string()),
            ("quantity", form.quantity.to_string()),
        ],
    );
    Ok(Redirect::to(CART_PATH))
}

/// Set a line's quantity; zero removes it.
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Redirect> {
    let mut cart = load_cart(&session).await?;
    cart.set_quantity(form.product_id, form.quantity);
    save_cart(&session, &cart).await?;
    Ok(Redirect::to(CART_PATH))
}

pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Redirect> {
    let mut cart = load_cart(&session).await?;
    cart.remove(form.product_id);
    save_cart(&session, &cart).await?;
    Ok(Redirect::to(CART_PATH))
}

pub async fn checkout(session: Session, ctx: PageContext) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;
    let signed_in = ctx.roles.is_authenticated;
    Ok(CheckoutTemplate {
        ctx,
        lines: cart.lines.iter().map(CartLineView::from).collect(),
        total: format_amount(cart.total()),
        payment_links: &PAYMENT_LINKS,
        signed_in,
    })
}
