//! Integration tests for the cart, checkout and orders.

use axum::http::{Method, StatusCode, header};

use marche_core::{Email, format_amount};
use marche_integration_tests::{Client, PASSWORD, TestApp};

async fn add_to_cart(client: &mut Client, product_id: &str, quantity: u32) {
    let response = client
        .post_form("/cart/add", &format!("product_id={product_id}&quantity={quantity}"))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/cart");
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_lines_and_total() {
    let app = TestApp::new();
    let mut awa = app.signed_in("Awa", "awa@marche.example").await;
    let mango = awa.add_product("Mangues Kent", "4.5").await;

    let mut guest = app.client();
    add_to_cart(&mut guest, &mango, 2).await;
    add_to_cart(&mut guest, &mango, 1).await;

    let (status, html) = guest.page("/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Mangues Kent"));
    assert!(html.contains("$13.50"));
    assert!(html.contains(r#"<span class="cart-count">3</span>"#));
}

#[tokio::test]
async fn test_update_to_zero_removes_line() {
    let app = TestApp::new();
    let mut awa = app.signed_in("Awa", "awa@marche.example").await;
    let mango = awa.add_product("Mangues Kent", "4.5").await;

    let mut guest = app.client();
    add_to_cart(&mut guest, &mango, 2).await;
    guest
        .post_form("/cart/update", &format!("product_id={mango}&quantity=0"))
        .await;

    let (_, html) = guest.page("/cart").await;
    assert!(html.contains("Votre panier est vide."));
}

#[tokio::test]
async fn test_unknown_product_cannot_be_added() {
    let app = TestApp::new();
    let mut guest = app.client();

    let response = guest
        .post_form(
            "/cart/add",
            "product_id=00000000-0000-4000-8000-000000000000&quantity=1",
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_place_order_stores_order_and_notification() {
    let app = TestApp::new();
    let mut awa = app.signed_in("Awa", "awa@marche.example").await;
    let mango = awa.add_product("Mangues Kent", "4.5").await;
    let mut moussa = app.signed_in("Moussa", "moussa@marche.example").await;
    add_to_cart(&mut moussa, &mango, 2).await;

    let reply = moussa.action(Method::POST, "/orders", None).await;
    assert!(reply.data()["order_id"].is_string());

    let buyer = app
        .store()
        .account_by_email(&Email::parse("moussa@marche.example").unwrap())
        .await
        .unwrap()
        .unwrap();
    let orders = app.store().orders_for(buyer.uid).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].items[0].product_name, "Mangues Kent");
    assert_eq!(format_amount(orders[0].total_amount), "$9.00");

    let notifications = app.store().notifications_for(buyer.uid).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].link.as_deref(), Some("/orders"));

    let (_, html) = moussa.page("/cart").await;
    assert!(html.contains("Votre panier est vide."));
    let (_, html) = moussa.page("/orders").await;
    assert!(html.contains("Mangues Kent"));
    assert!(html.contains("En attente"));
}

#[tokio::test]
async fn test_empty_cart_cannot_be_ordered() {
    let app = TestApp::new();
    let mut awa = app.signed_in("Awa", "awa@marche.example").await;

    let reply = awa.action(Method::POST, "/orders", None).await;

    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["fields"][0]["field"], "cart");
}

#[tokio::test]
async fn test_guest_order_rejected_and_cart_kept() {
    let app = TestApp::new();
    let mut awa = app.signed_in("Awa", "awa@marche.example").await;
    let mango = awa.add_product("Mangues Kent", "4.5").await;

    let mut guest = app.client();
    add_to_cart(&mut guest, &mango, 1).await;
    let reply = guest.action(Method::POST, "/orders", None).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    let (_, html) = guest.page("/cart").await;
    assert!(html.contains("Mangues Kent"));
}

#[tokio::test]
async fn test_cart_survives_login() {
    let app = TestApp::new();
    let mut awa = app.signed_in("Awa", "awa@marche.example").await;
    let mango = awa.add_product("Mangues Kent", "4.5").await;
    app.signed_in("Moussa", "moussa@marche.example").await;

    let mut browser = app.client();
    add_to_cart(&mut browser, &mango, 2).await;
    let response = browser
        .post_form("/login", &format!("email=moussa@marche.example&password={PASSWORD}"))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (_, html) = browser.page("/checkout").await;
    assert!(html.contains("Mangues Kent"));
    assert!(html.contains("Confirmer la commande"));
}
