//! Integration tests for the navigation menu and the route guard.

use axum::http::{StatusCode, header};

use marche_integration_tests::{TestApp, body_text};

/// Hrefs of the main navigation links, in document order.
fn nav_hrefs(html: &str) -> Vec<String> {
    let Some(start) = html.find(r#"<nav class="main-nav""#) else {
        return Vec::new();
    };
    let nav = &html[start..];
    let nav = &nav[..nav.find("</nav>").unwrap_or(nav.len())];
    nav.split(r#"<a href=""#)
        .skip(1)
        .filter_map(|chunk| chunk.split('"').next())
        .map(ToString::to_string)
        .collect()
}

// =============================================================================
// Menu Composition
// =============================================================================

#[tokio::test]
async fn test_guest_menu_is_base_plus_login() {
    let app = TestApp::new();
    let mut guest = app.client();

    let (status, html) = guest.page("/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(nav_hrefs(&html), ["/products", "/strategie", "/login"]);
    assert!(!html.contains("Déconnexion"));
}

#[tokio::test]
async fn test_account_menu_without_products() {
    let app = TestApp::new();
    let mut awa = app.signed_in("Awa", "awa@marche.example").await;

    let (_, html) = awa.page("/products").await;

    assert_eq!(
        nav_hrefs(&html),
        ["/products", "/strategie", "/orders", "/notifications", "/profile", "/subscription"]
    );
    assert!(html.contains("Déconnexion"));
}

#[tokio::test]
async fn test_seller_menu_gains_seller_then_pro_links() {
    let app = TestApp::new();
    let mut awa = app.signed_in("Awa", "awa@marche.example").await;
    awa.add_product("Mangues", "4.50").await;

    let (_, html) = awa.page("/products").await;
    let hrefs = nav_hrefs(&html);
    assert!(hrefs.contains(&"/vendeur/mes-produits".to_string()));
    assert!(!hrefs.contains(&"/vendeur/ad-optimizer".to_string()));

    awa.action(axum::http::Method::POST, "/subscription", None)
        .await
        .data();
    let (_, html) = awa.page("/products").await;
    assert_eq!(nav_hrefs(&html).last().map(String::as_str), Some("/vendeur/ad-optimizer"));
}

#[tokio::test]
async fn test_active_link_follows_path() {
    let app = TestApp::new();
    let mut guest = app.client();

    let (_, html) = guest.page("/strategie").await;

    assert!(html.contains(r#"<a href="/strategie" class="nav-link active""#));
    assert!(html.contains(r#"<a href="/products" class="nav-link""#));
}

// =============================================================================
// Route Guard
// =============================================================================

#[tokio::test]
async fn test_protected_pages_redirect_guests_to_login() {
    let app = TestApp::new();

    for path in ["/orders", "/profile", "/subscription", "/live", "/vendeur/mes-produits"] {
        let mut guest = app.client();
        let response = guest.get(path).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.headers()[header::LOCATION], "/login", "{path}");
        let html = body_text(response).await;
        assert!(html.contains("Chargement"), "{path} should only show the placeholder");
        assert!(!html.contains("main-nav"), "{path} leaked page content");
    }
}

#[tokio::test]
async fn test_signed_in_user_leaves_auth_pages() {
    let app = TestApp::new();
    let mut awa = app.signed_in("Awa", "awa@marche.example").await;

    for path in ["/login", "/signup"] {
        let response = awa.get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/products");
    }
}

#[tokio::test]
async fn test_public_pages_render_for_guests() {
    let app = TestApp::new();
    let mut guest = app.client();

    for path in ["/products", "/strategie", "/devenir-vendeur", "/notifications", "/cart", "/login"] {
        let (status, _) = guest.page(path).await;
        assert_eq!(status, StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn test_root_redirects_to_catalog() {
    let app = TestApp::new();
    let response = app.client().get("/").await;

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/products");
}

#[tokio::test]
async fn test_logout_returns_to_guest_menu() {
    let app = TestApp::new();
    let mut awa = app.signed_in("Awa", "awa@marche.example").await;

    let response = awa.post_form("/logout", "").await;
    assert!(response.status().is_redirection());

    let response = awa.get("/orders").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
