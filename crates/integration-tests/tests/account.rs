//! Integration tests for accounts: signup, login, profile, subscription and
//! notifications.

use axum::http::{Method, StatusCode, header};
use serde_json::json;

use marche_core::{Email, NotificationKind};
use marche_integration_tests::{PASSWORD, TestApp, body_text};
use marche_storefront::models::Notification;

async fn uid_of(app: &TestApp, email: &str) -> marche_core::Uid {
    app.store()
        .account_by_email(&Email::parse(email).unwrap())
        .await
        .unwrap()
        .unwrap()
        .uid
}

// =============================================================================
// Signup & Login
// =============================================================================

#[tokio::test]
async fn test_signup_creates_account_and_profile() {
    let app = TestApp::new();
    app.signed_in("Awa", "awa@marche.example").await;

    let uid = uid_of(&app, "awa@marche.example").await;
    let profile = app.store().profile(uid).await.unwrap().unwrap();
    assert!(!profile.is_pro);
    assert_eq!(profile.name, "Awa");
}

#[tokio::test]
async fn test_duplicate_signup_shows_error() {
    let app = TestApp::new();
    app.signed_in("Awa", "awa@marche.example").await;

    let response = app
        .client()
        .post_form("/signup", &format!("name=Autre&email=awa@marche.example&password={PASSWORD}"))
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_text(response).await.contains("form-error"));
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let app = TestApp::new();
    app.signed_in("Awa", "awa@marche.example").await;

    let mut client = app.client();
    let response = client
        .post_form("/login", "email=awa@marche.example&password=mauvais-mot-de-passe")
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .post_form("/login", &format!("email=awa@marche.example&password={PASSWORD}"))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/products");
}

#[tokio::test]
async fn test_token_reports_anonymous_sessions() {
    let app = TestApp::new();
    let mut guest = app.client();

    let response = guest.get("/api/auth/token").await;
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();

    assert_eq!(body["anonymous"], true);
    assert!(body["expires_in"].as_u64().unwrap() > 0);
}

// =============================================================================
// Subscription
// =============================================================================

#[tokio::test]
async fn test_upgrade_twice_succeeds() {
    let app = TestApp::new();
    let mut awa = app.signed_in("Awa", "awa@marche.example").await;

    let first = awa.action(Method::POST, "/subscription", None).await;
    let second = awa.action(Method::POST, "/subscription", None).await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);
    let uid = uid_of(&app, "awa@marche.example").await;
    assert!(app.store().profile(uid).await.unwrap().unwrap().is_pro);

    let (_, html) = awa.page("/subscription").await;
    assert!(html.contains("Vous êtes déjà membre Pro"));
}

#[tokio::test]
async fn test_guest_cannot_upgrade() {
    let app = TestApp::new();
    let reply = app
        .client()
        .action(Method::POST, "/subscription", None)
        .await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.error(), "Action non autorisée.");
}

// =============================================================================
// Profile
// =============================================================================

#[tokio::test]
async fn test_profile_update_keeps_pro_flag() {
    let app = TestApp::new();
    let mut awa = app.signed_in("Awa", "awa@marche.example").await;
    awa.action(Method::POST, "/subscription", None).await.data();

    awa.action(
        Method::PUT,
        "/profile",
        Some(json!({
            "name": "Awa Diop",
            "email": "awa@marche.example",
            "phone": "+221 77 000 00 00",
            "street": "12 rue du Marché",
            "city": "Dakar",
            "state": "Dakar",
            "zip": "10000",
            "country": "Sénégal",
        })),
    )
    .await
    .data();

    let uid = uid_of(&app, "awa@marche.example").await;
    let profile = app.store().profile(uid).await.unwrap().unwrap();
    assert!(profile.is_pro);
    assert_eq!(profile.address.city, "Dakar");

    let (_, html) = awa.page("/profile").await;
    assert!(html.contains("+221 77 000 00 00"));
}

#[tokio::test]
async fn test_profile_validation() {
    let app = TestApp::new();
    let mut awa = app.signed_in("Awa", "awa@marche.example").await;

    let reply = awa
        .action(Method::PUT, "/profile", Some(json!({"name": "A", "email": "pas-un-email"})))
        .await;

    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["fields"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_guest_notifications_prompt_login() {
    let app = TestApp::new();
    let (status, html) = app.client().page("/notifications").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Connectez-vous pour voir vos notifications."));
}

#[tokio::test]
async fn test_mark_notification_read_checks_owner() {
    let app = TestApp::new();
    let mut awa = app.signed_in("Awa", "awa@marche.example").await;
    let mut moussa = app.signed_in("Moussa", "moussa@marche.example").await;
    let uid = uid_of(&app, "awa@marche.example").await;
    let notification = Notification::new(
        uid,
        NotificationKind::System,
        "Bienvenue",
        "Bienvenue sur Marché !",
        None,
    );
    app.store().insert_notification(&notification).await.unwrap();
    let path = format!("/notifications/{}/read", notification.id);

    let stolen = moussa.action(Method::POST, &path, None).await;
    assert_eq!(stolen.status, StatusCode::NOT_FOUND);
    assert!(!app.store().notifications_for(uid).await.unwrap()[0].is_read);

    awa.action(Method::POST, &path, None).await.data();
    assert!(app.store().notifications_for(uid).await.unwrap()[0].is_read);
}
