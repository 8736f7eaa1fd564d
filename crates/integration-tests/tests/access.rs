//! Sign-in gates and admin-only routes.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use eyeopener_integration_tests::{CLIENT, TestPortal};

const READING: &str = "0b7e7c38-6f8d-4c1e-9c53-3e1f1a2b3c4d";

#[tokio::test]
async fn test_public_pages_need_no_session() {
    let mut portal = TestPortal::start().await;

    let home = portal.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("Sign In"));

    let auth = portal.get("/auth").await;
    assert_eq!(auth.status, StatusCode::OK);
    assert!(auth.body.contains("Sign Up"));
    assert!(!auth.body.contains("Create Account"));

    assert_eq!(portal.get("/health").await.body, "ok");
}

#[tokio::test]
async fn test_sign_up_tab_shows_create_account_form() {
    let mut portal = TestPortal::start().await;

    let response = portal.get("/auth?tab=signup").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Create Account"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let mut portal = TestPortal::start().await;

    let response = portal.get("/readings/nowhere").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, "Not found");
}

#[tokio::test]
async fn test_every_response_carries_request_id_and_security_headers() {
    let mut portal = TestPortal::start().await;

    for uri in ["/health", "/", "/readings/nowhere"] {
        let response = portal.get(uri).await;

        assert!(response.headers.contains_key("x-request-id"), "{uri}");
        assert_eq!(response.headers["x-frame-options"], "DENY", "{uri}");
        assert!(
            response.headers["content-security-policy"]
                .to_str()
                .unwrap()
                .contains("script-src 'none'"),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn test_dashboard_requires_sign_in() {
    let mut portal = TestPortal::start().await;
    portal.get("/dashboard").await.assert_redirect("/auth");
}

#[tokio::test]
async fn test_admin_requires_sign_in() {
    let mut portal = TestPortal::start().await;
    portal.get("/admin").await.assert_redirect("/");
}

#[tokio::test]
async fn test_every_admin_route_redirects_clients_home() {
    let mut portal = TestPortal::start().await;
    portal.sign_in_as(&CLIENT).await;

    portal.get("/admin").await.assert_redirect("/");
    portal
        .get(&format!("/admin/readings/{READING}/edit"))
        .await
        .assert_redirect("/");

    let fields = [
        ("user_id", CLIENT.id),
        ("reading_type", "tarot"),
        ("title", "Sneaky"),
        ("content", "{}"),
    ];
    portal
        .post_form("/admin/readings", &fields)
        .await
        .assert_redirect("/");
    portal
        .post_form(&format!("/admin/readings/{READING}"), &fields)
        .await
        .assert_redirect("/");
    portal
        .post_form(&format!("/admin/readings/{READING}/delete"), &[])
        .await
        .assert_redirect("/");

    // Nothing reached PostgREST beyond the client's own profile lookup.
    let requests = portal.supabase.received_requests().await.unwrap();
    assert!(
        requests
            .iter()
            .all(|r| r.url.path() != "/rest/v1/readings"),
        "admin routes must not touch readings for a client"
    );
}

#[tokio::test]
async fn test_signed_in_nav_and_sign_out() {
    let mut portal = TestPortal::start().await;
    portal.sign_in_as(&CLIENT).await;

    let home = portal.get("/").await;
    assert!(home.body.contains(CLIENT.email));
    assert!(home.body.contains("My Readings"));
    assert!(!home.body.contains("Admin Panel"));

    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/auth/v1/logout"))
        .respond_with(wiremock::ResponseTemplate::new(204))
        .mount(&portal.supabase)
        .await;

    portal.post_form("/auth/sign-out", &[]).await.assert_redirect("/");
    portal.get("/dashboard").await.assert_redirect("/auth");
}

#[tokio::test]
async fn test_signed_in_user_skips_auth_page() {
    let mut portal = TestPortal::start().await;
    portal.sign_in_as(&CLIENT).await;
    portal.get("/auth").await.assert_redirect("/");
}
