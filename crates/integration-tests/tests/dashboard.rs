//! A client's own readings.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use eyeopener_integration_tests::{CLIENT, TestPortal, reading_row};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_empty_dashboard_shows_empty_state() {
    let mut portal = TestPortal::start().await;
    portal.sign_in_as(&CLIENT).await;
    portal.mount_readings_for(&CLIENT, json!([])).await;

    let page = portal.get("/dashboard").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("No readings yet. Start your spiritual journey!"));
    assert!(page.body.contains("Welcome back, Sam Seeker"));
    assert!(!page.body.contains("Failed to load readings"));
}

#[tokio::test]
async fn test_dashboard_lists_readings_with_preview() {
    let mut portal = TestPortal::start().await;
    portal.sign_in_as(&CLIENT).await;
    portal
        .mount_readings_for(
            &CLIENT,
            json!([reading_row(
                "0b7e7c38-6f8d-4c1e-9c53-3e1f1a2b3c4d",
                &CLIENT,
                "bone_reading",
                "Ancestral guidance",
                json!({"ancestor_message": "Be patient", "bones_cast": 13}),
            )]),
        )
        .await;

    let page = portal.get("/dashboard").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Ancestral guidance"));
    assert!(page.body.contains("bone reading"));
    assert!(page.body.contains("January 5, 2025"));
    assert!(page.body.contains("ancestor message"));
    assert!(!page.body.contains("No readings yet"));
}

#[tokio::test]
async fn test_dashboard_fetch_failure_shows_notice() {
    let mut portal = TestPortal::start().await;
    portal.sign_in_as(&CLIENT).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/readings"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&portal.supabase)
        .await;

    let page = portal.get("/dashboard").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Failed to load readings"));
    assert!(!page.body.contains("boom"));
}
