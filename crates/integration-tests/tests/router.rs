//! In-process router tests that never reach the database.
//!
//! The pool is created lazily against a closed port, so anything answered
//! before a query (auth rejections, health, malformed input) is covered here.

use axum::http::StatusCode;
use serde_json::json;

use bazaar_integration_tests::{app_without_database, empty_request, json_request, send};

#[tokio::test]
async fn test_health_is_ok() {
    let app = app_without_database();
    let resp = send(&app, empty_request("GET", "/health", None)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!("ok"));
}

#[tokio::test]
async fn test_readiness_without_database_is_unavailable() {
    let app = app_without_database();
    let resp = send(&app, empty_request("GET", "/health/ready", None)).await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_entity_endpoints_require_sign_in() {
    let app = app_without_database();

    for uri in [
        "/api/products/query",
        "/api/shops/query",
        "/api/orders/query",
        "/api/reviews/query",
        "/api/vendors/query",
        "/api/users/query",
    ] {
        let resp = send(&app, json_request("POST", uri, &json!({}), None)).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(resp.body["error"], "Unauthorized: sign in required", "{uri}");
    }

    for uri in ["/api/products/table", "/api/coupons/form", "/api/dashboard/summary"] {
        let resp = send(&app, empty_request("GET", uri, None)).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_me_requires_sign_in() {
    let app = app_without_database();
    let resp = send(&app, empty_request("GET", "/auth/me", None)).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_malformed_email_is_generic_401() {
    let app = app_without_database();
    let resp = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            &json!({"email": "not-an-email", "password": "whatever"}),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["error"], "Unauthorized: invalid credentials");
    assert!(resp.cookie.is_none());
}

#[tokio::test]
async fn test_logout_without_session() {
    let app = app_without_database();
    let resp = send(&app, empty_request("POST", "/auth/logout", None)).await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = app_without_database();
    let resp = send(&app, empty_request("GET", "/api/widgets/query", None)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transactions_are_read_only() {
    let app = app_without_database();
    let resp = send(&app, empty_request("DELETE", "/api/transactions/5", None)).await;
    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
}
