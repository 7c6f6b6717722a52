//! End-to-end dashboard flows through the router and a real database.
//!
//! These tests require a disposable `PostgreSQL` in `TEST_DATABASE_URL`.
//! Run with: cargo test -p bazaar-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::http::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;

use bazaar_core::{Email, UserRole, VendorId};
use bazaar_dashboard::models::NewUserFields;
use bazaar_dashboard::services::AuthService;
use bazaar_integration_tests::{
    Fixture, app, empty_request, json_request, seed_shop, send, unique_suffix,
};

const PASSWORD: &str = "a perfectly fine password";

async fn create_user(pool: &PgPool, role: UserRole, vendor_id: Option<VendorId>) -> String {
    let email = format!("{role}-{}@bazaar.test", unique_suffix());
    AuthService::new(pool)
        .register(&NewUserFields {
            email: Email::parse(&email).unwrap(),
            name: format!("Test {role}"),
            password: PASSWORD.to_string(),
            role,
            vendor_id,
        })
        .await
        .unwrap();
    email
}

async fn login(app: &Router, email: &str) -> String {
    let resp = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            &json!({"email": email, "password": PASSWORD}),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK, "{:?}", resp.body);
    resp.cookie.expect("login sets the session cookie")
}

async fn vendor_session(pool: &PgPool, app: &Router, shop: &Fixture) -> String {
    let email = create_user(pool, UserRole::Vendor, Some(shop.vendor_id)).await;
    login(app, &email).await
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_login_me_logout() {
    let pool = bazaar_integration_tests::test_pool().await;
    let app = app(pool.clone());
    let email = create_user(&pool, UserRole::Admin, None).await;

    let cookie = login(&app, &email).await;
    let me = send(&app, empty_request("GET", "/auth/me", Some(&cookie))).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["mode"], "admin");
    assert_eq!(me.body["user"]["email"], email.as_str());

    let out = send(&app, empty_request("POST", "/auth/logout", Some(&cookie))).await;
    assert_eq!(out.status, StatusCode::NO_CONTENT);

    let me = send(&app, empty_request("GET", "/auth/me", Some(&cookie))).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_wrong_password_is_generic_401() {
    let pool = bazaar_integration_tests::test_pool().await;
    let app = app(pool.clone());
    let email = create_user(&pool, UserRole::Admin, None).await;

    let resp = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            &json!({"email": email, "password": "not the password"}),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["error"], "Unauthorized: invalid credentials");
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_vendor_is_scoped_to_own_shops() {
    let pool = bazaar_integration_tests::test_pool().await;
    let app = app(pool.clone());
    let mine = seed_shop(&pool, 3).await;
    let theirs = seed_shop(&pool, 2).await;
    let cookie = vendor_session(&pool, &app, &mine).await;

    let list = send(
        &app,
        json_request("POST", "/api/products/query", &json!({"pageSize": 50}), Some(&cookie)),
    )
    .await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["total"], 3);
    let rows = list.body["rows"].as_array().unwrap();
    assert!(rows.iter().all(|r| r["shopId"] == mine.shop_id.as_i32()));

    // Someone else's product answers 404, not 403.
    let foreign: i32 = sqlx::query_scalar("SELECT id FROM products WHERE shop_id = $1 LIMIT 1")
        .bind(theirs.shop_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    let resp = send(
        &app,
        empty_request("GET", &format!("/api/products/{foreign}"), Some(&cookie)),
    )
    .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    // Admin-only areas.
    for uri in ["/api/vendors/query", "/api/users/query"] {
        let resp = send(&app, json_request("POST", uri, &json!({}), Some(&cookie))).await;
        assert_eq!(resp.status, StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_deactivated_user_loses_session() {
    let pool = bazaar_integration_tests::test_pool().await;
    let app = app(pool.clone());
    let shop = seed_shop(&pool, 2).await;
    let vendor = vendor_session(&pool, &app, &shop).await;
    let admin = login(&app, &create_user(&pool, UserRole::Admin, None).await).await;

    let me = send(&app, empty_request("GET", "/auth/me", Some(&vendor))).await;
    assert_eq!(me.status, StatusCode::OK);
    let vendor_user = me.body["user"]["id"].as_i64().unwrap();

    let toggled = send(
        &app,
        empty_request("POST", &format!("/api/users/{vendor_user}/toggle"), Some(&admin)),
    )
    .await;
    assert_eq!(toggled.status, StatusCode::OK);
    assert_eq!(toggled.body["value"], false);

    // The old cookie is refused everywhere, writes included.
    let query = send(
        &app,
        json_request("POST", "/api/products/query", &json!({}), Some(&vendor)),
    )
    .await;
    assert_eq!(query.status, StatusCode::UNAUTHORIZED);
    let bulk = send(
        &app,
        json_request(
            "POST",
            "/api/products/bulk",
            &json!({"action": "deactivate", "ids": [1]}),
            Some(&vendor),
        ),
    )
    .await;
    assert_eq!(bulk.status, StatusCode::UNAUTHORIZED);
    let me = send(&app, empty_request("GET", "/auth/me", Some(&vendor))).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    // Reactivating does not revive the ended session.
    let toggled = send(
        &app,
        empty_request("POST", &format!("/api/users/{vendor_user}/toggle"), Some(&admin)),
    )
    .await;
    assert_eq!(toggled.body["value"], true);
    let me = send(&app, empty_request("GET", "/auth/me", Some(&vendor))).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_vendor_create_targets_single_shop() {
    let pool = bazaar_integration_tests::test_pool().await;
    let app = app(pool.clone());
    let mine = seed_shop(&pool, 0).await;
    let theirs = seed_shop(&pool, 0).await;
    let cookie = vendor_session(&pool, &app, &mine).await;

    let created = send(
        &app,
        json_request("POST", "/api/categories", &json!({"name": "Mugs & Cups"}), Some(&cookie)),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    assert_eq!(created.body["shopId"], mine.shop_id.as_i32());
    assert_eq!(created.body["slug"], "mugs-cups");

    let rejected = send(
        &app,
        json_request(
            "POST",
            "/api/categories",
            &json!({"name": "Plates", "shopId": theirs.shop_id.as_i32()}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(rejected.body["errors"]["shopId"][0], "must be one of your shops");

    let id = created.body["id"].as_i64().unwrap();
    let toggled = send(
        &app,
        empty_request("POST", &format!("/api/categories/{id}/toggle"), Some(&cookie)),
    )
    .await;
    assert_eq!(toggled.body, json!({"id": id, "field": "isActive", "value": false}));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_oversized_amounts_are_validation_errors() {
    let pool = bazaar_integration_tests::test_pool().await;
    let app = app(pool.clone());
    let shop = seed_shop(&pool, 0).await;
    let cookie = vendor_session(&pool, &app, &shop).await;

    let product = send(
        &app,
        json_request(
            "POST",
            "/api/products",
            &json!({"name": "Gold Mug", "price": "10000000000000"}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(product.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(product.body["errors"]["price"][0], "must be less than 10000000000");

    let coupon = send(
        &app,
        json_request(
            "POST",
            "/api/coupons",
            &json!({"code": "HUGE", "discountType": "fixed", "discountValue": "99999999999999"}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(coupon.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(coupon.body["errors"]["discountValue"].is_array());
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_list_returns_row_action_states() {
    let pool = bazaar_integration_tests::test_pool().await;
    let app = app(pool.clone());
    let shop = seed_shop(&pool, 2).await;
    let cookie = vendor_session(&pool, &app, &shop).await;

    let list = send(
        &app,
        json_request("POST", "/api/products/query", &json!({}), Some(&cookie)),
    )
    .await;
    let first = list.body["rows"][0]["id"].as_i64().unwrap();

    let busy = send(
        &app,
        json_request(
            "POST",
            "/api/products/query",
            &json!({"mutationState": {"deleting": [first]}}),
            Some(&cookie),
        ),
    )
    .await;
    let actions: &Vec<Value> = busy.body["rowActions"][first.to_string()].as_array().unwrap();
    assert!(actions.iter().all(|a| a["disabled"] == true));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_storefront_catalog() {
    let pool = bazaar_integration_tests::test_pool().await;
    let app = app(pool.clone());
    let shop = seed_shop(&pool, 8).await;

    let resp = send(
        &app,
        json_request(
            "POST",
            &format!("/api/storefront/shops/{}/products/query", shop.shop_slug),
            &json!({"pageSize": 50}),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    // Products 4 and 8 are inactive.
    assert_eq!(resp.body["total"], 6);

    let missing = send(
        &app,
        json_request(
            "POST",
            "/api/storefront/shops/no-such-shop/products/query",
            &json!({}),
            None,
        ),
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_admin_summary_and_vendor_status() {
    let pool = bazaar_integration_tests::test_pool().await;
    let app = app(pool.clone());
    let shop = seed_shop(&pool, 4).await;
    let email = create_user(&pool, UserRole::Admin, None).await;
    let cookie = login(&app, &email).await;

    let summary = send(&app, empty_request("GET", "/api/dashboard/summary", Some(&cookie))).await;
    assert_eq!(summary.status, StatusCode::OK);
    assert!(summary.body["products"].as_i64().unwrap() >= 4);

    let suspended = send(
        &app,
        json_request(
            "POST",
            &format!("/api/vendors/{}/status", shop.vendor_id),
            &json!({"status": "suspended"}),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(suspended.status, StatusCode::OK);
    assert_eq!(suspended.body["status"], "suspended");

    // A suspended vendor's shop disappears from the storefront.
    let resp = send(
        &app,
        json_request(
            "POST",
            &format!("/api/storefront/shops/{}/products/query", shop.shop_slug),
            &json!({}),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
