//! Integration tests for roles, grants, and session lifecycle.
//!
//! Grants have no API endpoint (an operator creates them), so these tests
//! seed them through the storage handle and then exercise the HTTP surface.

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use ledgerflow_api::config::StoreVisibility;
use ledgerflow_api::models::NewGrant;
use ledgerflow_api::storage::Storage;
use ledgerflow_core::{StoreId, StoreRole, UserId};
use ledgerflow_integration_tests::TestApp;

/// Test helper: create a store and return its typed ID with the raw entity.
async fn create_store(app: &TestApp, client: &Client, name: &str) -> (StoreId, Value) {
    let resp = client
        .post(app.url("/api/stores"))
        .json(&json!({"name": name}))
        .send()
        .await
        .expect("Failed to create store");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let store: Value = resp.json().await.expect("Failed to parse store");
    let id = store["id"]
        .as_str()
        .expect("store has an id")
        .parse()
        .expect("store id is a UUID");
    (id, store)
}

fn user_id(user: &Value) -> UserId {
    user["id"]
        .as_str()
        .expect("user has an id")
        .parse()
        .expect("user id is a UUID")
}

/// Test helper: grant a user clerk access to a store.
async fn grant_clerk(app: &TestApp, store_id: StoreId, user: &Value) {
    app.storage()
        .create_grant(NewGrant {
            store_id,
            user_id: user_id(user),
            role_in_store: StoreRole::Clerk,
        })
        .await
        .expect("Failed to create grant");
}

// ============================================================================
// Grants
// ============================================================================

#[tokio::test]
async fn test_granted_clerk_can_work_the_store() {
    let app = TestApp::spawn_with_visibility(StoreVisibility::OwnedAndGranted).await;
    let (owner, _) = app.login("owner@example.com", "StoreOwner").await;
    let (store_id, _) = create_store(&app, &owner, "Corner Shop").await;

    let (clerk, clerk_user) = app.login("clerk@example.com", "Clerk").await;
    grant_clerk(&app, store_id, &clerk_user).await;

    // The granted store shows up in the clerk's listing
    let stores: Value = clerk
        .get(app.url("/api/stores"))
        .send()
        .await
        .expect("Failed to list stores")
        .json()
        .await
        .expect("Failed to parse store list");
    let stores = stores.as_array().expect("Expected a JSON array");
    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0]["name"], "Corner Shop");

    // Reading and recording both work
    let resp = clerk
        .get(app.url(&format!("/api/stores/{store_id}")))
        .send()
        .await
        .expect("Failed to fetch store");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = clerk
        .post(app.url(&format!("/api/stores/{store_id}/transactions")))
        .json(&json!({"date": "2026-02-15", "amountSupplied": "42.00"}))
        .send()
        .await
        .expect("Failed to create transaction");
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_grant_does_not_leak_across_stores() {
    let app = TestApp::spawn_with_visibility(StoreVisibility::OwnedAndGranted).await;
    let (owner, _) = app.login("owner@example.com", "StoreOwner").await;
    let (granted_id, _) = create_store(&app, &owner, "Corner Shop").await;
    let (other_id, _) = create_store(&app, &owner, "Harbor Kiosk").await;

    let (clerk, clerk_user) = app.login("clerk@example.com", "Clerk").await;
    grant_clerk(&app, granted_id, &clerk_user).await;

    let resp = clerk
        .get(app.url(&format!("/api/stores/{granted_id}")))
        .send()
        .await
        .expect("Failed to fetch granted store");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = clerk
        .get(app.url(&format!("/api/stores/{other_id}")))
        .send()
        .await
        .expect("Failed to fetch other store");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_owned_only_hides_granted_stores_from_listing() {
    // Default deployment: listing shows owned stores only, but a grant
    // still opens direct access
    let app = TestApp::spawn().await;
    let (owner, _) = app.login("owner@example.com", "StoreOwner").await;
    let (store_id, _) = create_store(&app, &owner, "Corner Shop").await;

    let (clerk, clerk_user) = app.login("clerk@example.com", "Clerk").await;
    grant_clerk(&app, store_id, &clerk_user).await;

    let stores: Value = clerk
        .get(app.url("/api/stores"))
        .send()
        .await
        .expect("Failed to list stores")
        .json()
        .await
        .expect("Failed to parse store list");
    assert_eq!(stores.as_array().expect("Expected a JSON array").len(), 0);

    let resp = clerk
        .get(app.url(&format!("/api/stores/{store_id}")))
        .send()
        .await
        .expect("Failed to fetch store");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Admin Role
// ============================================================================

#[tokio::test]
async fn test_admin_sees_everything() {
    let app = TestApp::spawn().await;
    let (owner, _) = app.login("owner@example.com", "StoreOwner").await;
    let (store_id, _) = create_store(&app, &owner, "Corner Shop").await;

    let (admin, _) = app.login("admin@example.com", "Admin").await;

    // Admin listing includes stores it does not own
    let stores: Value = admin
        .get(app.url("/api/stores"))
        .send()
        .await
        .expect("Failed to list stores")
        .json()
        .await
        .expect("Failed to parse store list");
    assert_eq!(stores.as_array().expect("Expected a JSON array").len(), 1);

    // Direct access works without a grant
    let resp = admin
        .get(app.url(&format!("/api/stores/{store_id}")))
        .send()
        .await
        .expect("Failed to fetch store");
    assert_eq!(resp.status(), StatusCode::OK);

    // And the admin endpoint answers
    let resp = admin
        .get(app.url("/api/admin/stores"))
        .send()
        .await
        .expect("Failed to fetch admin listing");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_endpoint_rejects_other_roles() {
    let app = TestApp::spawn().await;
    let (owner, _) = app.login("owner@example.com", "StoreOwner").await;

    let resp = owner
        .get(app.url("/api/admin/stores"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["message"], "Admin access required");
}

// ============================================================================
// Session Lifecycle
// ============================================================================

#[tokio::test]
async fn test_login_returns_profile_and_session() {
    let app = TestApp::spawn().await;
    let (client, user) = app.login("owner@example.com", "StoreOwner").await;
    assert_eq!(user["email"], "owner@example.com");
    assert_eq!(user["role"], "StoreOwner");

    let profile: Value = client
        .get(app.url("/api/auth/user"))
        .send()
        .await
        .expect("Failed to fetch profile")
        .json()
        .await
        .expect("Failed to parse profile");
    assert_eq!(profile["id"], user["id"]);
}

#[tokio::test]
async fn test_login_never_changes_an_existing_role() {
    let app = TestApp::spawn().await;
    let (_client, user) = app.login("owner@example.com", "StoreOwner").await;

    // A second login asking for Admin does not escalate
    let (_client, same_user) = app.login("owner@example.com", "Admin").await;
    assert_eq!(same_user["id"], user["id"]);
    assert_eq!(same_user["role"], "StoreOwner");
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let app = TestApp::spawn().await;
    let (client, _user) = app.login("owner@example.com", "StoreOwner").await;

    let resp = client
        .post(app.url("/api/auth/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(app.url("/api/auth/user"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dev_login_disabled_in_production_config() {
    let app = TestApp::spawn_without_dev_login().await;

    let resp = app
        .client()
        .post(app.url("/api/auth/login"))
        .json(&json!({"email": "owner@example.com"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_login_email_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .client()
        .post(app.url("/api/auth/login"))
        .json(&json!({"email": "not-an-email"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["errors"][0]["field"], "email");
}
