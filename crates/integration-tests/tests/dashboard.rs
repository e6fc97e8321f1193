//! Integration tests for the dashboard aggregate.
//!
//! The dashboard sums over exactly the stores the listing endpoint would
//! return, so these tests pin the figures to the visibility mode in force.

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use ledgerflow_api::config::StoreVisibility;
use ledgerflow_api::models::NewGrant;
use ledgerflow_api::storage::Storage;
use ledgerflow_core::{StoreId, StoreRole, UserId};
use ledgerflow_integration_tests::TestApp;

/// Test helper: create a store and return its typed ID.
async fn create_store(app: &TestApp, client: &Client, name: &str) -> StoreId {
    let resp = client
        .post(app.url("/api/stores"))
        .json(&json!({"name": name}))
        .send()
        .await
        .expect("Failed to create store");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let store: Value = resp.json().await.expect("Failed to parse store");
    store["id"]
        .as_str()
        .expect("store has an id")
        .parse()
        .expect("store id is a UUID")
}

/// Test helper: record a transaction against a store.
async fn record(app: &TestApp, client: &Client, store_id: StoreId, supplied: &str, remaining: &str) {
    let resp = client
        .post(app.url(&format!("/api/stores/{store_id}/transactions")))
        .json(&json!({
            "date": "2026-02-15",
            "amountSupplied": supplied,
            "amountRemaining": remaining,
        }))
        .send()
        .await
        .expect("Failed to create transaction");
    assert_eq!(resp.status(), StatusCode::CREATED);
}

/// Test helper: fetch the dashboard stats for a logged-in client.
async fn stats(app: &TestApp, client: &Client) -> Value {
    let resp = client
        .get(app.url("/api/dashboard/stats"))
        .send()
        .await
        .expect("Failed to fetch dashboard stats");
    assert_eq!(resp.status(), StatusCode::OK);

    resp.json().await.expect("Failed to parse dashboard stats")
}

// ============================================================================
// Totals
// ============================================================================

#[tokio::test]
async fn test_dashboard_zeroed_without_stores() {
    let app = TestApp::spawn().await;
    let (client, _) = app.login("owner@example.com", "StoreOwner").await;

    assert_eq!(
        stats(&app, &client).await,
        json!({
            "totalStores": 0,
            "totalSupplied": "0.00",
            "totalRemaining": "0.00",
            "netBalance": "0.00",
        })
    );
}

#[tokio::test]
async fn test_dashboard_sums_across_stores() {
    let app = TestApp::spawn().await;
    let (client, _) = app.login("owner@example.com", "StoreOwner").await;

    let shop = create_store(&app, &client, "Corner Shop").await;
    let kiosk = create_store(&app, &client, "Harbor Kiosk").await;
    record(&app, &client, shop, "100.00", "25.50").await;
    record(&app, &client, kiosk, "50.00", "0.00").await;

    assert_eq!(
        stats(&app, &client).await,
        json!({
            "totalStores": 2,
            "totalSupplied": "150.00",
            "totalRemaining": "25.50",
            "netBalance": "124.50",
        })
    );
}

#[tokio::test]
async fn test_dashboard_excludes_other_users_stores() {
    let app = TestApp::spawn().await;
    let (owner, _) = app.login("owner@example.com", "StoreOwner").await;
    let shop = create_store(&app, &owner, "Corner Shop").await;
    record(&app, &owner, shop, "100.00", "25.50").await;

    let (other, _) = app.login("other@example.com", "StoreOwner").await;
    let kiosk = create_store(&app, &other, "Harbor Kiosk").await;
    record(&app, &other, kiosk, "50.00", "0.00").await;

    let owner_stats = stats(&app, &owner).await;
    assert_eq!(owner_stats["totalStores"], 1);
    assert_eq!(owner_stats["totalSupplied"], "100.00");

    let other_stats = stats(&app, &other).await;
    assert_eq!(other_stats["totalStores"], 1);
    assert_eq!(other_stats["totalSupplied"], "50.00");
}

// ============================================================================
// Visibility
// ============================================================================

/// Seed an owner with one store and one transaction, then grant a clerk
/// access to it. Returns the clerk's client.
async fn seed_granted_clerk(app: &TestApp) -> Client {
    let (owner, _) = app.login("owner@example.com", "StoreOwner").await;
    let store_id = create_store(&app, &owner, "Corner Shop").await;
    record(&app, &owner, store_id, "100.00", "25.50").await;

    let (clerk, clerk_user) = app.login("clerk@example.com", "Clerk").await;
    let clerk_id: UserId = clerk_user["id"]
        .as_str()
        .expect("user has an id")
        .parse()
        .expect("user id is a UUID");
    app.storage()
        .create_grant(NewGrant {
            store_id,
            user_id: clerk_id,
            role_in_store: StoreRole::Clerk,
        })
        .await
        .expect("Failed to create grant");
    clerk
}

#[tokio::test]
async fn test_dashboard_counts_granted_stores_when_configured() {
    let app = TestApp::spawn_with_visibility(StoreVisibility::OwnedAndGranted).await;
    let clerk = seed_granted_clerk(&app).await;

    assert_eq!(
        stats(&app, &clerk).await,
        json!({
            "totalStores": 1,
            "totalSupplied": "100.00",
            "totalRemaining": "25.50",
            "netBalance": "74.50",
        })
    );
}

#[tokio::test]
async fn test_dashboard_owned_only_ignores_grants() {
    let app = TestApp::spawn().await;
    let clerk = seed_granted_clerk(&app).await;

    // The grant still allows direct access, but the dashboard only counts
    // owned stores under the default visibility
    let clerk_stats = stats(&app, &clerk).await;
    assert_eq!(clerk_stats["totalStores"], 0);
    assert_eq!(clerk_stats["totalSupplied"], "0.00");
}

#[tokio::test]
async fn test_dashboard_admin_sees_all_stores() {
    let app = TestApp::spawn().await;
    let (owner, _) = app.login("owner@example.com", "StoreOwner").await;
    let shop = create_store(&app, &owner, "Corner Shop").await;
    record(&app, &owner, shop, "100.00", "25.50").await;

    let (other, _) = app.login("other@example.com", "StoreOwner").await;
    create_store(&app, &other, "Harbor Kiosk").await;

    let (admin, _) = app.login("admin@example.com", "Admin").await;
    let admin_stats = stats(&app, &admin).await;
    assert_eq!(admin_stats["totalStores"], 2);
    assert_eq!(admin_stats["totalSupplied"], "100.00");
    assert_eq!(admin_stats["netBalance"], "74.50");
}
