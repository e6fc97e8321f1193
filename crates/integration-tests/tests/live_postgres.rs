//! End-to-end tests against a live server backed by `PostgreSQL`.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//!   (cargo run -p ledgerflow-cli -- migrate)
//! - The API server running with `LEDGERFLOW_DEV_LOGIN=true`
//!   (cargo run -p ledgerflow-api)
//!
//! Run with: cargo test -p ledgerflow-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API server (configurable via environment).
fn base_url() -> String {
    std::env::var("LEDGERFLOW_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Log in through the dev endpoint with a unique throwaway email and
/// return the session-carrying client.
async fn logged_in_client() -> Client {
    let client = Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client");

    let email = format!("integration-test-{}@example.com", Uuid::new_v4());
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({"email": email, "role": "StoreOwner"}))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(
        resp.status(),
        StatusCode::OK,
        "Dev login failed; is LEDGERFLOW_DEV_LOGIN=true?"
    );

    client
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running API server and PostgreSQL database"]
async fn test_health_endpoints() {
    let client = Client::new();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach health endpoint");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to reach readiness endpoint");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Bookkeeping Flow
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running API server and PostgreSQL database"]
async fn test_full_bookkeeping_flow() {
    let client = logged_in_client().await;
    let base_url = base_url();

    // Create a store
    let resp = client
        .post(format!("{base_url}/api/stores"))
        .json(&json!({"name": format!("Flow Test {}", Uuid::new_v4())}))
        .send()
        .await
        .expect("Failed to create store");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let store: Value = resp.json().await.expect("Failed to parse store");
    let store_id = store["id"].as_str().expect("store has an id").to_owned();

    // Record a transaction
    let resp = client
        .post(format!("{base_url}/api/stores/{store_id}/transactions"))
        .json(&json!({
            "date": "2026-02-15",
            "amountSupplied": "100.00",
            "amountRemaining": "25.50",
        }))
        .send()
        .await
        .expect("Failed to record transaction");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // The balance reflects it exactly
    let balance: Value = client
        .get(format!("{base_url}/api/stores/{store_id}/balance"))
        .send()
        .await
        .expect("Failed to fetch balance")
        .json()
        .await
        .expect("Failed to parse balance");
    assert_eq!(balance["totalSupplied"], "100.00");
    assert_eq!(balance["netBalance"], "74.50");

    // Clean up; the cascade removes the transaction too
    let resp = client
        .delete(format!("{base_url}/api/stores/{store_id}"))
        .send()
        .await
        .expect("Failed to delete store");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires a running API server and PostgreSQL database"]
async fn test_session_survives_requests() {
    let client = logged_in_client().await;
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/api/auth/user"))
        .send()
        .await
        .expect("Failed to fetch current user");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base_url}/api/auth/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!("{base_url}/api/auth/user"))
        .send()
        .await
        .expect("Failed to reach current user endpoint");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Access Control
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running API server and PostgreSQL database"]
async fn test_unauthenticated_requests_rejected() {
    let client = Client::new();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/api/stores"))
        .send()
        .await
        .expect("Failed to reach stores endpoint");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("{base_url}/api/dashboard/stats"))
        .send()
        .await
        .expect("Failed to reach dashboard endpoint");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
