//! Integration tests for LedgerFlow.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ledgerflow-integration-tests
//! ```
//!
//! Most tests spawn the full router in-process against in-memory storage and
//! talk to it over real HTTP, cookies included, so sessions, extractors, and
//! status codes are exercised end to end. Tests in `live_postgres.rs` target
//! a running server with a real database instead and are ignored by default.

#![allow(clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use reqwest::Client;
use secrecy::SecretString;
use serde_json::{Value, json};

use ledgerflow_api::config::{ApiConfig, StoreVisibility};
use ledgerflow_api::middleware::create_memory_session_layer;
use ledgerflow_api::routes;
use ledgerflow_api::state::AppState;
use ledgerflow_api::storage::MemoryStorage;

/// A running API instance bound to an ephemeral port.
///
/// Holds the storage handle so tests can seed state the API has no endpoint
/// for (grants come from an operator, not the API).
pub struct TestApp {
    address: String,
    storage: Arc<MemoryStorage>,
}

impl TestApp {
    /// Spawn the API with in-memory storage, dev login enabled, and the
    /// default visibility rule (owned stores only).
    pub async fn spawn() -> Self {
        Self::spawn_with_visibility(StoreVisibility::OwnedOnly).await
    }

    /// Spawn with an explicit store visibility rule.
    pub async fn spawn_with_visibility(visibility: StoreVisibility) -> Self {
        Self::spawn_with_config(test_config(visibility)).await
    }

    /// Spawn with dev login disabled, as a production deployment runs.
    pub async fn spawn_without_dev_login() -> Self {
        let mut config = test_config(StoreVisibility::OwnedOnly);
        config.dev_login = false;
        Self::spawn_with_config(config).await
    }

    async fn spawn_with_config(config: ApiConfig) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let state = AppState::new(config.clone(), storage.clone());
        let session_layer = create_memory_session_layer(&config);

        let app = axum::Router::new()
            .merge(routes::routes())
            .layer(session_layer)
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let address = format!(
            "http://{}",
            listener.local_addr().expect("listener has no address")
        );

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Test server error");
        });

        Self { address, storage }
    }

    /// Direct handle to the backing storage for test setup.
    #[must_use]
    pub fn storage(&self) -> &MemoryStorage {
        &self.storage
    }

    /// Absolute URL for a request path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    /// HTTP client with a cookie store (sessions require one).
    #[must_use]
    pub fn client(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Log in via the dev endpoint and return the session-carrying client
    /// plus the user entity.
    ///
    /// The role only applies if the user does not exist yet.
    pub async fn login(&self, email: &str, role: &str) -> (Client, Value) {
        let client = self.client();
        let resp = client
            .post(self.url("/api/auth/login"))
            .json(&json!({"email": email, "role": role}))
            .send()
            .await
            .expect("Failed to send login request");
        assert_eq!(resp.status(), reqwest::StatusCode::OK, "login failed");

        let user: Value = resp.json().await.expect("Failed to parse login response");
        (client, user)
    }
}

fn test_config(visibility: StoreVisibility) -> ApiConfig {
    ApiConfig {
        // Never dialed; in-memory storage backs the tests
        database_url: SecretString::from("postgres://127.0.0.1/unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost".to_owned(),
        session_secret: SecretString::from("km3qXt7vRw9pZbN2cJf8hLs4TgYdMxA6"),
        dev_login: true,
        store_visibility: visibility,
        sentry_dsn: None,
        sentry_environment: None,
    }
}
