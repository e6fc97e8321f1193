//! HTTP route handlers for the bookkeeping API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (storage ping)
//!
//! # Auth
//! GET  /api/auth/user          - Current user profile
//! POST /api/auth/login         - Dev login (404 unless enabled in config)
//! POST /api/auth/logout        - Clear session
//!
//! # Stores
//! GET    /api/stores                    - Stores visible to the caller
//! POST   /api/stores                    - Create store (201)
//! GET    /api/stores/{id}               - Store detail
//! PATCH  /api/stores/{id}               - Partial update
//! DELETE /api/stores/{id}               - Delete store and its data (204)
//! GET    /api/stores/{id}/balance       - Aggregated balance
//! GET    /api/stores/{id}/transactions  - Transactions, newest first
//! POST   /api/stores/{id}/transactions  - Record transaction (201)
//!
//! # Transactions (store derived from the record itself)
//! PATCH  /api/transactions/{id}  - Partial update
//! DELETE /api/transactions/{id}  - Delete (204)
//!
//! # Dashboard
//! GET  /api/dashboard/stats    - Totals across visible stores
//!
//! # Admin
//! GET  /api/admin/stores       - Every store (Admin role only)
//! ```
//!
//! Store-scoped routes check existence before permission: a missing store is
//! always 404, a store the caller may not touch is always 403.

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod stores;
pub mod transactions;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(auth::current_user))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the store routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stores::list_stores).post(stores::create_store))
        .route(
            "/{id}",
            get(stores::get_store)
                .patch(stores::update_store)
                .delete(stores::delete_store),
        )
        .route("/{id}/balance", get(stores::store_balance))
        .route(
            "/{id}/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
}

/// Create the transaction routes router (addressed by transaction id).
pub fn transaction_routes() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        patch(transactions::update_transaction).delete(transactions::delete_transaction),
    )
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/stats", get(dashboard::stats))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/stores", get(admin::list_all_stores))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health checks
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Auth routes
        .nest("/api/auth", auth_routes())
        // Store routes
        .nest("/api/stores", store_routes())
        // Transaction routes
        .nest("/api/transactions", transaction_routes())
        // Dashboard routes
        .nest("/api/dashboard", dashboard_routes())
        // Admin routes
        .nest("/api/admin", admin_routes())
}
