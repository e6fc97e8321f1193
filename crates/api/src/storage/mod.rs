//! Storage layer for the bookkeeping API.
//!
//! ## Tables
//!
//! - `users` - Authenticated accounts
//! - `stores` - Stores owned by a single user
//! - `store_users` - Access grants for non-owners
//! - `transactions` - Bookkeeping entries per store
//! - `sessions` - Tower-sessions storage (managed by the session store)
//!
//! Handlers talk to the [`Storage`] trait; [`PgStorage`] is the production
//! backend and [`MemoryStorage`] backs tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p ledgerflow-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use ledgerflow_core::{StoreId, TransactionId, UserId};

use crate::models::{
    NewGrant, NewStore, NewTransaction, Store, StoreGrant, StoreUpdate, Transaction,
    TransactionTotals, TransactionUpdate, UpsertUser, User,
};

pub use memory::MemoryStorage;
pub use postgres::{PgStorage, run_migrations};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Storage operations needed by the API.
///
/// Every method takes `&self`; backends handle their own synchronization and
/// are shared across request handlers behind an `Arc`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the backend cannot be reached.
    async fn ping(&self) -> Result<(), StorageError>;

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the query fails.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// Create a user, or refresh the profile fields of an existing one.
    ///
    /// An existing user is matched by ID when one is given, by email
    /// otherwise. The stored role of an existing user is never changed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the given ID exists but the email
    /// belongs to another user.
    async fn upsert_user(&self, user: UpsertUser) -> Result<User, StorageError>;

    /// Create a store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the insert fails.
    async fn create_store(&self, store: NewStore) -> Result<Store, StorageError>;

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the query fails.
    async fn get_store(&self, id: StoreId) -> Result<Option<Store>, StorageError>;

    /// List stores owned by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the query fails.
    async fn list_stores_owned_by(&self, owner_id: UserId) -> Result<Vec<Store>, StorageError>;

    /// List stores a user owns or holds a grant for, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the query fails.
    async fn list_stores_for_user(&self, user_id: UserId) -> Result<Vec<Store>, StorageError>;

    /// List every store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the query fails.
    async fn list_all_stores(&self) -> Result<Vec<Store>, StorageError>;

    /// Apply the present fields of `update` to a store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the store doesn't exist.
    async fn update_store(&self, id: StoreId, update: StoreUpdate) -> Result<Store, StorageError>;

    /// Delete a store along with its grants and transactions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the store doesn't exist.
    async fn delete_store(&self, id: StoreId) -> Result<(), StorageError>;

    /// Get the access grant a user holds for a store, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the query fails.
    async fn get_grant(
        &self,
        store_id: StoreId,
        user_id: UserId,
    ) -> Result<Option<StoreGrant>, StorageError>;

    /// Create an access grant.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the user already holds a grant for
    /// the store.
    async fn create_grant(&self, grant: NewGrant) -> Result<StoreGrant, StorageError>;

    /// List a store's transactions, most recent date first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the query fails.
    async fn list_transactions(&self, store_id: StoreId)
    -> Result<Vec<Transaction>, StorageError>;

    /// Get a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the query fails.
    async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StorageError>;

    /// Record a transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the insert fails.
    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, StorageError>;

    /// Apply the present fields of `update` to a transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the transaction doesn't exist.
    async fn update_transaction(
        &self,
        id: TransactionId,
        update: TransactionUpdate,
    ) -> Result<Transaction, StorageError>;

    /// Delete a transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the transaction doesn't exist.
    async fn delete_transaction(&self, id: TransactionId) -> Result<(), StorageError>;

    /// Sum supplied and remaining amounts across the given stores.
    ///
    /// Stores without transactions contribute zero.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the query fails.
    async fn transaction_totals(
        &self,
        store_ids: &[StoreId],
    ) -> Result<TransactionTotals, StorageError>;
}
