//! Store access grant commands.
//!
//! # Usage
//!
//! ```bash
//! # Let a clerk record transactions in someone else's store
//! lf-cli grant add -s 7c9e1dca-1111-4ce4-8b2a-000000000001 -u clerk@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `LEDGERFLOW_DATABASE_URL` - `PostgreSQL` connection string (falls back
//!   to `DATABASE_URL`)

use sqlx::PgPool;
use thiserror::Error;

use ledgerflow_api::models::NewGrant;
use ledgerflow_api::storage::{PgStorage, Storage, StorageError};
use ledgerflow_core::{Email, StoreId, StoreRole, UserId};

/// Errors that can occur during grant operations.
#[derive(Debug, Error)]
pub enum GrantError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Storage operation error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Store ID is not a valid UUID.
    #[error("Invalid store ID: {0}")]
    InvalidStoreId(String),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: Owner, Clerk")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No store with the given ID.
    #[error("No store found with ID: {0}")]
    StoreNotFound(StoreId),

    /// No user with the given email.
    #[error("No user found with email: {0}")]
    UserNotFound(String),
}

/// Grant a user access to a store.
///
/// # Arguments
///
/// * `store` - Store ID (UUID)
/// * `user_email` - Email of the user receiving access
/// * `role` - Role within the store (`Owner` or `Clerk`)
///
/// # Errors
///
/// Returns an error if inputs are invalid, the store or user does not
/// exist, or the user already has access.
pub async fn add(store: &str, user_email: &str, role: &str) -> Result<(), GrantError> {
    dotenvy::dotenv().ok();

    // Parse and validate inputs before touching the database
    let store_id: StoreId = store
        .parse()
        .map_err(|_| GrantError::InvalidStoreId(store.to_owned()))?;
    let role: StoreRole = role
        .parse()
        .map_err(|_| GrantError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(user_email).map_err(|e| GrantError::InvalidEmail(e.to_string()))?;

    let database_url = std::env::var("LEDGERFLOW_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| GrantError::MissingEnvVar("LEDGERFLOW_DATABASE_URL"))?;
    let pool = PgPool::connect(&database_url).await?;

    // Look up the user by email; grants are keyed by ID
    let user_id: Option<UserId> = sqlx::query_scalar(r"SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;
    let Some(user_id) = user_id else {
        return Err(GrantError::UserNotFound(email.to_string()));
    };

    let storage = PgStorage::new(pool);

    if storage.get_store(store_id).await?.is_none() {
        return Err(GrantError::StoreNotFound(store_id));
    }

    tracing::info!("Granting {} access to store {} as {}", email, store_id, role);

    storage
        .create_grant(NewGrant {
            store_id,
            user_id,
            role_in_store: role,
        })
        .await?;

    tracing::info!("Grant created successfully!");
    Ok(())
}
