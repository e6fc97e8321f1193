//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a user (role applies only when the user is new)
//! lf-cli user create -e owner@example.com -f Ada -l Lovelace -r StoreOwner
//!
//! # Promote an existing user to admin
//! lf-cli user promote -e owner@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `LEDGERFLOW_DATABASE_URL` - `PostgreSQL` connection string (falls back
//!   to `DATABASE_URL`)

use sqlx::PgPool;
use thiserror::Error;

use ledgerflow_api::models::UpsertUser;
use ledgerflow_api::storage::{PgStorage, Storage, StorageError};
use ledgerflow_core::{Email, Role, UserId};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Storage operation error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: Admin, StoreOwner, Clerk")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No user with the given email.
    #[error("No user found with email: {0}")]
    UserNotFound(String),
}

/// Create a new user, or refresh the profile of an existing one.
///
/// # Arguments
///
/// * `email` - User's email address
/// * `first_name` - Optional first name
/// * `last_name` - Optional last name
/// * `role` - User's role (`Admin`, `StoreOwner`, or `Clerk`); applies only
///   when the user is new
///
/// # Returns
///
/// The ID of the created or existing user.
///
/// # Errors
///
/// Returns an error if inputs are invalid or the database is unreachable.
pub async fn create(
    email: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
    role: &str,
) -> Result<UserId, UserError> {
    dotenvy::dotenv().ok();

    // Parse and validate inputs before touching the database
    let role: Role = role
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|e| UserError::InvalidEmail(e.to_string()))?;

    let pool = connect().await?;
    let storage = PgStorage::new(pool);

    tracing::info!("Creating user: {} ({})", email, role);

    let user = storage
        .upsert_user(UpsertUser {
            id: None,
            email,
            first_name: first_name.map(ToOwned::to_owned),
            last_name: last_name.map(ToOwned::to_owned),
            profile_image_url: None,
            role: Some(role),
        })
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );

    Ok(user.id)
}

/// Promote an existing user to the admin role.
///
/// The API never changes roles; promotion is an operator action.
///
/// # Errors
///
/// Returns an error if the email is invalid or no user carries it.
pub async fn promote(email: &str) -> Result<(), UserError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| UserError::InvalidEmail(e.to_string()))?;

    let pool = connect().await?;

    tracing::info!("Promoting user to admin: {}", email);

    let result = sqlx::query(r"UPDATE users SET role = $1, updated_at = NOW() WHERE email = $2")
        .bind(Role::Admin)
        .bind(&email)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(UserError::UserNotFound(email.to_string()));
    }

    tracing::info!("User promoted successfully! Role takes effect on their next request.");
    Ok(())
}

async fn connect() -> Result<PgPool, UserError> {
    let database_url = std::env::var("LEDGERFLOW_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| UserError::MissingEnvVar("LEDGERFLOW_DATABASE_URL"))?;

    Ok(PgPool::connect(&database_url).await?)
}
