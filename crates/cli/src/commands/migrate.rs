//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! lf-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `LEDGERFLOW_DATABASE_URL` - `PostgreSQL` connection string (falls back
//!   to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! API migrations live in `crates/api/migrations/`. The session table is
//! managed by the session store itself and created after them.

use sqlx::PgPool;
use thiserror::Error;

use ledgerflow_api::middleware::session::migrate_session_store;
use ledgerflow_api::storage::run_migrations;

/// Errors that can occur during migration.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run API database migrations, then prepare the session table.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("LEDGERFLOW_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("LEDGERFLOW_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    run_migrations(&pool).await?;

    tracing::info!("Preparing session store...");
    migrate_session_store(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
