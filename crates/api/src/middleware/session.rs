//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. Tests and the
//! dev loop can swap in the in-memory store instead.

use sqlx::PgPool;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::ApiConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ledgerflow_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool
/// * `config` - API configuration (for cookie security settings)
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &ApiConfig,
) -> SessionManagerLayer<PostgresStore> {
    // Create the PostgreSQL session store
    // Note: The sessions table must be created via `lf-cli migrate`
    let store = PostgresStore::new(pool.clone());

    configure_layer(SessionManagerLayer::new(store), config)
}

/// Create a session layer backed by process memory.
///
/// Sessions vanish on restart; only suitable for tests and local development.
#[must_use]
pub fn create_memory_session_layer(config: &ApiConfig) -> SessionManagerLayer<MemoryStore> {
    configure_layer(SessionManagerLayer::new(MemoryStore::default()), config)
}

/// Create the session table if it does not exist yet.
///
/// # Errors
///
/// Returns an error if the schema statement fails.
pub async fn migrate_session_store(pool: &PgPool) -> Result<(), sqlx::Error> {
    PostgresStore::new(pool.clone()).migrate().await
}

fn configure_layer<S: tower_sessions::SessionStore>(
    layer: SessionManagerLayer<S>,
    config: &ApiConfig,
) -> SessionManagerLayer<S> {
    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");

    layer
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
