//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::storage::Storage;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the storage backend and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    storage: Arc<dyn Storage>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `storage` - Storage backend (`PostgreSQL` in production)
    #[must_use]
    pub fn new(config: ApiConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, storage }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn storage(&self) -> &dyn Storage {
        self.inner.storage.as_ref()
    }
}
