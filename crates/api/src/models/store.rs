//! Store domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerflow_core::{GrantId, StoreId, StoreRole, UserId};

/// A store tracked by the bookkeeping system (domain type).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// Unique store ID.
    pub id: StoreId,
    /// Display name (1-150 characters).
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// User who owns this store.
    pub owner_id: UserId,
    /// When the store was created.
    pub created_at: DateTime<Utc>,
    /// When the store was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for creating a store.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
}

/// Validated fields for updating a store.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct StoreUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// An access grant giving a non-owner a role within a store (domain type).
///
/// Owners hold access to their stores implicitly and never appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreGrant {
    /// Unique grant ID.
    pub id: GrantId,
    /// Store the grant applies to.
    pub store_id: StoreId,
    /// User the grant is for.
    pub user_id: UserId,
    /// Role the user holds within the store.
    pub role_in_store: StoreRole,
    /// When the grant was created.
    pub created_at: DateTime<Utc>,
}

/// Fields for creating an access grant.
#[derive(Debug, Clone)]
pub struct NewGrant {
    pub store_id: StoreId,
    pub user_id: UserId,
    pub role_in_store: StoreRole,
}
