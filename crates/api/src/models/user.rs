//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerflow_core::{Email, Role, UserId};

/// An authenticated user (domain type).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Given name, if known.
    pub first_name: Option<String>,
    /// Family name, if known.
    pub last_name: Option<String>,
    /// Avatar URL, if known.
    pub profile_image_url: Option<String>,
    /// Account-level role.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or refreshing a user record.
///
/// Existing users are matched by ID when one is given, by email otherwise.
/// An upsert refreshes profile fields but never changes the stored role;
/// `role` only applies to newly created users.
#[derive(Debug, Clone)]
pub struct UpsertUser {
    /// Stable identity ID; when `None` the email is the identity.
    pub id: Option<UserId>,
    pub email: Email,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    /// Role for newly created users; defaults to `StoreOwner` when absent.
    pub role: Option<Role>,
}
