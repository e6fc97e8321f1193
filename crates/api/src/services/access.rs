//! Access-control evaluation.
//!
//! Decides whether a user may act on a store. The evaluator only answers
//! yes or no; handlers combine the answer with store existence to pick the
//! HTTP status.

use ledgerflow_core::{Role, StoreId, UserId};

use crate::storage::{Storage, StorageError};

/// Access-control evaluator.
pub struct AccessService<'a> {
    storage: &'a dyn Storage,
}

impl<'a> AccessService<'a> {
    /// Create a new access evaluator.
    #[must_use]
    pub const fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }

    /// Resolve a user's account-level role.
    ///
    /// Unknown users resolve to the default role instead of erroring, so a
    /// stale session can never read as an admin.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the lookup fails.
    pub async fn user_role(&self, user_id: UserId) -> Result<Role, StorageError> {
        let user = self.storage.get_user(user_id).await?;
        Ok(user.map_or_else(Role::default, |u| u.role))
    }

    /// Decide whether a user may act on a store.
    ///
    /// Admins may act on any store, owners on their own, everyone else needs
    /// a grant. A missing store answers `false` for non-admins; the admin
    /// check runs first and never loads the store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if a lookup fails.
    pub async fn can_access_store(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<bool, StorageError> {
        if self.user_role(user_id).await? == Role::Admin {
            return Ok(true);
        }

        let Some(store) = self.storage.get_store(store_id).await? else {
            return Ok(false);
        };
        if store.owner_id == user_id {
            return Ok(true);
        }

        Ok(self.storage.get_grant(store_id, user_id).await?.is_some())
    }
}
