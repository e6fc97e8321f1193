//! Balance aggregation.
//!
//! Balances are never stored; every figure is recomputed from the
//! transactions table on request. Sums are exact decimals and serialize as
//! strings with two fractional digits.

use rust_decimal::Decimal;
use serde::Serialize;

use ledgerflow_core::amount::fixed2;
use ledgerflow_core::{Role, StoreId, UserId};

use crate::config::StoreVisibility;
use crate::models::Store;
use crate::storage::{Storage, StorageError};

/// Aggregated totals for one store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreBalance {
    /// Sum of supplied amounts.
    #[serde(with = "fixed2")]
    pub total_supplied: Decimal,
    /// Sum of remaining amounts.
    #[serde(with = "fixed2")]
    pub total_remaining: Decimal,
    /// `total_supplied - total_remaining`; negative when more remains than
    /// was supplied.
    #[serde(with = "fixed2")]
    pub net_balance: Decimal,
}

/// Aggregated totals across every store visible to a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Number of visible stores.
    pub total_stores: usize,
    /// Sum of supplied amounts across visible stores.
    #[serde(with = "fixed2")]
    pub total_supplied: Decimal,
    /// Sum of remaining amounts across visible stores.
    #[serde(with = "fixed2")]
    pub total_remaining: Decimal,
    /// `total_supplied - total_remaining`.
    #[serde(with = "fixed2")]
    pub net_balance: Decimal,
}

/// Balance aggregator.
pub struct BalanceService<'a> {
    storage: &'a dyn Storage,
}

impl<'a> BalanceService<'a> {
    /// Create a new balance aggregator.
    #[must_use]
    pub const fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }

    /// Compute the balance of one store.
    ///
    /// A store without transactions reports zero across the board.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the aggregate query fails.
    pub async fn store_balance(&self, store_id: StoreId) -> Result<StoreBalance, StorageError> {
        let totals = self.storage.transaction_totals(&[store_id]).await?;
        Ok(StoreBalance {
            total_supplied: totals.supplied,
            total_remaining: totals.remaining,
            net_balance: totals.supplied - totals.remaining,
        })
    }

    /// List the stores a user can see.
    ///
    /// Admins see every store. Everyone else sees the stores they own, plus
    /// the ones they hold a grant for when the configured visibility allows
    /// it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the listing fails.
    pub async fn visible_stores(
        &self,
        user_id: UserId,
        role: Role,
        visibility: StoreVisibility,
    ) -> Result<Vec<Store>, StorageError> {
        match (role, visibility) {
            (Role::Admin, _) => self.storage.list_all_stores().await,
            (_, StoreVisibility::OwnedOnly) => self.storage.list_stores_owned_by(user_id).await,
            (_, StoreVisibility::OwnedAndGranted) => {
                self.storage.list_stores_for_user(user_id).await
            }
        }
    }

    /// Compute dashboard figures across the user's visible stores.
    ///
    /// An empty visible set short-circuits to zeroed figures without touching
    /// the transactions table.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if a query fails.
    pub async fn dashboard_stats(
        &self,
        user_id: UserId,
        role: Role,
        visibility: StoreVisibility,
    ) -> Result<DashboardStats, StorageError> {
        let stores = self.visible_stores(user_id, role, visibility).await?;
        if stores.is_empty() {
            return Ok(DashboardStats {
                total_stores: 0,
                total_supplied: Decimal::ZERO,
                total_remaining: Decimal::ZERO,
                net_balance: Decimal::ZERO,
            });
        }

        let ids: Vec<StoreId> = stores.iter().map(|s| s.id).collect();
        let totals = self.storage.transaction_totals(&ids).await?;
        Ok(DashboardStats {
            total_stores: stores.len(),
            total_supplied: totals.supplied,
            total_remaining: totals.remaining,
            net_balance: totals.supplied - totals.remaining,
        })
    }
}
