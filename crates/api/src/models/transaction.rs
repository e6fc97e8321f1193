//! Transaction domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerflow_core::{Amount, StoreId, TransactionId, UserId};

/// A bookkeeping entry for one store (domain type).
///
/// Records the value of goods supplied to the store and the balance still
/// outstanding after the entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique transaction ID.
    pub id: TransactionId,
    /// Store this entry belongs to.
    pub store_id: StoreId,
    /// Business date of the entry.
    pub date: DateTime<Utc>,
    /// Value of goods supplied.
    pub amount_supplied: Amount,
    /// Balance remaining after the entry.
    pub amount_remaining: Amount,
    /// Optional free-form notes.
    pub notes: Option<String>,
    /// User who recorded the entry.
    pub created_by: UserId,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
    /// When the entry was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for recording a transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub store_id: StoreId,
    pub date: DateTime<Utc>,
    pub amount_supplied: Amount,
    pub amount_remaining: Amount,
    pub notes: Option<String>,
    pub created_by: UserId,
}

/// Validated fields for updating a transaction.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub date: Option<DateTime<Utc>>,
    pub amount_supplied: Option<Amount>,
    pub amount_remaining: Option<Amount>,
    pub notes: Option<String>,
}

/// Summed amounts across a set of transactions.
///
/// Sums are plain decimals rather than [`Amount`]s: many entries can add up
/// past the single-entry cap, and derived figures like net balances can go
/// negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionTotals {
    /// Sum of supplied amounts.
    pub supplied: Decimal,
    /// Sum of remaining amounts.
    pub remaining: Decimal,
}
