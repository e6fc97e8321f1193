//! Domain models for the bookkeeping API.
//!
//! These types represent validated domain objects separate from database row
//! types. Wire-facing structs serialize with camelCase field names.

pub mod session;
pub mod store;
pub mod transaction;
pub mod user;

pub use session::{CurrentUser, session_keys};
pub use store::{NewGrant, NewStore, Store, StoreGrant, StoreUpdate};
pub use transaction::{NewTransaction, Transaction, TransactionTotals, TransactionUpdate};
pub use user::{UpsertUser, User};
