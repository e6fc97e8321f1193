//! Business logic services for the bookkeeping API.
//!
//! # Services
//!
//! - `access` - Role resolution and store-level permission checks
//! - `balance` - Balance aggregation for stores and the dashboard

pub mod access;
pub mod balance;

pub use access::AccessService;
pub use balance::{BalanceService, DashboardStats, StoreBalance};
