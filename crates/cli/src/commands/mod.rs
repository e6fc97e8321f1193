//! CLI command implementations.

pub mod grant;
pub mod migrate;
pub mod seed;
pub mod user;
