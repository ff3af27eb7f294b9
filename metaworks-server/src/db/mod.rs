//! Database layer - connection pool, migrations and repositories
//!
//! - Connection pool shared through `AppState`
//! - Saves are upserts on the natural key (`ON CONFLICT`), no check-then-insert
//! - Transactions for multi-step writes

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
