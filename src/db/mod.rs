//! Database module
//!
//! PostgreSQL connection management and the transactional result store the
//! processor writes availability data through.

pub mod connection;
pub mod store;

pub use connection::{create_pool, create_pool_from_env, DbPool};
pub use store::{PgStore, ResultStore, StoreTransaction};
