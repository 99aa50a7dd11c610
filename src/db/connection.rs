//! Database connection management

use crate::error::{Result, WorkerError};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Type alias for the database pool
pub type DbPool = PgPool;

const REQUIRED_VARS: &[&str] = &[
    "POSTGRES_USER",
    "POSTGRES_PASSWORD",
    "POSTGRES_HOST",
    "POSTGRES_PORT",
    "POSTGRES_DB",
];

/// Create a new database connection pool.
///
/// The pool is kept small on purpose: the worker holds at most one
/// transaction at a time, scoped to the message being processed.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(30))
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Create a pool from the `POSTGRES_*` environment variables.
///
/// All five variables are required; the error lists every missing one so a
/// misconfigured deployment fails at startup with the full picture.
pub async fn create_pool_from_env() -> Result<DbPool> {
    let missing: Vec<&str> = REQUIRED_VARS
        .iter()
        .copied()
        .filter(|name| std::env::var(name).map_or(true, |v| v.is_empty()))
        .collect();
    if !missing.is_empty() {
        return Err(WorkerError::ConfigError(format!(
            "Missing environment variables: {}",
            missing.join(", ")
        )));
    }

    let database_url = format!(
        "postgres://{}:{}@{}:{}/{}",
        std::env::var("POSTGRES_USER").unwrap_or_default(),
        std::env::var("POSTGRES_PASSWORD").unwrap_or_default(),
        std::env::var("POSTGRES_HOST").unwrap_or_default(),
        std::env::var("POSTGRES_PORT").unwrap_or_default(),
        std::env::var("POSTGRES_DB").unwrap_or_default(),
    );

    create_pool(&database_url).await
}
