//! Transactional result store
//!
//! One transaction per message: the liveness ping and the result update
//! share a scope, commit consumes the transaction, and dropping it without
//! committing rolls back. The update is idempotent by `task_id` so an
//! at-least-once redelivery overwrites with identical data.

use crate::db::DbPool;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

/// Store the processor writes availability results through
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Open a transaction scoped to one message's processing
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>>;
}

/// A scoped unit of store work.
///
/// `commit` consumes the transaction; dropping it un-committed rolls back.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Trivial liveness check, run before any real work
    async fn ping(&mut self) -> Result<()>;

    /// Write the serialized availability items for one request row
    async fn save_response(&mut self, task_id: i32, response: &serde_json::Value) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}

/// PostgreSQL-backed result store
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStoreTransaction { tx }))
    }
}

struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn ping(&mut self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn save_response(&mut self, task_id: i32, response: &serde_json::Value) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE availability_requests
            SET response_data = $1
            WHERE id = $2
            "#,
        )
        .bind(response)
        .bind(task_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // The Postgres store is exercised against a live database; the
    // processor's transactional contract is covered with in-memory doubles
    // in worker::processor and tests/worker_flow.rs.
}
