//! Typed message publisher

use crate::error::{Result, WorkerError};
use crate::queue::QueueClient;
use serde::Serialize;

/// Publishes typed messages to a queue.
///
/// Serialization or enqueue failure surfaces as an error to the caller;
/// publishing is not retried internally.
pub struct Publisher<Q: QueueClient> {
    queue: Q,
}

impl<Q: QueueClient> Publisher<Q> {
    pub fn new(queue: Q) -> Self {
        Self { queue }
    }

    /// Serialize `message` to JSON and enqueue it
    pub async fn publish<T: Serialize>(&self, message: &T) -> Result<()> {
        let body = serde_json::to_string(message)?;
        self.queue
            .send(body)
            .await
            .map_err(|e| WorkerError::PublishError(e.to_string()))
    }
}
