//! Queue module
//!
//! Provides the `QueueClient` abstraction the consumer is written against,
//! the SQS implementation, and the typed `Publisher` for the opposite
//! direction.

pub mod publisher;
pub mod sqs;

use crate::error::Result;
use async_trait::async_trait;

pub use publisher::Publisher;
pub use sqs::SqsQueueClient;

/// One received queue entry.
///
/// The receipt handle is the token for acknowledging (delete) or extending
/// visibility; the body is the raw JSON payload as published.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub receipt_handle: String,
    pub body: String,
    /// Provider-assigned id, for logging only
    pub message_id: Option<String>,
}

/// Operations the consumer requires from the queue service.
///
/// At-least-once semantics: a message not deleted before its visibility
/// timeout elapses is redelivered. No ordering is guaranteed and duplicates
/// must be tolerated downstream.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Receive up to `max_messages`, long-polling for `wait_seconds`
    async fn receive(&self, max_messages: i32, wait_seconds: i32) -> Result<Vec<QueueMessage>>;

    /// Acknowledge a message so it is never redelivered
    async fn delete(&self, receipt_handle: &str) -> Result<()>;

    /// Push back a message's redelivery deadline to `seconds` from now
    async fn change_visibility(&self, receipt_handle: &str, seconds: i32) -> Result<()>;

    /// Enqueue a raw JSON body
    async fn send(&self, body: String) -> Result<()>;
}
