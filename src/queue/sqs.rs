//! SQS implementation of the queue client

use crate::error::{Result, WorkerError};
use crate::queue::{QueueClient, QueueMessage};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::Client;
use tracing::warn;

/// Default region, matching the platform deployment
pub const DEFAULT_REGION: &str = "us-east-2";

/// Queue client backed by AWS SQS
pub struct SqsQueueClient {
    client: Client,
    queue_url: String,
}

impl SqsQueueClient {
    /// Create a client for one queue URL.
    ///
    /// Credentials are resolved from the ambient AWS environment
    /// (env vars, profile, or instance role).
    pub async fn new(queue_url: &str, region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self {
            client: Client::new(&config),
            queue_url: queue_url.to_string(),
        }
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

#[async_trait]
impl QueueClient for SqsQueueClient {
    async fn receive(&self, max_messages: i32, wait_seconds: i32) -> Result<Vec<QueueMessage>> {
        let response = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_seconds)
            .send()
            .await
            .map_err(|e| WorkerError::QueueError(DisplayErrorContext(&e).to_string()))?;

        let mut messages = Vec::new();
        for message in response.messages.unwrap_or_default() {
            match (message.receipt_handle, message.body) {
                (Some(receipt_handle), Some(body)) => messages.push(QueueMessage {
                    receipt_handle,
                    body,
                    message_id: message.message_id,
                }),
                _ => {
                    // Cannot ack or parse a message missing either field
                    warn!(
                        "Skipping message without receipt handle or body (id: {:?})",
                        message.message_id
                    );
                }
            }
        }

        Ok(messages)
    }

    async fn delete(&self, receipt_handle: &str) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| WorkerError::QueueError(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    async fn change_visibility(&self, receipt_handle: &str, seconds: i32) -> Result<()> {
        self.client
            .change_message_visibility()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .visibility_timeout(seconds)
            .send()
            .await
            .map_err(|e| WorkerError::QueueError(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    async fn send(&self, body: String) -> Result<()> {
        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| WorkerError::QueueError(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}
