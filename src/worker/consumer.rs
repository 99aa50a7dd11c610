//! Queue consumer - main worker loop

use crate::error::Result;
use crate::queue::{QueueClient, QueueMessage};
use crate::worker::processor::MessageProcessor;
use crate::worker::ProcessingOutcome;
use crate::worker::WorkerConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Queue consumer that receives and processes messages until shutdown.
///
/// At-least-once semantics: a message is deleted only after the processor
/// reports success; every other path leaves it to reappear once its
/// visibility timeout elapses. Messages within a batch are processed
/// sequentially since each one may drive a full browser session downstream.
pub struct Consumer<Q: QueueClient, P: MessageProcessor> {
    queue: Q,
    processor: P,
    config: WorkerConfig,
    shutdown: Arc<AtomicBool>,
}

impl<Q: QueueClient, P: MessageProcessor> Consumer<Q, P> {
    /// Create a new consumer
    pub fn new(queue: Q, processor: P, config: WorkerConfig) -> Self {
        Self {
            queue,
            processor,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a handle to signal shutdown
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Main consumer loop
    ///
    /// Long-polls for messages and processes them until shutdown is
    /// signaled. The flag is checked once per iteration: an in-flight batch
    /// finishes, no new receive call is issued after it is set.
    pub async fn run(&self) -> Result<()> {
        info!("Starting consumer...");
        info!("Batch size: {}", self.config.batch_size);
        info!("Task timeout: {:?}", self.config.task_timeout);

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.poll_once().await {
                Ok(0) => {
                    // Long poll returned empty, loop right back around
                }
                Ok(n) => {
                    info!("Finished batch of {} message(s)", n);
                }
                Err(e) => {
                    error!("Error receiving messages: {e}");
                    // Avoid a tight loop when the queue stays unreachable
                    sleep(self.config.receive_backoff).await;
                }
            }
        }

        info!("Shutdown signal received, consumer stopped");
        Ok(())
    }

    /// Issue one receive call and process everything it returns.
    ///
    /// Returns the number of messages handled. Message-level problems never
    /// surface here; only receive-level errors do.
    pub async fn poll_once(&self) -> Result<usize> {
        let messages = self
            .queue
            .receive(
                self.config.batch_size as i32,
                self.config.wait_time.as_secs() as i32,
            )
            .await?;

        let count = messages.len();
        for message in &messages {
            self.handle_message(message).await;
        }

        Ok(count)
    }

    /// Process one message and apply ack/nack to the queue
    async fn handle_message(&self, message: &QueueMessage) {
        // Keep the message hidden from other workers for as long as
        // processing may legitimately take
        self.extend_visibility(
            &message.receipt_handle,
            self.config.visibility_extension().as_secs() as i32,
        )
        .await;

        let body: serde_json::Value = match serde_json::from_str(&message.body) {
            Ok(value) => value,
            Err(e) => {
                // Not deleted: redelivered until the queue's redrive policy
                // dead-letters it
                error!(
                    "Failed to parse message body as JSON: {e} (id: {:?})",
                    message.message_id
                );
                return;
            }
        };

        match self.processor.process(&body).await {
            ProcessingOutcome::Success => match self.queue.delete(&message.receipt_handle).await {
                Ok(()) => info!("Successfully processed and deleted message"),
                Err(e) => {
                    // The message will be redelivered; processing must stay
                    // idempotent for exactly this case
                    error!("Failed to delete processed message: {e}");
                }
            },
            ProcessingOutcome::Failure => {
                warn!("Message processing failed, leaving message for redelivery");
            }
            ProcessingOutcome::Timeout => {
                warn!("Message processing timed out, leaving message for redelivery");
            }
        }
    }

    /// Best-effort visibility extension; losing it only risks a duplicate
    /// delivery, so failures are logged and never propagated
    async fn extend_visibility(&self, receipt_handle: &str, seconds: i32) {
        if let Err(e) = self.queue.change_visibility(receipt_handle, seconds).await {
            error!("Failed to extend visibility timeout: {e}");
        }
    }
}

/// Setup signal handlers for graceful shutdown.
///
/// Registered once at process entry; SIGINT and SIGTERM both set the
/// shared flag and the consumer drains cooperatively.
pub fn setup_signal_handler(shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(stream) => stream,
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {e}");
                    return;
                }
            };

            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!("Failed to listen for Ctrl+C: {e}");
                        return;
                    }
                    info!("Received Ctrl+C, initiating shutdown...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, initiating shutdown...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Received Ctrl+C, initiating shutdown...");
        }

        shutdown.store(true, Ordering::Relaxed);
    });
}
