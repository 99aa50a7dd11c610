//! Availability Worker - a queue consumer for venue availability checks
//!
//! The worker pulls "check availability" tasks off an SQS queue, hands each
//! task to a browser-agent service, and persists the structured result to
//! PostgreSQL. Delivery is at-least-once: a message is only deleted after
//! successful processing, everything else leaves it for redelivery, and
//! the result write is idempotent by task id.

pub mod automation;
pub mod config;
pub mod db;
pub mod error;
pub mod messages;
pub mod queue;
pub mod worker;

pub use automation::{AgentClient, TaskRunner};
pub use config::Settings;
pub use error::{Result, WorkerError};
pub use messages::{
    AvailabilityItem, AvailabilityItems, AvailabilityRequest, CreateTaskRequest,
};
pub use queue::{Publisher, QueueClient, QueueMessage, SqsQueueClient};
pub use worker::{
    setup_signal_handler, AvailabilityProcessor, Consumer, MessageProcessor, ProcessingOutcome,
    WorkerConfig,
};
