//! Worker module for consuming and processing availability-check messages
//!
//! This module provides:
//! - Consumer: the queue consumption loop (receive, ack/nack, shutdown)
//! - AvailabilityProcessor: processes one decoded message body
//! - WorkerConfig: configuration for the consumer

pub mod config;
pub mod consumer;
pub mod processor;

pub use config::WorkerConfig;
pub use consumer::{setup_signal_handler, Consumer};
pub use processor::{AvailabilityProcessor, MessageProcessor, ProcessingOutcome};
