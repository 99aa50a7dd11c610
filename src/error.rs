//! Error types for availability-worker

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Queue error: {0}")]
    QueueError(String),

    #[error("Failed to publish message: {0}")]
    PublishError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Agent request failed: {0}")]
    AgentRequestError(#[from] reqwest::Error),

    #[error("Agent error: {0}")]
    AgentError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Task timeout")]
    TaskTimeout,
}

pub type Result<T> = std::result::Result<T, WorkerError>;
