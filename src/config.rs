//! Environment-based settings
//!
//! Everything the worker needs beyond the database credentials (those live
//! in `db::connection`). Missing required values are a startup-time fatal
//! error, never a runtime one.

use crate::error::{Result, WorkerError};
use crate::queue::sqs::DEFAULT_REGION;

/// Default per-message timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 1200;

/// Worker settings loaded from the environment
#[derive(Debug, Clone)]
pub struct Settings {
    /// SQS queue URL (`QUEUE_URL`, required)
    pub queue_url: String,
    /// AWS region (`AWS_REGION`, default us-east-2)
    pub region: String,
    /// Model credential forwarded to the browser agent
    /// (`GEMINI_API_KEY`, required; never logged)
    pub gemini_api_key: String,
    /// Browser-agent service endpoint (`AGENT_URL`, required)
    pub agent_url: String,
    /// Per-message timeout (`TIMEOUT_SECONDS`, default 1200)
    pub timeout_seconds: u64,
    /// Redrive cap configured on the queue (`QUEUE_MAX_RECEIVES`).
    /// Informational: dead-lettering happens queue-side, the worker only
    /// surfaces whether a cap exists.
    pub queue_max_receives: Option<u32>,
}

impl Settings {
    /// Load settings for worker mode
    pub fn from_env() -> Result<Self> {
        let timeout_seconds = match std::env::var("TIMEOUT_SECONDS") {
            Ok(value) => value.parse().map_err(|_| {
                WorkerError::ConfigError(format!("TIMEOUT_SECONDS is not a number: {value}"))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECONDS,
        };

        let queue_max_receives = match std::env::var("QUEUE_MAX_RECEIVES") {
            Ok(value) => Some(value.parse().map_err(|_| {
                WorkerError::ConfigError(format!("QUEUE_MAX_RECEIVES is not a number: {value}"))
            })?),
            Err(_) => None,
        };

        Ok(Self {
            queue_url: require_env("QUEUE_URL")?,
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            agent_url: require_env("AGENT_URL")?,
            timeout_seconds,
            queue_max_receives,
        })
    }
}

/// Read a required environment variable, rejecting empty values
pub fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(WorkerError::ConfigError(format!(
            "{name} environment variable is required"
        ))),
    }
}
