//! Queue message and availability result types
//!
//! The wire format for a queued availability check is:
//! `{"task_data": {"task": "<instructions>"}, "task_id": <row id>}`

use crate::error::{Result, WorkerError};
use serde::{Deserialize, Serialize};

/// Task description wrapper, as published by the platform API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub task: String,
}

/// Decoded queue message body for one availability check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub task_data: CreateTaskRequest,
    /// References the `availability_requests` row the result is written to
    pub task_id: i32,
}

impl AvailabilityRequest {
    /// Decode and validate a raw message body.
    ///
    /// A shape mismatch or an empty task is an `InvalidRequest` error, which
    /// the processor maps to a failure outcome rather than a crash.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let request: Self = serde_json::from_value(value.clone())?;
        if request.task_data.task.trim().is_empty() {
            return Err(WorkerError::InvalidRequest(
                "task must not be empty".to_string(),
            ));
        }
        Ok(request)
    }
}

/// One scraped availability slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityItem {
    pub date: String,
    pub times: Vec<String>,
}

/// Typed result of one browser-agent run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityItems {
    pub items: Vec<AvailabilityItem>,
    #[serde(default)]
    pub captcha_encountered: bool,
}
