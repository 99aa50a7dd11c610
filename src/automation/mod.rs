//! Browser automation seam
//!
//! The worker does not drive a browser itself; it hands the task text to an
//! agent service and gets structured availability data back. `TaskRunner`
//! is the seam the processor is written against.

pub mod agent;

use crate::error::Result;
use crate::messages::AvailabilityItems;
use async_trait::async_trait;

pub use agent::{AgentClient, AgentClientConfig};

/// Runs one availability-check task.
///
/// `Ok(None)` means the run finished but found no availability; that is a
/// valid outcome, not an error.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run_task(&self, task: &str) -> Result<Option<AvailabilityItems>>;
}
