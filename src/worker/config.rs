//! Worker configuration

use std::time::Duration;

/// Worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum messages per receive call (processed sequentially)
    pub batch_size: usize,

    /// Long-poll wait on each receive call
    pub wait_time: Duration,

    /// Hard wall-clock limit for processing one message
    pub task_timeout: Duration,

    /// Sleep after a receive-level error before polling again
    pub receive_backoff: Duration,

    /// Slack added to `task_timeout` when extending message visibility
    pub visibility_margin: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            wait_time: Duration::from_secs(20),
            task_timeout: Duration::from_secs(1200), // 20 minutes
            receive_backoff: Duration::from_secs(1),
            visibility_margin: Duration::from_secs(60),
        }
    }
}

impl WorkerConfig {
    /// Create a new config builder
    pub fn builder() -> WorkerConfigBuilder {
        WorkerConfigBuilder::default()
    }

    /// Visibility timeout requested for an in-flight message
    pub fn visibility_extension(&self) -> Duration {
        self.task_timeout + self.visibility_margin
    }
}

/// Builder for WorkerConfig
#[derive(Default)]
pub struct WorkerConfigBuilder {
    config: WorkerConfig,
}

impl WorkerConfigBuilder {
    /// Set batch size (clamped to the SQS maximum of 10)
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size.clamp(1, 10);
        self
    }

    /// Set task timeout
    pub fn task_timeout(mut self, duration: Duration) -> Self {
        self.config.task_timeout = duration;
        self
    }

    /// Set task timeout in seconds
    pub fn task_timeout_secs(mut self, secs: u64) -> Self {
        self.config.task_timeout = Duration::from_secs(secs);
        self
    }

    /// Set long-poll wait time
    pub fn wait_time(mut self, duration: Duration) -> Self {
        self.config.wait_time = duration;
        self
    }

    /// Set backoff after receive errors
    pub fn receive_backoff(mut self, duration: Duration) -> Self {
        self.config.receive_backoff = duration;
        self
    }

    /// Build the config
    pub fn build(self) -> WorkerConfig {
        self.config
    }
}
