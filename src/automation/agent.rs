//! HTTP client for the browser-agent service

use crate::automation::TaskRunner;
use crate::error::{Result, WorkerError};
use crate::messages::AvailabilityItems;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the agent service client
#[derive(Debug, Clone)]
pub struct AgentClientConfig {
    /// Connection timeout (default: 10 seconds)
    pub connect_timeout: Duration,
    /// Request timeout; generous, an agent run drives a full browser
    /// session (default: 30 minutes, the per-message timeout cuts in first)
    pub request_timeout: Duration,
    /// Model the agent should use
    pub model: String,
}

impl Default for AgentClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(1800),
            model: "gemini-2.0-flash-exp".to_string(),
        }
    }
}

#[derive(Serialize)]
struct AgentRunRequest<'a> {
    task: &'a str,
    model: &'a str,
    api_key: &'a str,
}

#[derive(Deserialize)]
struct AgentRunResponse {
    /// JSON-encoded `AvailabilityItems`, absent when the agent produced
    /// no final result
    final_result: Option<String>,
}

/// Client for the browser-agent service.
///
/// The service runs the actual browser automation; this client submits the
/// task text plus the model credential and validates the typed result.
pub struct AgentClient {
    client: Client,
    base_url: String,
    api_key: String,
    config: AgentClientConfig,
}

impl AgentClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Self::with_config(base_url, api_key, AgentClientConfig::default())
    }

    pub fn with_config(base_url: &str, api_key: &str, config: AgentClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            config,
        })
    }
}

#[async_trait]
impl TaskRunner for AgentClient {
    async fn run_task(&self, task: &str) -> Result<Option<AvailabilityItems>> {
        info!("Submitting task to browser agent");
        debug!("Task: {}", task);

        let response = self
            .client
            .post(format!("{}/run", self.base_url))
            .json(&AgentRunRequest {
                task,
                model: &self.config.model,
                api_key: &self.api_key,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WorkerError::AgentError(format!(
                "agent service returned HTTP {status}"
            )));
        }

        let run: AgentRunResponse = response.json().await?;
        let Some(raw) = run.final_result else {
            debug!("Agent run produced no final result");
            return Ok(None);
        };

        let items: AvailabilityItems = serde_json::from_str(&raw)?;
        if items.captcha_encountered {
            info!("Agent reported a captcha during the run");
        }
        Ok(Some(items))
    }
}
