use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::{AgentOutput, AgentRequest};

/// Errors that can occur during an inference call
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Inference request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Inference service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Inference request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Agent configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid inference response: {0}")]
    InvalidResponse(String),

    #[error("Inference service returned no content")]
    EmptyResponse,
}

/// Configuration for an inference client
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model identifier passed to the service
    pub model: String,
    /// API key for the service
    pub api_key: Option<String>,
    /// Base URL override (tests point this at a mock server)
    pub base_url: Option<String>,
    /// Sampling temperature (None = service default)
    pub temperature: Option<f32>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Transport-level attempts on retryable HTTP statuses
    pub max_attempts: u32,
    /// Delay between transport-level attempts
    pub retry_delay: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            base_url: None,
            temperature: None,
            timeout: Duration::from_secs(120),
            max_attempts: 5,
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl AgentConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_retry(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = delay;
        self
    }
}

/// The core abstraction for a text-generation service
#[async_trait]
pub trait Agent: Send + Sync {
    /// Human-readable name of the backend (e.g., "Gemini")
    fn name(&self) -> &str;

    /// Model this agent sends requests to
    fn model(&self) -> &str;

    /// Run one inference call. Tools declared on the request are the only
    /// tools the model can call.
    async fn generate(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError>;

    /// Convenience wrapper for a single-turn, tool-less call
    async fn complete(&self, system: &str, prompt: &str) -> Result<AgentOutput, AgentError> {
        self.generate(&AgentRequest::new(system, prompt)).await
    }
}
