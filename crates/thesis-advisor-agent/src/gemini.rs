use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::{
    Agent, AgentConfig, AgentError, AgentOutput, AgentRequest, Message, Part, Role, ToolCall,
    ToolSpec,
};

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// HTTP statuses worth another attempt
const RETRYABLE_STATUSES: [u16; 4] = [429, 500, 503, 504];

/// Gemini `generateContent` client
pub struct GeminiAgent {
    config: AgentConfig,
    client: reqwest::Client,
}

impl GeminiAgent {
    pub fn new(config: AgentConfig) -> Result<Self, AgentError> {
        if config.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(AgentError::ConfigError(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_GEMINI_URL)
            .trim_end_matches('/');
        format!("{}/v1beta/models/{}:generateContent", base, self.config.model)
    }

    fn build_body(&self, request: &AgentRequest) -> GenerateRequest {
        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![WireTool {
                function_declarations: request.tools.iter().map(WireFunctionDecl::from).collect(),
            }]
        };

        GenerateRequest {
            system_instruction: (!request.system.is_empty()).then(|| WireContent {
                role: None,
                parts: vec![WirePart::text(&request.system)],
            }),
            contents: request.messages.iter().map(WireContent::from).collect(),
            tools,
            generation_config: self.config.temperature.map(|t| GenerationConfig {
                temperature: Some(t),
            }),
        }
    }

    async fn post(&self, body: &GenerateRequest) -> Result<GenerateResponse, AgentError> {
        let url = self.endpoint();
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let mut attempt = 1;

        loop {
            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(body)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        AgentError::Timeout(self.config.timeout)
                    } else {
                        AgentError::RequestFailed(e)
                    }
                })?;

            let status = response.status();
            if status.is_success() {
                return response
                    .json::<GenerateResponse>()
                    .await
                    .map_err(|e| AgentError::InvalidResponse(e.to_string()));
            }

            let body_text = response.text().await.unwrap_or_default();
            if RETRYABLE_STATUSES.contains(&status.as_u16()) && attempt < self.config.max_attempts
            {
                warn!(
                    status = status.as_u16(),
                    attempt,
                    max_attempts = self.config.max_attempts,
                    "Retryable inference status, backing off"
                );
                attempt += 1;
                tokio::time::sleep(self.config.retry_delay).await;
                continue;
            }

            return Err(AgentError::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }
    }
}

#[async_trait]
impl Agent for GeminiAgent {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError> {
        let start = Instant::now();
        debug!(
            model = %self.config.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending inference request"
        );

        let body = self.build_body(request);
        let response = self.post(&body).await?;

        let candidate = match response.candidates.into_iter().next() {
            Some(c) => c,
            None => {
                let reason = response
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "no candidates".to_string());
                return Err(AgentError::InvalidResponse(reason));
            }
        };

        let mut texts = Vec::new();
        let mut calls = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(text) = part.text {
                texts.push(text);
            }
            if let Some(call) = part.function_call {
                calls.push(ToolCall::new(call.name, call.args));
            }
        }

        let text = texts.join("");
        if text.trim().is_empty() && calls.is_empty() {
            return Err(AgentError::EmptyResponse);
        }

        let duration = start.elapsed();
        debug!(
            text_len = text.len(),
            tool_calls = calls.len(),
            duration_ms = duration.as_millis(),
            "Inference completed"
        );

        Ok(AgentOutput::new(text, self.config.model.clone(), duration).with_tool_calls(calls))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

impl From<&Message> for WireContent {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            Role::User => "user",
            Role::Model => "model",
        };
        Self {
            role: Some(role.to_string()),
            parts: message.parts.iter().map(WirePart::from).collect(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<WireFunctionResponse>,
}

impl WirePart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }
}

impl From<&Part> for WirePart {
    fn from(part: &Part) -> Self {
        match part {
            Part::Text { text } => WirePart::text(text),
            Part::ToolCall { call } => WirePart {
                function_call: Some(WireFunctionCall {
                    name: call.name.clone(),
                    args: call.args.clone(),
                }),
                ..Default::default()
            },
            Part::ToolResult { name, content } => WirePart {
                function_response: Some(WireFunctionResponse {
                    name: name.clone(),
                    response: content.clone(),
                }),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTool {
    function_declarations: Vec<WireFunctionDecl>,
}

#[derive(Debug, Serialize)]
struct WireFunctionDecl {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

impl From<&ToolSpec> for WireFunctionDecl {
    fn from(spec: &ToolSpec) -> Self {
        Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            parameters: spec.parameters.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<WireContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
