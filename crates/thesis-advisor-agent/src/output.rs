use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A function call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Read a string argument
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(|v| v.as_str())
    }
}

/// Output captured from one inference call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOutput {
    /// Concatenated text parts
    pub text: String,
    /// Function calls, in the order the model emitted them
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    /// Model that produced the output
    pub model: String,
    /// Wall-clock duration of the call, retries included
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl AgentOutput {
    pub fn new(text: String, model: String, duration: Duration) -> Self {
        Self {
            text,
            tool_calls: Vec::new(),
            model,
            duration,
        }
    }

    pub fn with_tool_calls(mut self, calls: Vec<ToolCall>) -> Self {
        self.tool_calls = calls;
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs))
    }
}
