use serde::{Deserialize, Serialize};

use crate::ToolCall;

/// Speaker of a message in the conversation sent to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One piece of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
    ToolCall { call: ToolCall },
    ToolResult { name: String, content: serde_json::Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    /// The model turn that requested the given tool calls
    pub fn tool_calls(calls: &[ToolCall]) -> Self {
        Self {
            role: Role::Model,
            parts: calls
                .iter()
                .cloned()
                .map(|call| Part::ToolCall { call })
                .collect(),
        }
    }

    /// The user turn answering tool calls, one result per call
    pub fn tool_results(results: Vec<(String, serde_json::Value)>) -> Self {
        Self {
            role: Role::User,
            parts: results
                .into_iter()
                .map(|(name, content)| Part::ToolResult { name, content })
                .collect(),
        }
    }

    /// All text parts joined with blank lines
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A function the model may call, described with a JSON schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Everything sent to the model in one inference call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    /// System instruction
    pub system: String,
    /// Conversation, oldest first
    pub messages: Vec<Message>,
    /// Declared tools. Empty means the model cannot call anything.
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
}

impl AgentRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            messages: vec![Message::user(prompt)],
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Drop all tool declarations, keeping the conversation
    pub fn without_tools(mut self) -> Self {
        self.tools.clear();
        self
    }

    pub fn has_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    /// Text of the first user message
    pub fn prompt(&self) -> String {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(Message::text)
            .unwrap_or_default()
    }
}
