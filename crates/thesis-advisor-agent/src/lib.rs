mod gemini;
mod output;
mod request;
mod traits;

pub use gemini::{GeminiAgent, DEFAULT_GEMINI_URL};
pub use output::{AgentOutput, ToolCall};
pub use request::{AgentRequest, Message, Part, Role, ToolSpec};
pub use traits::{Agent, AgentConfig, AgentError};
