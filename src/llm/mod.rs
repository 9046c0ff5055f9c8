//! Language-model conversation types and the client abstraction.
//!
//! A [`Conversation`] is a system instruction plus an ordered list of turns.
//! Clients turn it into a provider request and hand back an [`AgentTurn`]
//! that carries text, tool requests, or both.

pub mod anthropic;
pub mod openai;

use serde::{Deserialize, Serialize};

use crate::config::{Credentials, LlmConfig, ProviderKind};
use crate::constants::{FILE_PATH_ARG, GET_FILE_DIFF_TOOL};
use crate::TickerResult;

// ============================================================================
// CONTENT
// ============================================================================

/// One element of a segmented response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// Tool-use blocks, images, anything without text.
    Other,
}

/// Response content as returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    PlainText(String),
    Segments(Vec<Segment>),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::PlainText(String::new())
    }
}

impl MessageContent {
    /// Flatten to a string. Segments are joined with a single space and
    /// segments without text contribute an empty string.
    pub fn normalize(&self) -> String {
        match self {
            Self::PlainText(s) => s.clone(),
            Self::Segments(segments) => segments
                .iter()
                .map(|s| match s {
                    Segment::Text(t) => t.as_str(),
                    Segment::Other => "",
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Map a provider `content` field. Strings and arrays keep their shape;
    /// any other JSON value is stringified.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::PlainText(String::new()),
            Value::String(s) => Self::PlainText(s.clone()),
            Value::Array(items) => Self::Segments(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Segment::Text(s.clone()),
                        other => match other.get("text").and_then(|t| t.as_str()) {
                            Some(t) => Segment::Text(t.to_string()),
                            None => Segment::Other,
                        },
                    })
                    .collect(),
            ),
            other => Self::PlainText(other.to_string()),
        }
    }

    /// Text segments only, for replaying an agent turn to a provider.
    pub fn text_parts(&self) -> Vec<&str> {
        match self {
            Self::PlainText(s) if s.is_empty() => vec![],
            Self::PlainText(s) => vec![s.as_str()],
            Self::Segments(segments) => segments
                .iter()
                .filter_map(|s| match s {
                    Segment::Text(t) if !t.is_empty() => Some(t.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }
}

// ============================================================================
// TOOLS
// ============================================================================

/// One model-issued tool call. `id` must be echoed in the tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolRequest {
    pub fn string_arg(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

/// Tools the summarizer knows how to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolKind {
    GetFileDiff,
    Unrecognized(String),
}

impl ToolKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            GET_FILE_DIFF_TOOL => Self::GetFileDiff,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

/// Provider-neutral tool schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object.
    pub parameters: serde_json::Value,
}

impl ToolDeclaration {
    pub fn get_file_diff() -> Self {
        Self {
            name: GET_FILE_DIFF_TOOL.to_string(),
            description: "Get the diff content for a specific file in the commit. \
                Use this tool to request the diff for any file from the files changed list \
                when you need to analyze its changes in detail."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    FILE_PATH_ARG: {
                        "type": "string",
                        "description": "Path of the file, exactly as listed in Files Changed"
                    }
                },
                "required": [FILE_PATH_ARG]
            }),
        }
    }
}

// ============================================================================
// CONVERSATION
// ============================================================================

/// What the model said in one turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentTurn {
    pub content: MessageContent,
    pub tool_requests: Vec<ToolRequest>,
}

impl AgentTurn {
    pub fn text(s: impl Into<String>) -> Self {
        Self {
            content: MessageContent::PlainText(s.into()),
            tool_requests: Vec::new(),
        }
    }

    pub fn has_tool_requests(&self) -> bool {
        !self.tool_requests.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    Human(String),
    Agent(AgentTurn),
    ToolResult { correlation_id: String, content: String },
}

#[derive(Debug, Clone)]
pub struct Conversation {
    system: String,
    turns: Vec<Turn>,
    iterations: u32,
}

impl Conversation {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            turns: Vec::new(),
            iterations: 0,
        }
    }

    /// System instruction plus one human message.
    pub fn with_human(system: impl Into<String>, human: impl Into<String>) -> Self {
        let mut c = Self::new(system);
        c.push_human(human);
        c
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn push_human(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::Human(text.into()));
    }

    pub fn push_agent(&mut self, turn: AgentTurn) {
        self.turns.push(Turn::Agent(turn));
    }

    pub fn push_tool_result(&mut self, correlation_id: impl Into<String>, content: impl Into<String>) {
        self.turns.push(Turn::ToolResult {
            correlation_id: correlation_id.into(),
            content: content.into(),
        });
    }

    /// Count one completed request/dispatch cycle; returns the new count.
    pub fn record_iteration(&mut self) -> u32 {
        self.iterations += 1;
        self.iterations
    }

    pub fn last_agent_turn(&self) -> Option<&AgentTurn> {
        self.turns.iter().rev().find_map(|t| match t {
            Turn::Agent(a) => Some(a),
            _ => None,
        })
    }
}

// ============================================================================
// CLIENT
// ============================================================================

/// Blocking chat-model client.
pub trait ModelClient {
    /// Single exchange with no tools declared.
    fn invoke(&self, conversation: &Conversation) -> TickerResult<AgentTurn>;

    /// Exchange with `tools` declared; the reply may request tool calls.
    fn invoke_with_tools(
        &self,
        conversation: &Conversation,
        tools: &[ToolDeclaration],
    ) -> TickerResult<AgentTurn>;

    /// Whether `invoke_with_tools` is actually honoured.
    fn supports_tools(&self) -> bool {
        true
    }

    /// Short label for logs.
    fn name(&self) -> &str;
}

/// Build the configured client. Unknown provider or missing key is fatal.
pub fn create_client(config: &LlmConfig, credentials: &Credentials) -> TickerResult<Box<dyn ModelClient>> {
    let kind = config.provider_kind()?;
    let api_key = credentials.api_key(kind)?.to_string();
    let model = config.resolved_model(kind);
    tracing::info!(provider = kind.as_str(), model = %model, "Model client configured");

    let client: Box<dyn ModelClient> = match kind {
        ProviderKind::Anthropic => Box::new(anthropic::AnthropicClient::new(api_key, model, config)),
        ProviderKind::OpenAi => Box::new(openai::OpenAiClient::new(api_key, model, config)),
    };
    Ok(client)
}
