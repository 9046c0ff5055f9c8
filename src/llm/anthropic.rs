//! Anthropic Messages API client (blocking, via ureq).

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{AgentTurn, Conversation, MessageContent, ModelClient, ToolDeclaration, ToolRequest, Turn};
use crate::config::LlmConfig;
use crate::constants::{ANTHROPIC_API_URL, ANTHROPIC_VERSION};
use crate::{TickerError, TickerResult};

pub struct AnthropicClient {
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    timeout: Duration,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Value,
    #[serde(default)]
    stop_reason: Option<String>,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String, config: &LlmConfig) -> Self {
        Self {
            api_key,
            model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
            endpoint: ANTHROPIC_API_URL.to_string(),
        }
    }

    fn send(&self, body: &Value) -> TickerResult<AgentTurn> {
        let mut response = ureq::post(self.endpoint.as_str())
            .header("x-api-key", self.api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .config()
            .timeout_global(Some(self.timeout))
            .build()
            .send_json(body)
            .map_err(|e| TickerError::Provider(format!("Anthropic request failed: {}", e)))?;

        let parsed: MessagesResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| TickerError::Provider(format!("Invalid Anthropic response: {}", e)))?;

        tracing::debug!(model = %self.model, stop_reason = ?parsed.stop_reason, "Anthropic response");
        Ok(parse_response(&parsed.content))
    }
}

impl ModelClient for AnthropicClient {
    fn invoke(&self, conversation: &Conversation) -> TickerResult<AgentTurn> {
        let body = build_request(&self.model, self.max_tokens, self.temperature, conversation, &[]);
        self.send(&body)
    }

    fn invoke_with_tools(
        &self,
        conversation: &Conversation,
        tools: &[ToolDeclaration],
    ) -> TickerResult<AgentTurn> {
        let body = build_request(&self.model, self.max_tokens, self.temperature, conversation, tools);
        self.send(&body)
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

fn build_request(
    model: &str,
    max_tokens: u32,
    temperature: f64,
    conversation: &Conversation,
    tools: &[ToolDeclaration],
) -> Value {
    let mut body = json!({
        "model": model,
        "max_tokens": max_tokens,
        "temperature": temperature,
        "system": conversation.system(),
        "messages": build_messages(conversation),
    });
    if !tools.is_empty() {
        body["tools"] = Value::Array(
            tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "input_schema": t.parameters,
                    })
                })
                .collect(),
        );
    }
    body
}

/// Tool results following an assistant turn are grouped into one user
/// message, as the API requires.
fn build_messages(conversation: &Conversation) -> Vec<Value> {
    let mut messages = Vec::new();
    let mut pending_results: Vec<Value> = Vec::new();

    for turn in conversation.turns() {
        if let Turn::ToolResult { correlation_id, content } = turn {
            pending_results.push(json!({
                "type": "tool_result",
                "tool_use_id": correlation_id,
                "content": content,
            }));
            continue;
        }
        if !pending_results.is_empty() {
            messages.push(json!({"role": "user", "content": std::mem::take(&mut pending_results)}));
        }
        match turn {
            Turn::Human(text) => messages.push(json!({"role": "user", "content": text})),
            Turn::Agent(agent) => {
                let mut blocks: Vec<Value> = agent
                    .content
                    .text_parts()
                    .into_iter()
                    .map(|t| json!({"type": "text", "text": t}))
                    .collect();
                for req in &agent.tool_requests {
                    let input = if req.arguments.is_object() {
                        req.arguments.clone()
                    } else {
                        json!({})
                    };
                    blocks.push(json!({
                        "type": "tool_use",
                        "id": req.id,
                        "name": req.name,
                        "input": input,
                    }));
                }
                if !blocks.is_empty() {
                    messages.push(json!({"role": "assistant", "content": blocks}));
                }
            }
            Turn::ToolResult { .. } => {}
        }
    }
    if !pending_results.is_empty() {
        messages.push(json!({"role": "user", "content": pending_results}));
    }
    messages
}

fn parse_response(content: &Value) -> AgentTurn {
    let tool_requests = content
        .as_array()
        .map(|blocks| {
            blocks
                .iter()
                .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("tool_use"))
                .map(|b| ToolRequest {
                    id: b.get("id").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                    name: b.get("name").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                    arguments: b.get("input").cloned().unwrap_or_else(|| json!({})),
                })
                .collect()
        })
        .unwrap_or_default();

    AgentTurn {
        content: MessageContent::from_json(content),
        tool_requests,
    }
}
