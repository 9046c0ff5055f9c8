//! OpenAI Chat Completions client (blocking, via ureq).

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{AgentTurn, Conversation, MessageContent, ModelClient, ToolDeclaration, ToolRequest, Turn};
use crate::config::LlmConfig;
use crate::constants::OPENAI_API_URL;
use crate::{TickerError, TickerResult};

pub struct OpenAiClient {
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    timeout: Duration,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Value,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    id: String,
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    /// JSON-encoded arguments object.
    #[serde(default)]
    arguments: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, config: &LlmConfig) -> Self {
        Self {
            api_key,
            model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
            endpoint: OPENAI_API_URL.to_string(),
        }
    }

    fn send(&self, body: &Value) -> TickerResult<AgentTurn> {
        let mut response = ureq::post(self.endpoint.as_str())
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .config()
            .timeout_global(Some(self.timeout))
            .build()
            .send_json(body)
            .map_err(|e| TickerError::Provider(format!("OpenAI request failed: {}", e)))?;

        let parsed: ChatResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| TickerError::Provider(format!("Invalid OpenAI response: {}", e)))?;

        parse_response(parsed)
    }
}

impl ModelClient for OpenAiClient {
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
        "openai"
    }
}

fn build_request(
    model: &str,
    max_tokens: u32,
    temperature: f64,
    conversation: &Conversation,
    tools: &[ToolDeclaration],
) -> Value {
    let mut messages = vec![json!({"role": "system", "content": conversation.system()})];
    for turn in conversation.turns() {
        match turn {
            Turn::Human(text) => messages.push(json!({"role": "user", "content": text})),
            Turn::Agent(agent) => {
                let text = agent.content.text_parts().join("\n");
                let mut msg = json!({
                    "role": "assistant",
                    "content": if text.is_empty() { Value::Null } else { Value::String(text) },
                });
                if agent.has_tool_requests() {
                    msg["tool_calls"] = Value::Array(
                        agent
                            .tool_requests
                            .iter()
                            .map(|r| {
                                json!({
                                    "id": r.id,
                                    "type": "function",
                                    "function": {"name": r.name, "arguments": r.arguments.to_string()},
                                })
                            })
                            .collect(),
                    );
                }
                messages.push(msg);
            }
            Turn::ToolResult { correlation_id, content } => messages.push(json!({
                "role": "tool",
                "tool_call_id": correlation_id,
                "content": content,
            })),
        }
    }

    let mut body = json!({
        "model": model,
        "max_tokens": max_tokens,
        "temperature": temperature,
        "messages": messages,
    });
    if !tools.is_empty() {
        body["tools"] = Value::Array(
            tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect(),
        );
    }
    body
}

fn parse_response(response: ChatResponse) -> TickerResult<AgentTurn> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| TickerError::Provider("OpenAI response has no choices".into()))?;
    tracing::debug!(finish_reason = ?choice.finish_reason, "OpenAI response");

    let tool_requests = choice
        .message
        .tool_calls
        .into_iter()
        .map(|call| {
            // Malformed argument JSON reaches the tool as an empty object and
            // comes back as an inline error the model can react to.
            let arguments = serde_json::from_str(&call.function.arguments).unwrap_or_else(|e| {
                tracing::warn!(tool = %call.function.name, error = %e, "Unparseable tool arguments");
                json!({})
            });
            ToolRequest {
                id: call.id,
                name: call.function.name,
                arguments,
            }
        })
        .collect();

    Ok(AgentTurn {
        content: MessageContent::from_json(&choice.message.content),
        tool_requests,
    })
}
