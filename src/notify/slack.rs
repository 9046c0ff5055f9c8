//! Slack `chat.postMessage` delivery over ureq.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use super::chunker::split_message;
use super::NotificationSink;
use crate::config::SlackConfig;
use crate::constants::{SLACK_FALLBACK_TEXT, SLACK_POST_MESSAGE_URL, SLACK_TIMEOUT_SECS};
use crate::{TickerError, TickerResult};

// ============================================================================
// Value types
// ============================================================================

/// Channel name without the `#` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackChannel(String);

impl SlackChannel {
    pub fn new(name: &str) -> TickerResult<Self> {
        if name.is_empty() {
            return Err(TickerError::InvalidInput("Channel name cannot be empty".into()));
        }
        if let Some(stripped) = name.strip_prefix('#') {
            return Err(TickerError::InvalidInput(format!(
                "Channel name should not include the # prefix. Use '{}' instead of '{}'",
                stripped, name
            )));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(TickerError::InvalidInput(format!(
                "Invalid channel name '{}'. Channel names can only contain lowercase letters, \
                 numbers, hyphens, and underscores",
                name
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackMessage {
    text: String,
    title: Option<String>,
}

impl SlackMessage {
    pub fn new(text: impl Into<String>, title: Option<String>) -> TickerResult<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(TickerError::InvalidInput("Message text cannot be empty".into()));
        }
        Ok(Self { text, title })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

// ============================================================================
// Wire format
// ============================================================================

/// Optional header block, then one mrkdwn section per chunk.
pub fn build_blocks(message: &SlackMessage, max_block_size: usize) -> Vec<Value> {
    let mut blocks = Vec::new();
    if let Some(title) = message.title() {
        blocks.push(json!({
            "type": "header",
            "text": {"type": "plain_text", "text": title, "emoji": true}
        }));
    }
    for chunk in split_message(message.text(), max_block_size) {
        // Slack rejects sections with empty text.
        if chunk.trim().is_empty() {
            continue;
        }
        blocks.push(json!({
            "type": "section",
            "text": {"type": "mrkdwn", "text": chunk}
        }));
    }
    blocks
}

pub fn build_payload(channel: &SlackChannel, message: &SlackMessage, max_block_size: usize) -> Value {
    json!({
        "channel": channel.as_str(),
        "blocks": build_blocks(message, max_block_size),
        "text": message.title().unwrap_or(SLACK_FALLBACK_TEXT),
    })
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

fn classify_api_error(code: &str, channel: &SlackChannel) -> TickerError {
    match code {
        "channel_not_found" => TickerError::ChannelNotFound(channel.as_str().to_string()),
        "not_in_channel" => TickerError::NotInChannel(channel.as_str().to_string()),
        "invalid_auth" | "not_authed" | "token_revoked" => TickerError::InvalidCredential,
        other => TickerError::Delivery(format!("Slack API error: {}", other)),
    }
}

// ============================================================================
// Notifier
// ============================================================================

pub struct SlackNotifier {
    token: String,
    endpoint: String,
    max_block_size: usize,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn new(token: String, config: &SlackConfig) -> TickerResult<Self> {
        if token.trim().is_empty() {
            return Err(TickerError::Config(
                "Slack token is required. Get your token from https://api.slack.com/apps".into(),
            ));
        }
        Ok(Self {
            token,
            endpoint: SLACK_POST_MESSAGE_URL.to_string(),
            max_block_size: config.max_block_size,
            timeout: Duration::from_secs(SLACK_TIMEOUT_SECS),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl NotificationSink for SlackNotifier {
    fn send(&self, channel: &SlackChannel, message: &SlackMessage) -> TickerResult<bool> {
        let payload = build_payload(channel, message, self.max_block_size);
        tracing::info!(
            channel = channel.as_str(),
            blocks = payload["blocks"].as_array().map(|b| b.len()).unwrap_or(0),
            "Posting to Slack"
        );

        let mut response = ureq::post(self.endpoint.as_str())
            .header("Authorization", &format!("Bearer {}", self.token))
            .header("content-type", "application/json; charset=utf-8")
            .config()
            .timeout_global(Some(self.timeout))
            .build()
            .send_json(&payload)
            .map_err(|e| TickerError::Delivery(format!("Failed to send Slack message: {}", e)))?;

        let parsed: PostMessageResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| TickerError::Delivery(format!("Invalid Slack response: {}", e)))?;

        match (parsed.ok, parsed.error) {
            (true, _) => Ok(true),
            (false, Some(code)) => Err(classify_api_error(&code, channel)),
            (false, None) => Ok(false),
        }
    }
}
