//! Runtime configuration: LLM provider, summarization policy, Slack delivery.
//!
//! Resolved once by the CLI from `{config_dir}/git-ticker/config.json` plus
//! environment overrides, then passed down as plain values. Secrets are never
//! read from or written to the config file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::{TickerError, TickerResult};

// ============================================================================
// PATHS
// ============================================================================

/// Central config directory.
/// Linux: ~/.config/git-ticker/
/// macOS: ~/Library/Application Support/git-ticker/
/// Windows: %APPDATA%/git-ticker/
pub fn data_dir() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
    });
    base.join("git-ticker")
}

pub fn default_config_path() -> PathBuf {
    data_dir().join("config.json")
}

// ============================================================================
// LLM PROVIDER
// ============================================================================

/// Supported model backends. Aliases are accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
}

impl ProviderKind {
    pub fn parse(s: &str) -> TickerResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" | "gpt" => Ok(Self::OpenAi),
            other => Err(TickerError::Config(format!(
                "Invalid LLM_PROVIDER: {}. Supported values: 'anthropic', 'claude', 'openai', 'gpt'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => constants::DEFAULT_ANTHROPIC_MODEL,
            Self::OpenAi => constants::DEFAULT_OPENAI_MODEL,
        }
    }

    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::Anthropic => constants::ENV_ANTHROPIC_KEY,
            Self::OpenAi => constants::ENV_OPENAI_KEY,
        }
    }

    fn model_env(&self) -> &'static str {
        match self {
            Self::Anthropic => constants::ENV_ANTHROPIC_MODEL,
            Self::OpenAi => constants::ENV_OPENAI_MODEL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "anthropic" | "claude" | "openai" | "gpt"
    pub provider: String,
    /// None = provider default.
    pub model: Option<String>,
    pub temperature: f64,    // default: 0.3
    pub max_tokens: u32,     // default: 4096
    pub timeout_secs: u64,   // default: 120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: constants::DEFAULT_PROVIDER.to_string(),
            model: None,
            temperature: constants::DEFAULT_TEMPERATURE,
            max_tokens: constants::DEFAULT_MAX_TOKENS,
            timeout_secs: constants::DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

impl LlmConfig {
    pub fn provider_kind(&self) -> TickerResult<ProviderKind> {
        ProviderKind::parse(&self.provider)
    }

    pub fn resolved_model(&self, kind: ProviderKind) -> String {
        self.model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| kind.default_model().to_string())
    }
}

// ============================================================================
// SUMMARIZATION
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationConfig {
    /// Diffs longer than this (chars) go through the tool loop.
    pub max_diff_size: usize,            // default: 50000
    pub max_tool_iterations: u32,        // default: 10
    /// Hide lock files, build output and vendored dirs from the model.
    pub filter_generated_files: bool,    // default: true
    /// Custom output-format template. None = built-in.
    pub template_path: Option<PathBuf>,
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            max_diff_size: constants::DEFAULT_MAX_DIFF_SIZE,
            max_tool_iterations: constants::MAX_TOOL_ITERATIONS,
            filter_generated_files: true,
            template_path: None,
        }
    }
}

// ============================================================================
// SLACK
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    pub max_block_size: usize,   // default: 2900
    pub title: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            max_block_size: constants::SLACK_MAX_BLOCK_SIZE,
            title: constants::DEFAULT_SLACK_TITLE.to_string(),
        }
    }
}

// ============================================================================
// ROOT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    pub llm: LlmConfig,
    pub summarization: SummarizationConfig,
    pub slack: SlackConfig,
}

impl TickerConfig {
    /// Load from `explicit` or the default config path.
    ///
    /// A missing default file yields defaults; a missing explicit file is an
    /// error. Invalid JSON is logged and replaced by defaults.
    pub fn load(explicit: Option<&Path>) -> TickerResult<Self> {
        let config_path = match explicit {
            Some(p) => {
                if !p.exists() {
                    return Err(TickerError::Config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => default_config_path(),
        };

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %e,
                    "Invalid config, using defaults"
                );
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        config.validate();
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (usually `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(p) = lookup(constants::ENV_PROVIDER).filter(|v| !v.is_empty()) {
            self.llm.provider = p;
        }
        if let Ok(kind) = self.llm.provider_kind() {
            if let Some(m) = lookup(kind.model_env()).filter(|v| !v.is_empty()) {
                self.llm.model = Some(m);
            }
        }
        if let Some(raw) = lookup(constants::ENV_MAX_DIFF_SIZE) {
            match raw.trim().parse::<usize>() {
                Ok(v) => self.summarization.max_diff_size = v,
                Err(_) => tracing::warn!(
                    var = constants::ENV_MAX_DIFF_SIZE,
                    value = %raw,
                    "Not a number, ignored"
                ),
            }
        }
        self.validate();
    }

    /// Clamp out-of-range values back to defaults.
    pub fn validate(&mut self) {
        if self.summarization.max_diff_size == 0 {
            tracing::warn!(field = "summarization.max_diff_size", "Must be > 0, resetting to default");
            self.summarization.max_diff_size = constants::DEFAULT_MAX_DIFF_SIZE;
        }
        if self.summarization.max_tool_iterations == 0 {
            tracing::warn!(field = "summarization.max_tool_iterations", "Must be > 0, resetting to default");
            self.summarization.max_tool_iterations = constants::MAX_TOOL_ITERATIONS;
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            tracing::warn!(field = "llm.temperature", value = self.llm.temperature, "Out of [0, 2], resetting to default");
            self.llm.temperature = constants::DEFAULT_TEMPERATURE;
        }
        if self.llm.max_tokens == 0 {
            tracing::warn!(field = "llm.max_tokens", "Must be > 0, resetting to default");
            self.llm.max_tokens = constants::DEFAULT_MAX_TOKENS;
        }
        if self.llm.timeout_secs == 0 {
            tracing::warn!(field = "llm.timeout_secs", "Must be > 0, resetting to default");
            self.llm.timeout_secs = constants::DEFAULT_LLM_TIMEOUT_SECS;
        }
        if self.slack.max_block_size == 0 || self.slack.max_block_size > 3000 {
            tracing::warn!(field = "slack.max_block_size", value = self.slack.max_block_size, "Out of (0, 3000], resetting to default");
            self.slack.max_block_size = constants::SLACK_MAX_BLOCK_SIZE;
        }
    }
}

// ============================================================================
// CREDENTIALS (environment only)
// ============================================================================

#[derive(Clone, Default)]
pub struct Credentials {
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub slack_bot_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("anthropic_api_key", &self.anthropic_api_key.as_ref().map(|_| "***"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("slack_bot_token", &self.slack_bot_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Credentials {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        Self {
            anthropic_api_key: get(constants::ENV_ANTHROPIC_KEY),
            openai_api_key: get(constants::ENV_OPENAI_KEY),
            slack_bot_token: get(constants::ENV_SLACK_TOKEN),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// API key for `kind`, or a configuration error naming the variable.
    pub fn api_key(&self, kind: ProviderKind) -> TickerResult<&str> {
        let key = match kind {
            ProviderKind::Anthropic => self.anthropic_api_key.as_deref(),
            ProviderKind::OpenAi => self.openai_api_key.as_deref(),
        };
        key.ok_or_else(|| {
            TickerError::Config(format!(
                "{} environment variable is required for provider '{}'",
                kind.api_key_env(),
                kind.as_str()
            ))
        })
    }
}
