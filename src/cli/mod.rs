pub mod batch;
pub mod config;
pub mod notify;
pub mod summarize;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use git_ticker::config::{Credentials, TickerConfig};
use git_ticker::git::GitCli;
use git_ticker::llm::{self, ModelClient};
use git_ticker::notify::{NotificationService, SlackNotifier};
use git_ticker::summarization::{PromptSet, SummarizerSettings};

/// Options shared by every subcommand.
pub struct Globals {
    pub config_path: Option<PathBuf>,
    pub max_diff_size: Option<usize>,
}

/// Where a single summary goes.
pub struct DeliveryOptions {
    pub output: Option<PathBuf>,
    pub slack_channel: Option<String>,
    pub slack_title: Option<String>,
}

/// Configuration and credentials resolved once per invocation.
pub struct Runtime {
    pub config: TickerConfig,
    pub credentials: Credentials,
}

impl Runtime {
    pub fn load(globals: &Globals) -> Result<Self> {
        let mut config = TickerConfig::load(globals.config_path.as_deref())
            .context("Failed to load configuration")?;
        config.apply_env(|k| std::env::var(k).ok());
        if let Some(size) = globals.max_diff_size {
            config.summarization.max_diff_size = size;
            config.validate();
        }
        Ok(Self {
            config,
            credentials: Credentials::from_env(),
        })
    }

    pub fn model_client(&self) -> Result<Box<dyn ModelClient>> {
        llm::create_client(&self.config.llm, &self.credentials)
            .context("Failed to configure the language model")
    }

    pub fn prompts(&self) -> Result<PromptSet> {
        PromptSet::load(self.config.summarization.template_path.as_deref())
            .context("Failed to load summary template")
    }

    pub fn settings(&self) -> SummarizerSettings {
        SummarizerSettings::from_config(&self.config.summarization)
    }

    pub fn slack_notifier(&self) -> Result<SlackNotifier> {
        let token = self
            .credentials
            .slack_bot_token
            .clone()
            .context("SLACK_BOT_TOKEN environment variable is required to post to Slack")?;
        Ok(SlackNotifier::new(token, &self.config.slack)?)
    }

    /// Post `summary` to `channel`.
    pub fn post_to_slack(&self, summary: &str, channel: &str, title: Option<&str>) -> Result<()> {
        let notifier = self.slack_notifier()?;
        let service = NotificationService::new(&notifier, self.config.slack.title.clone());
        service
            .send_summary(summary, channel, title)
            .with_context(|| format!("Failed to post summary to #{}", channel))?;
        eprintln!("Summary posted to #{}", channel);
        Ok(())
    }
}

/// Git adapter for `repo`, after checking it is a work tree.
pub fn open_repository(repo: &Path) -> Result<GitCli> {
    let git = GitCli::new();
    if !git.is_available() {
        bail!("git executable not found on PATH");
    }
    if !git.is_repository(repo) {
        bail!("Not a git repository: {}", repo.display());
    }
    Ok(git)
}

/// Print to stdout or write to `output`, then post to Slack if asked.
pub fn deliver(runtime: &Runtime, summary: &str, delivery: &DeliveryOptions) -> Result<()> {
    match &delivery.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, summary)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Summary written to {}", path.display());
        }
        None => println!("{}", summary),
    }
    if let Some(channel) = &delivery.slack_channel {
        runtime.post_to_slack(summary, channel, delivery.slack_title.as_deref())?;
    }
    Ok(())
}
