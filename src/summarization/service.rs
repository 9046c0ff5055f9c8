//! Per-commit, per-range and per-branch summaries.

use std::path::Path;

use crate::config::SummarizationConfig;
use crate::constants::TRUNCATION_MARKER;
use crate::git::{CommitSnapshot, DiffPayload, FileFilter, HistoryProvider};
use crate::llm::{Conversation, ModelClient};
use crate::TickerResult;

use super::agent_loop::ToolExchange;
use super::classifier::{classify, SizeThreshold, Strategy};
use super::direct::summarize_direct;
use super::prompts::{self, PromptSet};

#[derive(Debug, Clone, Copy)]
pub struct SummarizerSettings {
    pub threshold: SizeThreshold,
    pub max_tool_iterations: u32,
    pub filter_generated_files: bool,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self::from_config(&SummarizationConfig::default())
    }
}

impl SummarizerSettings {
    pub fn from_config(config: &SummarizationConfig) -> Self {
        Self {
            threshold: SizeThreshold::new(config.max_diff_size).unwrap_or_default(),
            max_tool_iterations: config.max_tool_iterations,
            filter_generated_files: config.filter_generated_files,
        }
    }
}

pub struct Summarizer<'a> {
    history: &'a dyn HistoryProvider,
    client: &'a dyn ModelClient,
    prompts: PromptSet,
    settings: SummarizerSettings,
    filter: FileFilter,
}

impl<'a> Summarizer<'a> {
    pub fn new(
        history: &'a dyn HistoryProvider,
        client: &'a dyn ModelClient,
        prompts: PromptSet,
        settings: SummarizerSettings,
    ) -> Self {
        Self {
            history,
            client,
            prompts,
            settings,
            filter: FileFilter::new(),
        }
    }

    pub fn history(&self) -> &'a dyn HistoryProvider {
        self.history
    }

    pub fn settings(&self) -> &SummarizerSettings {
        &self.settings
    }

    /// Summarize one commit, choosing the direct or tool-exchange path from
    /// the size of its full diff.
    pub fn summarize_commit(&self, repo: &Path, hash: &str) -> TickerResult<String> {
        let mut commit = self.history.list_change_records(repo, hash)?;
        if self.settings.filter_generated_files {
            commit.changes = self.filter.retain_source(std::mem::take(&mut commit.changes));
        }

        let diff = self.history.get_diff(repo, hash)?;
        let strategy = classify(diff.char_len(), self.settings.threshold);
        tracing::info!(
            commit = commit.short_hash(),
            diff_chars = diff.char_len(),
            files = commit.changes.len(),
            strategy = ?strategy,
            "Summarizing commit"
        );

        match strategy {
            Strategy::Direct => summarize_direct(
                self.client,
                self.prompts.commit_system(),
                prompts::commit_input(&commit, &diff),
                "commit summary",
            ),
            Strategy::ToolExchange => self.summarize_with_tools(repo, &commit),
        }
    }

    fn summarize_with_tools(&self, repo: &Path, commit: &CommitSnapshot) -> TickerResult<String> {
        let conversation = Conversation::with_human(
            self.prompts.commit_system_with_tools(),
            prompts::commit_input_files_only(commit),
        );
        ToolExchange::new(self.client, self.settings.max_tool_iterations).run(conversation, |path| {
            self.history.get_file_diff(repo, &commit.hash, path)
        })
    }

    /// Summarize the cumulative diff `from..to`. Oversized diffs are cut to
    /// the threshold and marked.
    pub fn summarize_range(&self, repo: &Path, from: &str, to: &str) -> TickerResult<String> {
        let diff = self.history.get_range_diff(repo, from, to)?;
        let diff = truncate_payload(diff, self.settings.threshold);
        tracing::info!(range = %diff.identifier, diff_chars = diff.char_len(), "Summarizing range");
        summarize_direct(
            self.client,
            self.prompts.range_system(),
            prompts::range_input(from, to, &diff),
            "diff summary",
        )
    }

    /// Summarize what `head` adds on top of `base`.
    pub fn summarize_branches(&self, repo: &Path, base: &str, head: &str) -> TickerResult<String> {
        let merge_base = self.history.get_merge_base(repo, base, head)?;
        tracing::info!(base, head, merge_base = %merge_base, "Summarizing branch");
        self.summarize_range(repo, &merge_base, head)
    }
}

fn truncate_payload(diff: DiffPayload, threshold: SizeThreshold) -> DiffPayload {
    if classify(diff.char_len(), threshold) == Strategy::Direct {
        return diff;
    }
    tracing::warn!(
        range = %diff.identifier,
        diff_chars = diff.char_len(),
        kept = threshold.get(),
        "Range diff truncated"
    );
    let mut text: String = diff.text.chars().take(threshold.get()).collect();
    text.push_str(TRUNCATION_MARKER);
    DiffPayload::new(diff.identifier, text)
}
