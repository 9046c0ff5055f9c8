//! Sequential summarization of a commit range.
//!
//! Per-commit failures become error records; only sink I/O and the
//! initial commit listing abort the batch.

use std::path::Path;

use crate::git::{short_hash, CommitSnapshot, HistoryProvider};
use crate::TickerResult;

use super::service::Summarizer;
use super::sinks::{BatchHeader, SummarySink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Summary(String),
    /// Error record text, already formatted for output.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    /// 1-based position among kept commits.
    pub sequence: usize,
    pub commit_hash: String,
    /// Commit subject, when known.
    pub message: Option<String>,
    pub outcome: SummaryOutcome,
}

impl SummaryResult {
    pub fn text(&self) -> &str {
        match &self.outcome {
            SummaryOutcome::Summary(s) | SummaryOutcome::Failed(s) => s,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, SummaryOutcome::Failed(_))
    }

    pub fn short_hash(&self) -> &str {
        short_hash(&self.commit_hash)
    }

    /// `NNNN_hash8.md`
    pub fn file_name(&self) -> String {
        format!("{:04}_{}.md", self.sequence, self.short_hash())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Drop merge commits that introduce no changes before numbering.
    pub skip_empty_merges: bool,
}

pub struct BatchRunner<'s, 'a> {
    summarizer: &'s Summarizer<'a>,
    history: &'a dyn HistoryProvider,
    options: BatchOptions,
}

impl<'s, 'a> BatchRunner<'s, 'a> {
    pub fn new(summarizer: &'s Summarizer<'a>, options: BatchOptions) -> Self {
        Self {
            summarizer,
            history: summarizer.history(),
            options,
        }
    }

    /// Summarize every commit in `from..to`, oldest first.
    pub fn run_range(
        &self,
        repo: &Path,
        from: &str,
        to: &str,
        sink: &mut dyn SummarySink,
    ) -> TickerResult<Vec<SummaryResult>> {
        let commits = self.history.list_commits(repo, from, to)?;
        tracing::info!(from, to, commits = commits.len(), "Commit range listed");
        let header = BatchHeader {
            repository: repo.to_path_buf(),
            from: from.to_string(),
            to: to.to_string(),
            commit_count: commits.len(),
        };
        self.summarize_sequence(repo, &commits, header, sink)
    }

    /// Summarize `commits` in the given order. `header.commit_count` is
    /// recomputed after filtering.
    pub fn summarize_sequence(
        &self,
        repo: &Path,
        commits: &[CommitSnapshot],
        mut header: BatchHeader,
        sink: &mut dyn SummarySink,
    ) -> TickerResult<Vec<SummaryResult>> {
        let kept = self.retain_commits(repo, commits);
        if kept.is_empty() {
            tracing::info!("No commits to summarize");
            return Ok(Vec::new());
        }

        header.commit_count = kept.len();
        sink.begin(&header)?;

        let total = kept.len();
        let mut results = Vec::with_capacity(total);
        for (index, commit) in kept.into_iter().enumerate() {
            let sequence = index + 1;
            tracing::info!(sequence, total, commit = commit.short_hash(), "Processing commit");
            let result = self.summarize_one(repo, sequence, commit);
            sink.record(&result)?;
            results.push(result);
        }
        sink.finish()?;

        let failed = results.iter().filter(|r| r.is_failure()).count();
        tracing::info!(total, failed, "Batch complete");
        Ok(results)
    }

    fn retain_commits<'c>(&self, repo: &Path, commits: &'c [CommitSnapshot]) -> Vec<&'c CommitSnapshot> {
        if !self.options.skip_empty_merges {
            return commits.iter().collect();
        }
        let kept: Vec<&CommitSnapshot> = commits
            .iter()
            .filter(|c| match self.history.is_merge_with_no_changes(repo, &c.hash) {
                Ok(true) => {
                    tracing::debug!(commit = c.short_hash(), "Skipping empty merge commit");
                    false
                }
                Ok(false) => true,
                Err(e) => {
                    tracing::warn!(commit = c.short_hash(), error = %e, "Merge check failed, keeping commit");
                    true
                }
            })
            .collect();
        if kept.len() != commits.len() {
            tracing::info!(skipped = commits.len() - kept.len(), "Empty merge commits filtered");
        }
        kept
    }

    fn summarize_one(&self, repo: &Path, sequence: usize, commit: &CommitSnapshot) -> SummaryResult {
        let outcome = match self.summarizer.summarize_commit(repo, &commit.hash) {
            Ok(summary) => SummaryOutcome::Summary(summary),
            Err(e) => {
                tracing::error!(commit = commit.short_hash(), error = %e, "Commit summary failed");
                SummaryOutcome::Failed(format!(
                    "**Error**: Failed to summarize commit {}: {}",
                    commit.hash, e
                ))
            }
        };
        SummaryResult {
            sequence,
            commit_hash: commit.hash.clone(),
            message: Some(commit.message.clone()).filter(|m| !m.is_empty()),
            outcome,
        }
    }
}
