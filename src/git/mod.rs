//! History provider: commits, change records and diff text.
//!
//! The orchestrator only talks to [`HistoryProvider`]; [`GitCli`] is the
//! production implementation shelling out to `git`.

pub mod cli_provider;
pub mod file_filter;

pub use cli_provider::GitCli;
pub use file_filter::FileFilter;

use std::fmt;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::{TickerError, TickerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
}

impl ChangeKind {
    /// Map a `--name-status` letter. Unknown codes (T, U, X) count as modified.
    pub fn from_status(status: &str) -> Self {
        match status.chars().next() {
            Some('A') => Self::Added,
            Some('M') => Self::Modified,
            Some('D') => Self::Deleted,
            Some('R') => Self::Renamed,
            Some('C') => Self::Copied,
            _ => Self::Modified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
            Self::Copied => "copied",
        }
    }

    pub fn has_prior_path(&self) -> bool {
        matches!(self, Self::Renamed | Self::Copied)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub path: String,
    pub kind: ChangeKind,
    prior_path: Option<String>,
}

impl ChangeRecord {
    /// Build a record; a prior path is required for renames/copies and
    /// rejected otherwise.
    pub fn new(path: impl Into<String>, kind: ChangeKind, prior_path: Option<String>) -> TickerResult<Self> {
        let path = path.into();
        match (kind.has_prior_path(), prior_path.is_some()) {
            (true, false) => Err(TickerError::InvalidInput(format!(
                "{} change for {} needs a prior path",
                kind, path
            ))),
            (false, true) => Err(TickerError::InvalidInput(format!(
                "{} change for {} cannot carry a prior path",
                kind, path
            ))),
            _ => Ok(Self { path, kind, prior_path }),
        }
    }

    pub fn prior_path(&self) -> Option<&str> {
        self.prior_path.as_deref()
    }
}

/// A commit and, when requested, its change records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSnapshot {
    pub hash: String,
    pub author: String,
    pub date: DateTime<FixedOffset>,
    pub message: String,
    /// Source order from git; empty for `list_commits` results.
    pub changes: Vec<ChangeRecord>,
}

impl CommitSnapshot {
    pub fn short_hash(&self) -> &str {
        short_hash(&self.hash)
    }
}

/// First 8 chars of a hash (or the whole thing if shorter).
pub fn short_hash(hash: &str) -> &str {
    let end = hash
        .char_indices()
        .nth(crate::constants::SHORT_HASH_LEN)
        .map(|(i, _)| i)
        .unwrap_or(hash.len());
    &hash[..end]
}

/// Raw diff text for a commit (`identifier` = hash) or a range (`A..B`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffPayload {
    pub identifier: String,
    pub text: String,
}

impl DiffPayload {
    pub fn new(identifier: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            text: text.into(),
        }
    }

    pub fn range(from: &str, to: &str, text: impl Into<String>) -> Self {
        Self::new(format!("{}..{}", from, to), text)
    }

    /// Length in characters, the unit the size threshold is expressed in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Source-control queries needed by the summarizer and batch runner.
pub trait HistoryProvider {
    /// Commits in `from..to`, oldest first, without change records.
    fn list_commits(&self, repo: &Path, from: &str, to: &str) -> TickerResult<Vec<CommitSnapshot>>;

    /// One commit with its change records populated.
    fn list_change_records(&self, repo: &Path, hash: &str) -> TickerResult<CommitSnapshot>;

    fn get_diff(&self, repo: &Path, hash: &str) -> TickerResult<DiffPayload>;

    fn get_range_diff(&self, repo: &Path, from: &str, to: &str) -> TickerResult<DiffPayload>;

    fn get_file_diff(&self, repo: &Path, hash: &str, file_path: &str) -> TickerResult<String>;

    fn get_merge_base(&self, repo: &Path, a: &str, b: &str) -> TickerResult<String>;

    /// True for merge commits that introduce no change records.
    fn is_merge_with_no_changes(&self, repo: &Path, hash: &str) -> TickerResult<bool>;
}
