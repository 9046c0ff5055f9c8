//! `git` subprocess implementation of [`HistoryProvider`].
//!
//! Every query is one blocking `git` invocation run inside the repository.
//! Merge commits are diffed against their first parent so that a no-op merge
//! shows up with zero change records.

use std::path::Path;
use std::process::{Command, Stdio};

use super::{ChangeKind, ChangeRecord, CommitSnapshot, DiffPayload, HistoryProvider};
use crate::time_utils;
use crate::{TickerError, TickerResult};

/// Unit separator between `git log` fields; never appears in names or subjects.
const FIELD_SEP: char = '\u{1f}';
const LOG_FORMAT: &str = "--format=%H%x1f%an%x1f%aI%x1f%s";

#[derive(Debug, Clone)]
pub struct GitCli {
    binary: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable instead of the one on PATH.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    /// Check if the git binary is available.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn command(&self, repo: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.current_dir(repo)
            .args(["-c", "core.quotepath=off"])
            .args(args)
            .stdin(Stdio::null());
        cmd
    }

    /// Run git and return stdout; non-zero exit is an error carrying stderr.
    fn run(&self, repo: &Path, args: &[&str]) -> TickerResult<String> {
        tracing::debug!(repo = %repo.display(), args = ?args, "git");
        let output = self
            .command(repo, args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                TickerError::History(format!(
                    "Failed to spawn {}: {}. Is `git` installed?",
                    self.binary, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TickerError::History(format!(
                "git {} failed ({}): {}",
                args.first().copied().unwrap_or(""),
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run git for its exit code only.
    fn succeeds(&self, repo: &Path, args: &[&str]) -> bool {
        self.command(repo, args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn parents(&self, repo: &Path, hash: &str) -> TickerResult<Vec<String>> {
        let out = self.run(repo, &["rev-list", "--parents", "-n", "1", hash])?;
        Ok(out.split_whitespace().skip(1).map(str::to_string).collect())
    }

    fn commit_header(&self, repo: &Path, hash: &str) -> TickerResult<CommitSnapshot> {
        let out = self.run(repo, &["log", "-1", LOG_FORMAT, hash])?;
        let line = out.trim_end_matches('\n');
        if line.is_empty() {
            return Err(TickerError::History(format!("Commit {} not found", hash)));
        }
        parse_log_line(line)
    }

    // ── Validation helpers (used before a batch run) ──

    pub fn is_repository(&self, repo: &Path) -> bool {
        repo.is_dir()
            && self
                .run(repo, &["rev-parse", "--is-inside-work-tree"])
                .map(|s| s.trim() == "true")
                .unwrap_or(false)
    }

    pub fn branch_exists(&self, repo: &Path, branch: &str) -> bool {
        let reference = format!("refs/heads/{}", branch);
        self.succeeds(repo, &["rev-parse", "--verify", "--quiet", &reference])
    }

    pub fn commit_exists(&self, repo: &Path, hash: &str) -> bool {
        let object = format!("{}^{{commit}}", hash);
        self.succeeds(repo, &["cat-file", "-e", &object])
    }

    /// Full hash of the commit `reference` points to (e.g. a branch tip).
    pub fn resolve_ref(&self, repo: &Path, reference: &str) -> TickerResult<String> {
        let object = format!("{}^{{commit}}", reference);
        let out = self.run(repo, &["rev-parse", "--verify", &object])?;
        Ok(out.trim().to_string())
    }

    /// True when `ancestor` is reachable from `descendant`.
    pub fn is_ancestor(&self, repo: &Path, ancestor: &str, descendant: &str) -> bool {
        self.succeeds(repo, &["merge-base", "--is-ancestor", ancestor, descendant])
    }
}

impl HistoryProvider for GitCli {
    fn list_commits(&self, repo: &Path, from: &str, to: &str) -> TickerResult<Vec<CommitSnapshot>> {
        let range = format!("{}..{}", from, to);
        let out = self.run(repo, &["log", "--reverse", LOG_FORMAT, &range])?;
        out.lines()
            .filter(|l| !l.is_empty())
            .map(parse_log_line)
            .collect()
    }

    fn list_change_records(&self, repo: &Path, hash: &str) -> TickerResult<CommitSnapshot> {
        let mut snapshot = self.commit_header(repo, hash)?;
        let parents = self.parents(repo, hash)?;
        let out = match parents.first() {
            Some(first) => self.run(repo, &["diff", "--name-status", "-M", first, hash])?,
            None => self.run(
                repo,
                &["diff-tree", "--no-commit-id", "--name-status", "-r", "-M", "--root", hash],
            )?,
        };
        snapshot.changes = parse_name_status(&out);
        Ok(snapshot)
    }

    fn get_diff(&self, repo: &Path, hash: &str) -> TickerResult<DiffPayload> {
        let parents = self.parents(repo, hash)?;
        let text = if parents.len() > 1 {
            self.run(repo, &["diff", &parents[0], hash])?
        } else {
            self.run(repo, &["show", hash])?
        };
        Ok(DiffPayload::new(hash, text))
    }

    fn get_range_diff(&self, repo: &Path, from: &str, to: &str) -> TickerResult<DiffPayload> {
        let text = self.run(repo, &["diff", from, to])?;
        Ok(DiffPayload::range(from, to, text))
    }

    fn get_file_diff(&self, repo: &Path, hash: &str, file_path: &str) -> TickerResult<String> {
        let parents = self.parents(repo, hash)?;
        let text = if parents.len() > 1 {
            self.run(repo, &["diff", &parents[0], hash, "--", file_path])?
        } else {
            self.run(repo, &["show", "--format=", hash, "--", file_path])?
        };
        if text.trim().is_empty() {
            return Err(TickerError::History(format!(
                "No changes to {} in commit {}",
                file_path,
                super::short_hash(hash)
            )));
        }
        Ok(text)
    }

    fn get_merge_base(&self, repo: &Path, a: &str, b: &str) -> TickerResult<String> {
        let out = self.run(repo, &["merge-base", a, b])?;
        let base = out.trim();
        if base.is_empty() {
            return Err(TickerError::History(format!("No merge base between {} and {}", a, b)));
        }
        Ok(base.to_string())
    }

    fn is_merge_with_no_changes(&self, repo: &Path, hash: &str) -> TickerResult<bool> {
        if self.parents(repo, hash)?.len() < 2 {
            return Ok(false);
        }
        Ok(self.list_change_records(repo, hash)?.changes.is_empty())
    }
}

fn parse_log_line(line: &str) -> TickerResult<CommitSnapshot> {
    let parts: Vec<&str> = line.splitn(4, FIELD_SEP).collect();
    if parts.len() != 4 || parts[0].is_empty() {
        return Err(TickerError::History(format!("Invalid commit format: {}", line)));
    }
    Ok(CommitSnapshot {
        hash: parts[0].to_string(),
        author: parts[1].to_string(),
        date: time_utils::parse_git_date(parts[2])?,
        message: parts[3].to_string(),
        changes: Vec::new(),
    })
}

/// Parse `--name-status` output. Renames and copies carry `old\tnew`.
fn parse_name_status(out: &str) -> Vec<ChangeRecord> {
    let mut records = Vec::new();
    for line in out.lines().filter(|l| !l.is_empty()) {
        let parts: Vec<&str> = line.split('\t').collect();
        let kind = ChangeKind::from_status(parts[0]);
        let record = match parts.as_slice() {
            [_, path] => ChangeRecord::new(*path, kind, None),
            [_, old, new, ..] if kind.has_prior_path() => {
                ChangeRecord::new(*new, kind, Some(old.to_string()))
            }
            [_, _, new, ..] => ChangeRecord::new(*new, kind, None),
            _ => {
                tracing::warn!(line = %line, "Unparseable name-status line skipped");
                continue;
            }
        };
        match record {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(line = %line, error = %e, "Malformed name-status line skipped"),
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_line_keeps_separators_in_subject() {
        let line = "abc123\u{1f}Ada Lovelace\u{1f}2024-01-02T03:04:05+00:00\u{1f}fix: a|b|c";
        let c = parse_log_line(line).unwrap();
        assert_eq!(c.hash, "abc123");
        assert_eq!(c.author, "Ada Lovelace");
        assert_eq!(c.message, "fix: a|b|c");
        assert!(c.changes.is_empty());
    }

    #[test]
    fn test_parse_log_line_rejects_short_lines() {
        assert!(parse_log_line("abc123\u{1f}someone").is_err());
    }

    #[test]
    fn test_parse_name_status() {
        let out = "A\tsrc/new.rs\nM\tsrc/lib.rs\nD\told.txt\nR087\tsrc/a.rs\tsrc/b.rs\nC100\tx.rs\ty.rs\n";
        let records = parse_name_status(out);
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].kind, ChangeKind::Added);
        assert_eq!(records[3].path, "src/b.rs");
        assert_eq!(records[3].prior_path(), Some("src/a.rs"));
        assert_eq!(records[4].kind, ChangeKind::Copied);
        assert_eq!(records[2].prior_path(), None);
    }

    #[test]
    fn test_parse_name_status_skips_rename_without_source() {
        let out = "M\tsrc/lib.rs\nR100\tsrc/only.rs\nA\tsrc/new.rs\n";
        let records = parse_name_status(out);
        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["src/lib.rs", "src/new.rs"]);
    }
}
