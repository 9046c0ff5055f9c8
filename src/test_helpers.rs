//! Shared test utilities: builders, an in-memory history provider and a
//! scripted model client.
//!
//! Available only under `#[cfg(test)]`.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

use chrono::DateTime;
use serde_json::json;

use crate::git::{ChangeKind, ChangeRecord, CommitSnapshot, DiffPayload, HistoryProvider};
use crate::llm::{AgentTurn, Conversation, ModelClient, ToolDeclaration, ToolRequest, Turn};
use crate::{TickerError, TickerResult};

// ============================================================================
// CommitBuilder
// ============================================================================

pub struct CommitBuilder {
    commit: CommitSnapshot,
}

impl CommitBuilder {
    pub fn new(hash: &str) -> Self {
        Self {
            commit: CommitSnapshot {
                hash: hash.to_string(),
                author: "Test Author".to_string(),
                date: DateTime::parse_from_rfc3339("2024-01-15T10:30:00+00:00").unwrap(),
                message: "Test commit".to_string(),
                changes: vec![],
            },
        }
    }

    pub fn message(mut self, m: &str) -> Self {
        self.commit.message = m.to_string();
        self
    }

    pub fn author(mut self, a: &str) -> Self {
        self.commit.author = a.to_string();
        self
    }

    /// Modified file.
    pub fn file(self, path: &str) -> Self {
        self.change(path, ChangeKind::Modified)
    }

    pub fn change(mut self, path: &str, kind: ChangeKind) -> Self {
        self.commit.changes.push(ChangeRecord::new(path, kind, None).unwrap());
        self
    }

    pub fn renamed(mut self, from: &str, to: &str) -> Self {
        self.commit
            .changes
            .push(ChangeRecord::new(to, ChangeKind::Renamed, Some(from.to_string())).unwrap());
        self
    }

    pub fn build(self) -> CommitSnapshot {
        self.commit
    }
}

// ============================================================================
// StubHistory
// ============================================================================

/// In-memory [`HistoryProvider`]. Anything not registered is a history error.
#[derive(Default)]
pub struct StubHistory {
    commits: HashMap<String, CommitSnapshot>,
    ranges: HashMap<(String, String), Vec<String>>,
    diffs: HashMap<String, String>,
    file_diffs: HashMap<(String, String), String>,
    range_diffs: HashMap<(String, String), String>,
    merge_bases: HashMap<(String, String), String>,
    empty_merges: HashSet<String>,
    merge_check_fails: bool,
}

impl StubHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(mut self, commit: CommitSnapshot) -> Self {
        self.commits.insert(commit.hash.clone(), commit);
        self
    }

    /// Register `commits` as the ordered content of `from..to`.
    pub fn range(mut self, from: &str, to: &str, commits: Vec<CommitSnapshot>) -> Self {
        let hashes = commits.iter().map(|c| c.hash.clone()).collect();
        self.ranges.insert((from.to_string(), to.to_string()), hashes);
        for c in commits {
            self.commits.insert(c.hash.clone(), c);
        }
        self
    }

    pub fn diff(mut self, hash: &str, text: impl Into<String>) -> Self {
        self.diffs.insert(hash.to_string(), text.into());
        self
    }

    pub fn file_diff(mut self, hash: &str, path: &str, text: &str) -> Self {
        self.file_diffs
            .insert((hash.to_string(), path.to_string()), text.to_string());
        self
    }

    pub fn range_diff(mut self, from: &str, to: &str, text: impl Into<String>) -> Self {
        self.range_diffs
            .insert((from.to_string(), to.to_string()), text.into());
        self
    }

    pub fn merge_base(mut self, a: &str, b: &str, base: &str) -> Self {
        self.merge_bases
            .insert((a.to_string(), b.to_string()), base.to_string());
        self
    }

    pub fn empty_merge(mut self, hash: &str) -> Self {
        self.empty_merges.insert(hash.to_string());
        self
    }

    pub fn failing_merge_check(mut self) -> Self {
        self.merge_check_fails = true;
        self
    }

    fn missing(what: &str) -> TickerError {
        TickerError::History(format!("unknown {}", what))
    }
}

impl HistoryProvider for StubHistory {
    fn list_commits(&self, _repo: &Path, from: &str, to: &str) -> TickerResult<Vec<CommitSnapshot>> {
        let hashes = self
            .ranges
            .get(&(from.to_string(), to.to_string()))
            .ok_or_else(|| Self::missing(&format!("range {}..{}", from, to)))?;
        Ok(hashes
            .iter()
            .filter_map(|h| self.commits.get(h))
            .map(|c| CommitSnapshot {
                changes: vec![],
                ..c.clone()
            })
            .collect())
    }

    fn list_change_records(&self, _repo: &Path, hash: &str) -> TickerResult<CommitSnapshot> {
        self.commits
            .get(hash)
            .cloned()
            .ok_or_else(|| Self::missing(&format!("commit {}", hash)))
    }

    fn get_diff(&self, _repo: &Path, hash: &str) -> TickerResult<DiffPayload> {
        self.diffs
            .get(hash)
            .map(|t| DiffPayload::new(hash, t.clone()))
            .ok_or_else(|| Self::missing(&format!("diff {}", hash)))
    }

    fn get_range_diff(&self, _repo: &Path, from: &str, to: &str) -> TickerResult<DiffPayload> {
        self.range_diffs
            .get(&(from.to_string(), to.to_string()))
            .map(|t| DiffPayload::range(from, to, t.clone()))
            .ok_or_else(|| Self::missing(&format!("range diff {}..{}", from, to)))
    }

    fn get_file_diff(&self, _repo: &Path, hash: &str, file_path: &str) -> TickerResult<String> {
        self.file_diffs
            .get(&(hash.to_string(), file_path.to_string()))
            .cloned()
            .ok_or_else(|| Self::missing(&format!("file {}", file_path)))
    }

    fn get_merge_base(&self, _repo: &Path, a: &str, b: &str) -> TickerResult<String> {
        self.merge_bases
            .get(&(a.to_string(), b.to_string()))
            .cloned()
            .ok_or_else(|| Self::missing(&format!("merge base {} {}", a, b)))
    }

    fn is_merge_with_no_changes(&self, _repo: &Path, hash: &str) -> TickerResult<bool> {
        if self.merge_check_fails {
            return Err(TickerError::History("rev-list failed".into()));
        }
        Ok(self.empty_merges.contains(hash))
    }
}

// ============================================================================
// ScriptedModel
// ============================================================================

/// Agent turn requesting one tool call with a `file_path` argument.
pub fn tool_call(id: &str, name: &str, path: &str) -> AgentTurn {
    AgentTurn {
        content: Default::default(),
        tool_requests: vec![ToolRequest {
            id: id.to_string(),
            name: name.to_string(),
            arguments: json!({ "file_path": path }),
        }],
    }
}

/// [`ModelClient`] that replays queued replies and counts calls.
pub struct ScriptedModel {
    script: RefCell<VecDeque<TickerResult<AgentTurn>>>,
    repeat: Option<AgentTurn>,
    fail_with: Option<String>,
    panic_on_invoke: bool,
    tools: bool,
    invoke_calls: Cell<u32>,
    tool_calls: Cell<u32>,
    last_conversation: RefCell<Option<Conversation>>,
}

impl ScriptedModel {
    pub fn new(turns: Vec<AgentTurn>) -> Self {
        Self::from_results(turns.into_iter().map(Ok).collect())
    }

    pub fn from_results(results: Vec<TickerResult<AgentTurn>>) -> Self {
        Self {
            script: RefCell::new(results.into()),
            repeat: None,
            fail_with: None,
            panic_on_invoke: false,
            tools: true,
            invoke_calls: Cell::new(0),
            tool_calls: Cell::new(0),
            last_conversation: RefCell::new(None),
        }
    }

    /// Always answers with `turn`.
    pub fn repeating(turn: AgentTurn) -> Self {
        Self {
            repeat: Some(turn),
            ..Self::new(vec![])
        }
    }

    /// Every call fails with a provider error carrying `msg`.
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new(vec![])
        }
    }

    /// Plain `invoke` panics; only the tool path may be taken.
    pub fn panic_on_invoke(mut self) -> Self {
        self.panic_on_invoke = true;
        self
    }

    pub fn without_tools(mut self) -> Self {
        self.tools = false;
        self
    }

    pub fn invoke_calls(&self) -> u32 {
        self.invoke_calls.get()
    }

    pub fn tool_calls(&self) -> u32 {
        self.tool_calls.get()
    }

    pub fn last_conversation(&self) -> Option<Conversation> {
        self.last_conversation.borrow().clone()
    }

    /// First human message of the last conversation seen.
    pub fn last_human(&self) -> Option<String> {
        self.last_conversation.borrow().as_ref().and_then(|c| {
            c.turns().iter().find_map(|t| match t {
                Turn::Human(text) => Some(text.clone()),
                _ => None,
            })
        })
    }

    fn next(&self, conversation: &Conversation) -> TickerResult<AgentTurn> {
        *self.last_conversation.borrow_mut() = Some(conversation.clone());
        if let Some(msg) = &self.fail_with {
            return Err(TickerError::Provider(msg.clone()));
        }
        if let Some(next) = self.script.borrow_mut().pop_front() {
            return next;
        }
        self.repeat
            .clone()
            .ok_or_else(|| TickerError::Provider("script exhausted".into()))
    }
}

impl ModelClient for ScriptedModel {
    fn invoke(&self, conversation: &Conversation) -> TickerResult<AgentTurn> {
        if self.panic_on_invoke {
            panic!("plain invoke not expected");
        }
        self.invoke_calls.set(self.invoke_calls.get() + 1);
        self.next(conversation)
    }

    fn invoke_with_tools(
        &self,
        conversation: &Conversation,
        _tools: &[ToolDeclaration],
    ) -> TickerResult<AgentTurn> {
        self.tool_calls.set(self.tool_calls.get() + 1);
        self.next(conversation)
    }

    fn supports_tools(&self) -> bool {
        self.tools
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
