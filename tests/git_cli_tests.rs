// Git adapter integration tests
// Drives the real `git` binary against temporary repositories

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::process::Command;

use git_ticker::git::{ChangeKind, GitCli, HistoryProvider};
use git_ticker::llm::{AgentTurn, Conversation, ModelClient, ToolDeclaration, ToolRequest, Turn};
use git_ticker::summarization::{
    BatchOptions, BatchRunner, CommitFilesSink, PromptSet, SizeThreshold, Summarizer,
    SummarizerSettings,
};
use git_ticker::TickerResult;
use tempfile::TempDir;

struct TempRepo {
    dir: TempDir,
    clock: Cell<u32>,
}

impl TempRepo {
    /// Empty repository on `main`, or None when git is not installed.
    fn new() -> Option<Self> {
        if !GitCli::new().is_available() {
            eprintln!("git not available, skipping");
            return None;
        }
        let repo = Self {
            dir: TempDir::new().unwrap(),
            clock: Cell::new(0),
        };
        repo.git(&["init", "-q"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        Some(repo)
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run git with a fixed identity and a strictly increasing date.
    fn git(&self, args: &[&str]) -> String {
        let tick = self.clock.get() + 1;
        self.clock.set(tick);
        let date = format!("2024-01-01 {:02}:{:02}:00 +0000", 10 + tick / 60, tick % 60);
        let output = Command::new("git")
            .current_dir(self.path())
            .args(["-c", "user.name=Test User", "-c", "user.email=test@example.com"])
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .env("GIT_AUTHOR_DATE", &date)
            .env("GIT_COMMITTER_DATE", &date)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn commit_file(&self, path: &str, content: &str, message: &str) -> String {
        let full = self.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
        self.git(&["add", "--", path]);
        self.git(&["commit", "-q", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }

    /// Merge commit whose tree equals its first parent's.
    fn noop_merge(&self, first: &str, second: &str, message: &str) -> String {
        let tree = format!("{}^{{tree}}", first);
        let merge = self.git(&["commit-tree", &tree, "-p", first, "-p", second, "-m", message]);
        self.git(&["reset", "-q", "--hard", &merge]);
        merge
    }
}

/// Model that answers `summary N` and optionally asks for one file first.
struct CountingModel {
    calls: Cell<u32>,
    fetch_first: Option<String>,
    last: RefCell<Option<Conversation>>,
}

impl CountingModel {
    fn new(fetch_first: Option<&str>) -> Self {
        Self {
            calls: Cell::new(0),
            fetch_first: fetch_first.map(str::to_string),
            last: RefCell::new(None),
        }
    }
}

impl ModelClient for CountingModel {
    fn invoke(&self, conversation: &Conversation) -> TickerResult<AgentTurn> {
        self.calls.set(self.calls.get() + 1);
        *self.last.borrow_mut() = Some(conversation.clone());
        Ok(AgentTurn::text(format!("summary {}", self.calls.get())))
    }

    fn invoke_with_tools(
        &self,
        conversation: &Conversation,
        _tools: &[ToolDeclaration],
    ) -> TickerResult<AgentTurn> {
        *self.last.borrow_mut() = Some(conversation.clone());
        match &self.fetch_first {
            Some(path) if conversation.iterations() == 0 => Ok(AgentTurn {
                content: Default::default(),
                tool_requests: vec![ToolRequest {
                    id: "call_1".into(),
                    name: "get_file_diff".into(),
                    arguments: serde_json::json!({ "file_path": path }),
                }],
            }),
            _ => Ok(AgentTurn::text("tool summary")),
        }
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[test]
fn test_history_queries() {
    let Some(repo) = TempRepo::new() else { return };
    let root = repo.commit_file("README.md", "# demo\n", "Initial commit");
    let a = repo.commit_file("src/a.txt", "hello\n", "Add a");
    let b = repo.noop_merge(&a, &root, "Merge branch 'old'");
    let c = repo.commit_file("src/c.txt", "world\n", "Add c");

    let git = GitCli::new();
    let p = repo.path();
    assert!(git.is_repository(p));
    assert!(git.branch_exists(p, "main"));
    assert!(!git.branch_exists(p, "nope"));
    assert!(git.commit_exists(p, &a));
    assert_eq!(git.resolve_ref(p, "main").unwrap(), c);
    assert!(git.is_ancestor(p, &root, &c));
    assert!(!git.is_ancestor(p, &c, &root));

    let commits = git.list_commits(p, &root, &c).unwrap();
    let messages: Vec<&str> = commits.iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, vec!["Add a", "Merge branch 'old'", "Add c"]);
    assert!(commits.iter().all(|c| c.changes.is_empty()));
    assert_eq!(commits[0].author, "Test User");

    let snapshot = git.list_change_records(p, &a).unwrap();
    assert_eq!(snapshot.changes.len(), 1);
    assert_eq!(snapshot.changes[0].path, "src/a.txt");
    assert_eq!(snapshot.changes[0].kind, ChangeKind::Added);

    assert!(git.is_merge_with_no_changes(p, &b).unwrap());
    assert!(!git.is_merge_with_no_changes(p, &a).unwrap());

    assert!(git.get_file_diff(p, &a, "src/a.txt").unwrap().contains("+hello"));
    assert!(git.get_file_diff(p, &a, "README.md").is_err());
    assert!(git.get_diff(p, &c).unwrap().text.contains("+world"));

    let range = git.get_range_diff(p, &root, &c).unwrap();
    assert_eq!(range.identifier, format!("{}..{}", root, c));
    assert!(range.text.contains("+hello") && range.text.contains("+world"));

    assert_eq!(git.get_merge_base(p, "main", &a).unwrap(), a);
}

#[test]
fn test_root_commit_and_rename() {
    let Some(repo) = TempRepo::new() else { return };
    let root = repo.commit_file("old_name.rs", "fn main() {}\n", "Initial commit");
    repo.git(&["mv", "old_name.rs", "new_name.rs"]);
    repo.git(&["commit", "-q", "-m", "Rename"]);
    let renamed = repo.git(&["rev-parse", "HEAD"]);

    let git = GitCli::new();
    let first = git.list_change_records(repo.path(), &root).unwrap();
    assert_eq!(first.changes[0].path, "old_name.rs");
    assert_eq!(first.changes[0].kind, ChangeKind::Added);

    let moved = git.list_change_records(repo.path(), &renamed).unwrap();
    assert_eq!(moved.changes[0].kind, ChangeKind::Renamed);
    assert_eq!(moved.changes[0].path, "new_name.rs");
    assert_eq!(moved.changes[0].prior_path(), Some("old_name.rs"));
}

#[test]
fn test_batch_skips_noop_merge_end_to_end() {
    let Some(repo) = TempRepo::new() else { return };
    let root = repo.commit_file("README.md", "# demo\n", "Initial commit");
    let a = repo.commit_file("a.txt", "A\n", "A");
    repo.noop_merge(&a, &root, "B");
    let c = repo.commit_file("c.txt", "C\n", "C");

    let git = GitCli::new();
    let model = CountingModel::new(None);
    let summarizer = Summarizer::new(&git, &model, PromptSet::default(), SummarizerSettings::default());
    let runner = BatchRunner::new(&summarizer, BatchOptions { skip_empty_merges: true });

    let out = TempDir::new().unwrap();
    let mut sink = CommitFilesSink::new(out.path());
    let results = runner.run_range(repo.path(), &root, &c, &mut sink).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(model.calls.get(), 2);
    let dir = out.path().join("commits_summaries");
    let first = dir.join(format!("0001_{}.md", &a[..8]));
    let second = dir.join(format!("0002_{}.md", &c[..8]));
    assert_eq!(std::fs::read_to_string(first).unwrap(), "summary 1\n");
    assert_eq!(std::fs::read_to_string(second).unwrap(), "summary 2\n");
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 2);
}

#[test]
fn test_oversized_commit_fetches_file_diff() {
    let Some(repo) = TempRepo::new() else { return };
    repo.commit_file("README.md", "# demo\n", "Initial commit");
    let big = repo.commit_file("src/big.txt", &"line of text\n".repeat(50), "Add big file");

    let git = GitCli::new();
    let model = CountingModel::new(Some("src/big.txt"));
    let settings = SummarizerSettings {
        threshold: SizeThreshold::new(100).unwrap(),
        ..SummarizerSettings::default()
    };
    let summarizer = Summarizer::new(&git, &model, PromptSet::default(), settings);

    let summary = summarizer.summarize_commit(repo.path(), &big).unwrap();
    assert_eq!(summary, "tool summary");
    assert_eq!(model.calls.get(), 0);

    let last = model.last.borrow().clone().unwrap();
    match &last.turns()[2] {
        Turn::ToolResult { correlation_id, content } => {
            assert_eq!(correlation_id, "call_1");
            assert!(content.contains("+line of text"));
        }
        other => panic!("unexpected turn: {other:?}"),
    }
}
