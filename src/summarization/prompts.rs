//! System instructions and user-message formatting.
//!
//! Every system prompt ends with the output-format template, either the
//! built-in one or a user-supplied markdown file.

use std::path::Path;

use crate::git::{ChangeRecord, CommitSnapshot, DiffPayload};
use crate::time_utils;
use crate::{TickerError, TickerResult};

pub const DEFAULT_TEMPLATE: &str = "\
# <one-line summary of the change>

**Type**: <New feature | Bug fix | Enhancement | Upgrade/Dependency | Refactoring | Minor change>
**Scope**: <feature, module or component impacted>

## Details
- <what changed and why, as short bullet points>
- <for new features: main components and how they fit into the existing system>

Keep minor changes (bug fixes, version bumps, small fixes) to one or two bullets.
Use clean markdown. Do not ask follow-up questions.";

const CHANGE_TYPES: &str = "\
   - New feature: A new functionality or component is being added
   - Bug fix: A bug or issue is being corrected
   - Enhancement: An existing feature is being improved
   - Upgrade/Dependency: Version updates or dependency changes
   - Refactoring: Code restructuring without behavior changes
   - Minor change: Small updates, documentation, or trivial changes";

#[derive(Debug, Clone)]
pub struct PromptSet {
    output_format: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            output_format: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptSet {
    pub fn with_template(output_format: impl Into<String>) -> Self {
        Self {
            output_format: output_format.into(),
        }
    }

    /// Built-in template, or the file at `template_path`.
    pub fn load(template_path: Option<&Path>) -> TickerResult<Self> {
        let Some(path) = template_path else {
            return Ok(Self::default());
        };
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::with_template(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(TickerError::Config(format!(
                "Summary template file not found: {}",
                path.display()
            ))),
            Err(e) => Err(TickerError::Config(format!(
                "Failed to read summary template file: {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn commit_system(&self) -> String {
        format!(
            "You are an expert software engineer analyzing git commits. \
Your role is to analyze commit information and generate intelligent, \
structured summaries in markdown format.

Your task:
1. Analyze the commit message, file changes, and diff content
2. Identify the feature, module, or component impacted by this change
3. Determine the type of change:
{CHANGE_TYPES}

4. Generate a structured summary following the exact format below.

Output format:
{}",
            self.output_format
        )
    }

    pub fn commit_system_with_tools(&self) -> String {
        format!(
            "You are an expert software engineer analyzing git commits. \
Your role is to analyze commit information and generate intelligent, \
structured summaries in markdown format.

The commit diff is too large to include in full. You have been provided with \
a list of files changed. Use the get_file_diff tool to request the diff \
content for specific files that you need to analyze in detail.

Your task:
1. Review the list of files changed
2. Use the get_file_diff tool to request diffs for key files (prioritize source code files, \
configuration files, and files that seem most relevant based on the commit message)
3. Analyze the changes you've requested
4. Identify the feature, module, or component impacted by this change
5. Determine the type of change:
{CHANGE_TYPES}

6. Generate a structured summary following the exact format below.

Output format:
{}

Request diffs for the most important files first, then write the summary from what you \
examined. You do not need every file, only the ones that explain the commit's purpose.",
            self.output_format
        )
    }

    pub fn range_system(&self) -> String {
        format!(
            "You are an expert software engineer analyzing git diffs. \
Your role is to analyze the diff between two commits and generate intelligent, \
structured summaries in markdown format.

Your task:
1. Analyze the diff content between the two commits
2. Identify the overall changes, features, or modifications
3. Determine the type of changes:
{CHANGE_TYPES}

4. Generate a structured summary following the exact format below.

Output format:
{}",
            self.output_format
        )
    }
}

/// `- path (kind)` lines, with ` (from old)` for renames and copies.
pub fn format_change_list(changes: &[ChangeRecord]) -> String {
    if changes.is_empty() {
        return "No files changed".to_string();
    }
    changes
        .iter()
        .map(|c| match c.prior_path() {
            Some(old) => format!("- {} ({}) (from {})", c.path, c.kind, old),
            None => format!("- {} ({})", c.path, c.kind),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn commit_header(commit: &CommitSnapshot) -> String {
    format!(
        "Commit Information:

Commit Hash: {}
Author: {}
Date: {}
Message: {}

Files Changed:
{}",
        commit.hash,
        commit.author,
        time_utils::to_iso(&commit.date),
        commit.message,
        format_change_list(&commit.changes)
    )
}

pub fn commit_input(commit: &CommitSnapshot, diff: &DiffPayload) -> String {
    format!(
        "{}

Diff Content:
{}

Please analyze this commit and generate a markdown summary following the instructions provided.",
        commit_header(commit),
        diff.text
    )
}

pub fn commit_input_files_only(commit: &CommitSnapshot) -> String {
    format!(
        "{}

Note: The full diff for this commit is too large to include. Use the get_file_diff tool \
to request the diff content for specific files you want to analyze.

Please analyze this commit and generate a markdown summary following the instructions provided.",
        commit_header(commit)
    )
}

pub fn range_input(from: &str, to: &str, diff: &DiffPayload) -> String {
    format!(
        "Diff Information:

From commit: {}
To commit: {}

Diff Content:
{}

Please analyze this diff and generate a markdown summary following the instructions provided.",
        from, to, diff.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::ChangeKind;
    use crate::test_helpers::CommitBuilder;

    #[test]
    fn test_change_list_formatting() {
        let changes = vec![
            ChangeRecord::new("src/new.rs", ChangeKind::Renamed, Some("src/old.rs".into())).unwrap(),
            ChangeRecord::new("README.md", ChangeKind::Modified, None).unwrap(),
        ];
        assert_eq!(
            format_change_list(&changes),
            "- src/new.rs (renamed) (from src/old.rs)\n- README.md (modified)"
        );
        assert_eq!(format_change_list(&[]), "No files changed");
    }

    #[test]
    fn test_files_only_input_has_no_diff() {
        let commit = CommitBuilder::new("abc123").message("Big refactor").file("a.rs").build();
        let text = commit_input_files_only(&commit);
        assert!(text.contains("Commit Hash: abc123"));
        assert!(text.contains("- a.rs (modified)"));
        assert!(!text.contains("Diff Content:"));
    }

    #[test]
    fn test_custom_template_is_embedded() {
        let p = PromptSet::with_template("ONLY ONE LINE");
        assert!(p.commit_system().ends_with("ONLY ONE LINE"));
        assert!(p.commit_system_with_tools().contains("ONLY ONE LINE"));
        assert!(p.range_system().contains("ONLY ONE LINE"));
    }

    #[test]
    fn test_load_template_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.md");
        std::fs::write(&path, "# Custom").unwrap();
        let p = PromptSet::load(Some(&path)).unwrap();
        assert!(p.commit_system().ends_with("# Custom"));

        let missing = dir.path().join("missing.md");
        let err = PromptSet::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, TickerError::Config(_)));
    }
}
