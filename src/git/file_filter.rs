//! Heuristic detection of generated and vendored files.
//!
//! Filtered paths are hidden from the change list shown to the model; they
//! stay reachable through `get_file_diff`.

use regex::Regex;

use super::ChangeRecord;

/// Multi-part suffixes first so `.min.js` wins over `.js`.
const GENERATED_SUFFIXES: &[&str] = &[
    ".min.js", ".bundle.js", ".lock", ".pb", ".bin", ".pyc", ".class", ".o", ".so",
    ".dll", ".exe", ".jar", ".war", ".ear", ".whl", ".egg",
];

const GENERATED_DIRS: &[&str] = &[
    "node_modules", "dist", "build", "target", ".venv", "__pycache__", ".gradle",
    ".mvn", ".idea", ".vscode", ".next", ".nuxt", "obj",
];

/// Build output only when directly under the repository root; `src/bin/` is source.
const ROOT_OUTPUT_DIRS: &[&str] = &["out", "bin"];

#[derive(Debug, Clone)]
pub struct FileFilter {
    name_pattern: Regex,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl FileFilter {
    pub fn new() -> Self {
        Self {
            name_pattern: Regex::new(r"(?i)generated|compiled|\.min\.|\.bundle\.")
                .expect("generated-file pattern is valid"),
        }
    }

    pub fn is_generated(&self, path: &str) -> bool {
        let lower = path.to_lowercase();
        if GENERATED_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            return true;
        }

        let mut components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        let file_name = components.pop().unwrap_or("");

        if components
            .iter()
            .any(|c| GENERATED_DIRS.iter().any(|d| c.eq_ignore_ascii_case(d)))
        {
            return true;
        }
        if let Some(top) = components.first() {
            if ROOT_OUTPUT_DIRS.iter().any(|d| top.eq_ignore_ascii_case(d)) {
                return true;
            }
        }

        self.name_pattern.is_match(file_name)
    }

    /// Keep only hand-written files, preserving order.
    pub fn retain_source(&self, changes: Vec<ChangeRecord>) -> Vec<ChangeRecord> {
        let before = changes.len();
        let kept: Vec<ChangeRecord> = changes
            .into_iter()
            .filter(|c| !self.is_generated(&c.path))
            .collect();
        if kept.len() != before {
            tracing::debug!(hidden = before - kept.len(), kept = kept.len(), "Generated files filtered");
        }
        kept
    }
}
