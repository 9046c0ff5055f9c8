//! Batch output destinations.
//!
//! A sink sees `begin` once, `record` for every result in sequence order,
//! then `finish`. Nothing is called for an empty batch.

use std::path::{Path, PathBuf};

use crate::constants::COMMITS_SUMMARIES_DIR;
use crate::TickerResult;

use super::batch::SummaryResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchHeader {
    pub repository: PathBuf,
    pub from: String,
    pub to: String,
    /// Commits kept after merge filtering.
    pub commit_count: usize,
}

pub trait SummarySink {
    fn begin(&mut self, _header: &BatchHeader) -> TickerResult<()> {
        Ok(())
    }

    fn record(&mut self, result: &SummaryResult) -> TickerResult<()>;

    fn finish(&mut self) -> TickerResult<()> {
        Ok(())
    }
}

/// In-memory collection.
impl SummarySink for Vec<SummaryResult> {
    fn record(&mut self, result: &SummaryResult) -> TickerResult<()> {
        self.push(result.clone());
        Ok(())
    }
}

// ============================================================================
// One file per commit
// ============================================================================

/// Writes `<output_dir>/commits_summaries/NNNN_hash8.md` as results arrive.
pub struct CommitFilesSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CommitFilesSink {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            dir: output_dir.join(COMMITS_SUMMARIES_DIR),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl SummarySink for CommitFilesSink {
    fn begin(&mut self, header: &BatchHeader) -> TickerResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        tracing::info!(dir = %self.dir.display(), commits = header.commit_count, "Writing commit summaries");
        Ok(())
    }

    fn record(&mut self, result: &SummaryResult) -> TickerResult<()> {
        let path = self.dir.join(result.file_name());
        std::fs::write(&path, with_trailing_newline(result.text()))?;
        tracing::debug!(path = %path.display(), "Summary written");
        self.written.push(path);
        Ok(())
    }
}

// ============================================================================
// Single aggregate document
// ============================================================================

/// Buffers results and writes one markdown document on `finish`.
pub struct AggregateFileSink {
    path: PathBuf,
    header: Option<BatchHeader>,
    results: Vec<SummaryResult>,
}

impl AggregateFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            header: None,
            results: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SummarySink for AggregateFileSink {
    fn begin(&mut self, header: &BatchHeader) -> TickerResult<()> {
        self.header = Some(header.clone());
        Ok(())
    }

    fn record(&mut self, result: &SummaryResult) -> TickerResult<()> {
        self.results.push(result.clone());
        Ok(())
    }

    fn finish(&mut self) -> TickerResult<()> {
        let Some(header) = &self.header else {
            return Ok(());
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, render_aggregate(header, &self.results))?;
        tracing::info!(path = %self.path.display(), commits = self.results.len(), "Aggregate summary written");
        Ok(())
    }
}

/// Header block followed by one section per result.
pub fn render_aggregate(header: &BatchHeader, results: &[SummaryResult]) -> String {
    let mut out = format!(
        "# Commit Summaries\n\n**Repository**: {}\n**Range**: `{}..{}`\n**Commits**: {}\n",
        header.repository.display(),
        header.from,
        header.to,
        header.commit_count
    );
    for result in results {
        out.push_str("\n---\n\n");
        match &result.message {
            Some(subject) => out.push_str(&format!(
                "## {}. `{}` {}\n\n",
                result.sequence,
                result.short_hash(),
                subject
            )),
            None => out.push_str(&format!("## {}. `{}`\n\n", result.sequence, result.short_hash())),
        }
        out.push_str(&with_trailing_newline(result.text()));
    }
    out
}

fn with_trailing_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{}\n", text)
    }
}
