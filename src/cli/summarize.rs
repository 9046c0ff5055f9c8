use std::path::Path;

use anyhow::{Context, Result};
use git_ticker::summarization::Summarizer;

use super::{deliver, open_repository, DeliveryOptions, Globals, Runtime};

/// `commit <hash>`
pub fn commit(globals: &Globals, repo: &Path, hash: &str, delivery: DeliveryOptions) -> Result<()> {
    let runtime = Runtime::load(globals)?;
    let git = open_repository(repo)?;
    let client = runtime.model_client()?;
    let summarizer = Summarizer::new(&git, client.as_ref(), runtime.prompts()?, runtime.settings());

    let summary = summarizer
        .summarize_commit(repo, hash)
        .with_context(|| format!("Failed to summarize commit {}", hash))?;
    deliver(&runtime, &summary, &delivery)
}

/// `diff <from> <to>`
pub fn diff(globals: &Globals, repo: &Path, from: &str, to: &str, delivery: DeliveryOptions) -> Result<()> {
    let runtime = Runtime::load(globals)?;
    let git = open_repository(repo)?;
    let client = runtime.model_client()?;
    let summarizer = Summarizer::new(&git, client.as_ref(), runtime.prompts()?, runtime.settings());

    let summary = summarizer
        .summarize_range(repo, from, to)
        .with_context(|| format!("Failed to summarize {}..{}", from, to))?;
    deliver(&runtime, &summary, &delivery)
}

/// `branches <base> <head>`
pub fn branches(globals: &Globals, repo: &Path, base: &str, head: &str, delivery: DeliveryOptions) -> Result<()> {
    let runtime = Runtime::load(globals)?;
    let git = open_repository(repo)?;
    for branch in [base, head] {
        if !git.branch_exists(repo, branch) {
            anyhow::bail!("Branch '{}' does not exist", branch);
        }
    }
    let client = runtime.model_client()?;
    let summarizer = Summarizer::new(&git, client.as_ref(), runtime.prompts()?, runtime.settings());

    let summary = summarizer
        .summarize_branches(repo, base, head)
        .with_context(|| format!("Failed to summarize {} against {}", head, base))?;
    deliver(&runtime, &summary, &delivery)
}
