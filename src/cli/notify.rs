use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};

use super::{Globals, Runtime};

/// `notify <channel>`: post a summary file (or stdin) to Slack.
pub fn run(globals: &Globals, channel: &str, file: Option<&Path>, title: Option<&str>) -> Result<()> {
    let runtime = Runtime::load(globals)?;
    let summary = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read summary from stdin")?;
            buf
        }
    };
    if summary.trim().is_empty() {
        bail!("Summary is empty, nothing to post");
    }
    runtime.post_to_slack(&summary, channel, title)
}
