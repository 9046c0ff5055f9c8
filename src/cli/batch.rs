use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use git_ticker::git::GitCli;
use git_ticker::summarization::{
    render_aggregate, AggregateFileSink, BatchHeader, BatchOptions, BatchRunner, CommitFilesSink,
    SummaryResult, SummarySink, Summarizer,
};

use super::{open_repository, Globals, Runtime};

pub struct RangeArgs {
    pub repo: PathBuf,
    pub branch: String,
    pub from: String,
    pub to: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub skip_empty_merges: bool,
    pub slack_channel: Option<String>,
    pub slack_title: Option<String>,
}

/// Check the range before any model call. Returns the resolved `to`.
fn validate(git: &GitCli, args: &RangeArgs) -> Result<String> {
    if !git.branch_exists(&args.repo, &args.branch) {
        bail!("Branch '{}' does not exist", args.branch);
    }
    if !git.commit_exists(&args.repo, &args.from) {
        bail!("Commit '{}' does not exist", args.from);
    }
    let to = match &args.to {
        Some(to) => {
            if !git.commit_exists(&args.repo, to) {
                bail!("Commit '{}' does not exist", to);
            }
            to.clone()
        }
        None => git
            .resolve_ref(&args.repo, &args.branch)
            .with_context(|| format!("Failed to resolve tip of '{}'", args.branch))?,
    };
    if !git.is_ancestor(&args.repo, &args.from, &to) {
        bail!("Commit '{}' is not an ancestor of '{}'", args.from, to);
    }
    Ok(to)
}

/// `range <from> [to]`
pub fn run(globals: &Globals, args: RangeArgs) -> Result<()> {
    let runtime = Runtime::load(globals)?;
    let git = open_repository(&args.repo)?;
    let to = validate(&git, &args)?;
    tracing::info!(branch = %args.branch, from = %args.from, to = %to, "Range validated");

    let client = runtime.model_client()?;
    let summarizer = Summarizer::new(&git, client.as_ref(), runtime.prompts()?, runtime.settings());
    let runner = BatchRunner::new(
        &summarizer,
        BatchOptions {
            skip_empty_merges: args.skip_empty_merges,
        },
    );

    let mut sink: Box<dyn SummarySink> = match (&args.output_dir, &args.output) {
        (Some(dir), _) => Box::new(CommitFilesSink::new(dir)),
        (None, Some(file)) => Box::new(AggregateFileSink::new(file)),
        (None, None) => Box::new(Vec::<SummaryResult>::new()),
    };
    let results = runner
        .run_range(&args.repo, &args.from, &to, sink.as_mut())
        .with_context(|| format!("Failed to process commits {}..{}", args.from, to))?;

    if results.is_empty() {
        eprintln!("No commits to summarize in {}..{}", args.from, to);
        return Ok(());
    }

    let header = BatchHeader {
        repository: args.repo.clone(),
        from: args.from.clone(),
        to: to.clone(),
        commit_count: results.len(),
    };
    let document = render_aggregate(&header, &results);
    match (&args.output_dir, &args.output) {
        (Some(dir), _) => eprintln!("Summaries written under {}", dir.display()),
        (None, Some(file)) => eprintln!("Summary written to {}", file.display()),
        (None, None) => println!("{}", document),
    }

    let failed = results.iter().filter(|r| r.is_failure()).count();
    eprintln!("{} commit(s) summarized, {} failed", results.len() - failed, failed);

    if let Some(channel) = &args.slack_channel {
        runtime.post_to_slack(&document, channel, args.slack_title.as_deref())?;
    }
    Ok(())
}
