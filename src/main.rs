mod cli;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "git-ticker", version, about = "Git Ticker — LLM summaries of git history")]
struct App {
    /// Config file (defaults to <config dir>/git-ticker/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    /// Diff size in characters above which the tool-calling path is used
    #[arg(long, global = true)]
    max_diff_size: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Delivery {
    /// Write the summary to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Also post the summary to this Slack channel (no # prefix)
    #[arg(long)]
    slack_channel: Option<String>,
    /// Slack header (defaults to slack.title from config)
    #[arg(long)]
    slack_title: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a single commit
    Commit {
        /// Commit hash or reference
        hash: String,
        /// Repository path
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        #[command(flatten)]
        delivery: Delivery,
    },
    /// Summarize every commit in a range, one summary per commit
    Range {
        /// First commit (exclusive)
        from: String,
        /// Last commit (inclusive; defaults to the branch tip)
        to: Option<String>,
        /// Branch the range lives on
        #[arg(long, default_value = "main")]
        branch: String,
        /// Repository path
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// Write <dir>/commits_summaries/NNNN_hash.md files
        #[arg(long, conflicts_with = "output")]
        output_dir: Option<PathBuf>,
        /// Write one aggregate markdown document
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Drop merge commits that bring no changes
        #[arg(long)]
        skip_empty_merges: bool,
        /// Post the aggregate document to this Slack channel
        #[arg(long)]
        slack_channel: Option<String>,
        #[arg(long)]
        slack_title: Option<String>,
    },
    /// Summarize the cumulative diff between two commits
    Diff {
        from: String,
        to: String,
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        #[command(flatten)]
        delivery: Delivery,
    },
    /// Summarize what a branch adds on top of a base branch
    Branches {
        /// Base branch (e.g. main)
        base: String,
        /// Feature branch
        head: String,
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        #[command(flatten)]
        delivery: Delivery,
    },
    /// Post an existing markdown summary to Slack
    Notify {
        /// Channel name without the # prefix
        channel: String,
        /// Summary file (reads stdin when omitted)
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        title: Option<String>,
    },
    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Get a config value (dot notation: summarization.max_diff_size)
    Get {
        key: String,
    },
    /// Set a config value in the config file
    Set {
        key: String,
        /// Value (JSON: true, 42, "string")
        value: String,
    },
}

impl From<Delivery> for cli::DeliveryOptions {
    fn from(d: Delivery) -> Self {
        Self {
            output: d.output,
            slack_channel: d.slack_channel,
            slack_title: d.slack_title,
        }
    }
}

fn main() {
    let app = App::parse();

    match &app.log_file {
        Some(path) => git_ticker::tracing_init::init_file_tracing(path, app.verbose),
        None => git_ticker::tracing_init::init_stderr_tracing(app.verbose),
    }

    let globals = cli::Globals {
        config_path: app.config,
        max_diff_size: app.max_diff_size,
    };

    let result = match app.command {
        Commands::Commit { hash, repo, delivery } => {
            cli::summarize::commit(&globals, &repo, &hash, delivery.into())
        }
        Commands::Range {
            from,
            to,
            branch,
            repo,
            output_dir,
            output,
            skip_empty_merges,
            slack_channel,
            slack_title,
        } => cli::batch::run(
            &globals,
            cli::batch::RangeArgs {
                repo,
                branch,
                from,
                to,
                output_dir,
                output,
                skip_empty_merges,
                slack_channel,
                slack_title,
            },
        ),
        Commands::Diff { from, to, repo, delivery } => {
            cli::summarize::diff(&globals, &repo, &from, &to, delivery.into())
        }
        Commands::Branches { base, head, repo, delivery } => {
            cli::summarize::branches(&globals, &repo, &base, &head, delivery.into())
        }
        Commands::Notify { channel, file, title } => {
            cli::notify::run(&globals, &channel, file.as_deref(), title.as_deref())
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::config::run_show(&globals),
            ConfigAction::Path => cli::config::run_path(&globals),
            ConfigAction::Get { key } => cli::config::run_get(&globals, &key),
            ConfigAction::Set { key, value } => cli::config::run_set(&globals, &key, &value),
        },
    };

    if let Err(e) = result {
        tracing::error!(error = %format!("{:#}", e), "Command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
