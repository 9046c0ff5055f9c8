//! Tracing initialization for the CLI.
//!
//! Logs go to stderr by default so summaries printed on stdout stay clean,
//! or are appended to a file when `--log-file` is given.

use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

fn env_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize tracing on stderr. `RUST_LOG` wins over `verbose`.
pub fn init_stderr_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize tracing appended to `log_path`.
///
/// Falls back to stderr when the file cannot be opened.
pub fn init_file_tracing(log_path: &Path, verbose: bool) {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", log_path.display(), e);
            init_stderr_tracing(verbose);
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(Mutex::new(log_file))
        .with_target(true)
        .with_ansi(false)
        .init();
}
