//! Git Ticker: LLM-written summaries of git history.
//!
//! Small diffs are summarized in one request. Diffs above the size threshold
//! go through a bounded tool-calling exchange in which the model pulls the
//! per-file diffs it needs. Finished summaries can be written to disk or
//! posted to Slack.

// Foundation
pub mod config;
pub mod constants;
pub mod error;
pub mod time_utils;
pub mod tracing_init;

// Sub-systems
pub mod git;
pub mod llm;
pub mod notify;
pub mod summarization;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-exports for convenience
pub use error::{TickerError, TickerResult};
