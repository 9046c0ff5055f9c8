//! Commit summarization: size routing, the direct and tool-exchange paths,
//! and batch processing over commit ranges.

pub mod agent_loop;
pub mod batch;
pub mod classifier;
pub mod direct;
pub mod prompts;
pub mod service;
pub mod sinks;

pub use agent_loop::ToolExchange;
pub use batch::{BatchOptions, BatchRunner, SummaryOutcome, SummaryResult};
pub use classifier::{classify, SizeThreshold, Strategy};
pub use prompts::PromptSet;
pub use service::{Summarizer, SummarizerSettings};
pub use sinks::{render_aggregate, AggregateFileSink, BatchHeader, CommitFilesSink, SummarySink};
