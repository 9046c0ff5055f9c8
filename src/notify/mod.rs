//! Delivery of finished summaries to chat channels.

pub mod chunker;
pub mod slack;

pub use chunker::split_message;
pub use slack::{SlackChannel, SlackMessage, SlackNotifier};

use crate::{TickerError, TickerResult};

/// A chat destination. `Ok(false)` means the service accepted the request
/// but reported failure without a specific error code.
pub trait NotificationSink {
    fn send(&self, channel: &SlackChannel, message: &SlackMessage) -> TickerResult<bool>;
}

pub struct NotificationService<'a> {
    sink: &'a dyn NotificationSink,
    default_title: String,
}

impl<'a> NotificationService<'a> {
    pub fn new(sink: &'a dyn NotificationSink, default_title: impl Into<String>) -> Self {
        Self {
            sink,
            default_title: default_title.into(),
        }
    }

    /// Validate `channel` and `summary`, then deliver.
    pub fn send_summary(&self, summary: &str, channel: &str, title: Option<&str>) -> TickerResult<()> {
        let channel = SlackChannel::new(channel)?;
        let title = title.unwrap_or(&self.default_title).to_string();
        let message = SlackMessage::new(summary, Some(title))?;
        if !self.sink.send(&channel, &message)? {
            return Err(TickerError::Delivery(
                "Failed to send message to Slack (API returned failure)".into(),
            ));
        }
        tracing::info!(channel = channel.as_str(), chars = summary.chars().count(), "Summary delivered");
        Ok(())
    }
}
