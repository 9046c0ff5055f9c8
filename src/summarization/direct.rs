use crate::llm::{Conversation, ModelClient};
use crate::{TickerError, TickerResult};

/// One `invoke` over a system instruction and a single human message.
///
/// `subject` names what is being summarized in the wrapped error
/// ("commit summary", "diff summary").
pub fn summarize_direct(
    client: &dyn ModelClient,
    system: String,
    human: String,
    subject: &str,
) -> TickerResult<String> {
    let conversation = Conversation::with_human(system, human);
    let turn = client.invoke(&conversation).map_err(|e| {
        TickerError::Summarization(format!("Failed to generate {}: {}", subject, e))
    })?;
    Ok(turn.content.normalize())
}
