use thiserror::Error;

#[derive(Error, Debug)]
pub enum TickerError {
    /// Missing credential, unknown provider, unreadable template.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `git` invocation failed or returned unparseable output.
    #[error("History error: {0}")]
    History(String),

    /// Transport or protocol failure talking to a model backend.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    /// The tool-calling loop hit its iteration bound without a final answer.
    #[error("Maximum iterations reached in tool calling loop ({0} iterations)")]
    ToolLoopExhausted(u32),

    #[error("Channel '{0}' not found. Make sure the bot is invited to the channel.")]
    ChannelNotFound(String),

    #[error("Bot is not a member of channel '{0}'. Please invite the bot to the channel first.")]
    NotInChannel(String),

    #[error("Invalid Slack token. Please check your token configuration.")]
    InvalidCredential,

    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Commit dates from `git log`
    #[error("Date parse error: {0}")]
    DateParse(#[from] chrono::ParseError),
}

pub type TickerResult<T> = Result<T, TickerError>;
