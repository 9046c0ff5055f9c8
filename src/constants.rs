// === Size classification ===
pub const DEFAULT_MAX_DIFF_SIZE: usize = 50_000; // chars; above this the tool loop is used

// === Tool loop ===
pub const MAX_TOOL_ITERATIONS: u32 = 10;
pub const GET_FILE_DIFF_TOOL: &str = "get_file_diff";
pub const FILE_PATH_ARG: &str = "file_path";

// === Range diffs ===
pub const TRUNCATION_MARKER: &str = "\n\n[Diff truncated due to size]";

// === LLM defaults ===
pub const DEFAULT_PROVIDER: &str = "anthropic";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

// === Slack ===
pub const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";
pub const SLACK_MAX_BLOCK_SIZE: usize = 2900; // Slack caps section text at 3000
pub const SLACK_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SLACK_TITLE: &str = "📝 Git Ticker - Development Branch Summary";
pub const SLACK_FALLBACK_TEXT: &str = "Git Ticker Summary";

// === Output layout ===
pub const COMMITS_SUMMARIES_DIR: &str = "commits_summaries";
pub const SHORT_HASH_LEN: usize = 8;

// === Environment ===
pub const ENV_PROVIDER: &str = "LLM_PROVIDER";
pub const ENV_ANTHROPIC_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_ANTHROPIC_MODEL: &str = "ANTHROPIC_MODEL";
pub const ENV_OPENAI_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_SLACK_TOKEN: &str = "SLACK_BOT_TOKEN";
pub const ENV_MAX_DIFF_SIZE: &str = "GIT_TICKER_MAX_DIFF_SIZE";
