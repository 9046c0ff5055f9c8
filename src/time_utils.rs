use chrono::{DateTime, FixedOffset};

use crate::TickerResult;

/// Parse a strict ISO 8601 date as printed by `git log --format=%aI`.
pub fn parse_git_date(s: &str) -> TickerResult<DateTime<FixedOffset>> {
    Ok(DateTime::parse_from_rfc3339(s.trim())?)
}

/// ISO 8601 rendering used in prompts and output headers.
pub fn to_iso(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339()
}
