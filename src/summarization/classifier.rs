use crate::constants::DEFAULT_MAX_DIFF_SIZE;
use crate::{TickerError, TickerResult};

/// Character count above which a diff is not sent inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeThreshold(usize);

impl SizeThreshold {
    pub fn new(chars: usize) -> TickerResult<Self> {
        if chars == 0 {
            return Err(TickerError::InvalidInput("Size threshold must be positive".into()));
        }
        Ok(Self(chars))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for SizeThreshold {
    fn default() -> Self {
        Self(DEFAULT_MAX_DIFF_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Whole diff in one prompt.
    Direct,
    /// File list only; the model pulls per-file diffs.
    ToolExchange,
}

pub fn classify(payload_len: usize, threshold: SizeThreshold) -> Strategy {
    if payload_len > threshold.get() {
        Strategy::ToolExchange
    } else {
        Strategy::Direct
    }
}
