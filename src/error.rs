//! Closed error taxonomy for the backtest core. Library functions return `Result<T,
//! BacktestError>` so callers can match on kind rather than inspect strings; orchestration code
//! at the process boundary (store adapters, the CLI) uses `anyhow::Result` instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("no bars available for market '{market}' in range {start}..{end}")]
    DataUnavailable {
        market: String,
        start: String,
        end: String,
    },

    #[error("invalid strategy: {reason}")]
    InvalidStrategy { reason: String },

    #[error("indicator '{name}' returned long/short signals of unequal length ({long_len} vs {short_len})")]
    IndicatorShapeMismatch {
        name: String,
        long_len: usize,
        short_len: usize,
    },

    #[error("trade limit exceeded: {count} >= {limit}")]
    TradeLimitExceeded { count: usize, limit: usize },

    #[error("indicator cache unavailable: {reason}")]
    CacheUnavailable { reason: String },
}

pub type Result<T> = std::result::Result<T, BacktestError>;
