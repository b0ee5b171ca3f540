use rust_decimal::Decimal;
use thiserror::Error;

/// Errors reported by a brokerage/market adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("no quote available for {0}")]
    NoQuote(String),

    #[error("insufficient cash: need {required}, have {available}")]
    InsufficientCash {
        required: Decimal,
        available: Decimal,
    },

    #[error("insufficient position in {symbol}: need {required}, have {available}")]
    InsufficientPosition {
        symbol: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("order is missing its {0}")]
    MissingSize(&'static str),

    #[error("order not accepted: {0}")]
    Rejected(String),

    #[error("market is closed")]
    MarketClosed,

    #[error("market unavailable: {0}")]
    Unavailable(String),
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Errors reported by a persistence adapter
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no saved state for {0}")]
    NotFound(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
