use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Price per share - uses Decimal for precision
pub type Price = Decimal;

/// Share quantity - fractional shares are allowed
pub type Quantity = Decimal;

/// Cash amount in account currency
pub type Amount = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Ticker symbol, e.g. "AAPL"
pub type Symbol = String;

/// Client-generated order identifier
pub type OrderId = String;
