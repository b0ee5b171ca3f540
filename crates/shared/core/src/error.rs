//! Domain errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Why a candidate trade was not submitted
///
/// These are an expected "no trade this cycle" outcome, not failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol is required")]
    MissingSymbol,

    #[error("amount is required and must be positive")]
    MissingAmount,

    #[error("quantity is required and must be positive")]
    MissingQuantity,

    #[error("{action} trade must not carry {field}")]
    ConflictingSize {
        action: &'static str,
        field: &'static str,
    },

    #[error("amount {requested} is greater than buying power {available}")]
    InsufficientBuyingPower {
        requested: Decimal,
        available: Decimal,
    },

    #[error("holding not found for {0}")]
    NotHeld(String),

    #[error("quantity {requested} of {symbol} is greater than available quantity {available}")]
    InsufficientQuantity {
        symbol: String,
        requested: Decimal,
        available: Decimal,
    },

    #[error("hold decisions are not submittable")]
    NotSubmittable,
}

/// A completed trade could not be applied to local state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("trade {0} has no execution price or quantity")]
    Unfilled(String),

    #[error("trade {order_id} belongs to {owner}, not {agent}")]
    WrongAgent {
        order_id: String,
        owner: String,
        agent: String,
    },

    #[error("hold records carry no execution")]
    Hold,
}
