//! Hermes Core Domain
//!
//! Pure domain types for the Hermes trading simulator.
//! This crate contains no async, no I/O, and is 100% unit testable.
//!
//! ```text
//!   decision ──► Trade (BUY amount | SELL quantity)
//!                  │
//!                  ▼  AgentState::validate
//!              submitted to broker
//!                  │
//!                  ▼  Trade::fill (price, quantity)
//!              AgentState::apply_fill
//! ```

pub mod entities;
pub mod error;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    AccountSnapshot, AgentState, AgentStats, Position, Trade, TradeAction, new_order_id,
};
pub use error::{ReconcileError, ValidationError};
pub use values::{Amount, OrderId, Price, Quantity, Symbol, Timestamp};
