//! Hermes Broker
//!
//! The broker sits between agents and the market, responsible for:
//! - **Queueing**: a thread-safe FIFO shared by every agent
//! - **Placement**: a single loop placing one order at a time
//! - **Completion**: handing each outcome back through the submitter's callback
//! - **History**: persisting every executed trade (best-effort)
//!
//! ## Architecture
//!
//! ```text
//! Agent A ──submit_trade──┐
//! Agent B ──submit_trade──┼──► TradeQueue (FIFO) ──► processing loop
//! Agent C ──submit_trade──┘                              │
//!                                                        ▼ place_order
//!                                                  MarketGateway
//!                                                        │
//!              on_complete(Ok(filled) | Err(e)) ◄────────┤
//!                                                        ▼ Ok only
//!                                                  TradeStore::save_trade
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let broker = Arc::new(Broker::new(market, store));
//! let handle = broker.process_trades(shutdown)?;
//!
//! broker.submit_trade(Trade::buy("alice", "ABC", dec!(250)), |result| {
//!     // apply the fill or record the failure
//! });
//! ```

pub mod broker;
pub mod error;
pub mod queue;

// Re-export main types
pub use broker::{Broker, BrokerConfig, BrokerStats};
pub use error::{BrokerError, Result};
pub use queue::{Completion, TradeQueue, TradeResult, WorkItem};
