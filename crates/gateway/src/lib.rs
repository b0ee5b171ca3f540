//! Hermes Gateway
//!
//! Infrastructure adapters for the Hermes trading simulator:
//! - `SimulatedMarket`: in-process paper brokerage (immediate fills at quote)
//! - `MemoryStore`: in-memory state snapshots and trade history
//! - `JsonFileStore`: JSON snapshots plus an append-only JSONL trade log
//!
//! ## Architecture
//!
//! ```text
//!        Broker / Agents
//!              │
//!   ┌──────────▼──────────┐
//!   │ MarketGateway port  │──► SimulatedMarket
//!   │ StateStore port     │──► MemoryStore | JsonFileStore
//!   │ TradeStore port     │──► MemoryStore | JsonFileStore
//!   └─────────────────────┘
//! ```

pub mod adapters;

// Re-export commonly used types
pub use adapters::{DEFAULT_PRICE, JsonFileStore, MemoryStore, SimulatedMarket};
