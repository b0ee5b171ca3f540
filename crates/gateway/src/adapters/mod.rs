//! Adapters implementing the brokerage and persistence ports

mod json_store;
mod memory_store;
mod simulated_market;

pub use json_store::JsonFileStore;
pub use memory_store::MemoryStore;
pub use simulated_market::{DEFAULT_PRICE, SimulatedMarket};
