//! Hermes Ports
//!
//! Port definitions (traits) for the Hermes trading simulator.
//! These define the boundaries between the trade pipeline and infrastructure.

mod clock;
mod error;
mod market;
mod store;

pub use clock::Clock;
pub use error::{GatewayError, GatewayResult, StoreError, StoreResult};
pub use market::MarketGateway;
pub use store::{StateStore, TradeStore};

#[cfg(test)]
mod tests {
    use super::*;

    // Ensure ports are object-safe
    fn _assert_gateway_object_safe(_: &dyn MarketGateway) {}
    fn _assert_state_store_object_safe(_: &dyn StateStore) {}
    fn _assert_trade_store_object_safe(_: &dyn TradeStore) {}
    fn _assert_clock_object_safe(_: &dyn Clock) {}
}
