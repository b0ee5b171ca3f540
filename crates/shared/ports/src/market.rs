use async_trait::async_trait;
use hermes_core::{AccountSnapshot, Position, Trade};

use crate::error::GatewayResult;

/// Port for the brokerage: order placement, account queries, market hours
///
/// Accounts are addressed by agent name, so a single gateway serves every agent.
#[async_trait]
pub trait MarketGateway: Send + Sync {
    /// Place an order and wait for its execution
    ///
    /// On success the trade carries the broker order id, fill price and
    /// realized quantity.
    async fn place_order(&self, trade: &mut Trade) -> GatewayResult<()>;

    /// Current account metrics for `agent`
    async fn account(&self, agent: &str) -> GatewayResult<AccountSnapshot>;

    /// Open positions for `agent`
    async fn positions(&self, agent: &str) -> GatewayResult<Vec<Position>>;

    /// Whether regular trading hours are in session
    async fn is_market_open(&self) -> GatewayResult<bool>;

    fn name(&self) -> &str {
        "MarketGateway"
    }
}
