//! Trading-hours gate

use hermes_ports::MarketGateway;
use std::sync::Arc;

/// Decides whether agents may act on a tick
#[derive(Clone)]
pub enum TradingHours {
    /// Dev mode: every tick is tradable
    AlwaysOpen,
    /// Ask the market's clock
    Market(Arc<dyn MarketGateway>),
}

impl TradingHours {
    /// A clock error counts as closed
    pub async fn is_open(&self) -> bool {
        match self {
            TradingHours::AlwaysOpen => true,
            TradingHours::Market(market) => match market.is_market_open().await {
                Ok(open) => open,
                Err(e) => {
                    log::error!("Error getting market clock from {}: {}", market.name(), e);
                    false
                }
            },
        }
    }
}

impl std::fmt::Debug for TradingHours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradingHours::AlwaysOpen => f.write_str("AlwaysOpen"),
            TradingHours::Market(market) => write!(f, "Market({})", market.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hermes_core::{AccountSnapshot, Position, Trade};
    use hermes_ports::{GatewayError, GatewayResult};

    struct Clockwork(GatewayResult<bool>);

    #[async_trait]
    impl MarketGateway for Clockwork {
        async fn place_order(&self, _trade: &mut Trade) -> GatewayResult<()> {
            Err(GatewayError::MarketClosed)
        }

        async fn account(&self, agent: &str) -> GatewayResult<AccountSnapshot> {
            Err(GatewayError::UnknownAccount(agent.to_string()))
        }

        async fn positions(&self, _agent: &str) -> GatewayResult<Vec<Position>> {
            Ok(Vec::new())
        }

        async fn is_market_open(&self) -> GatewayResult<bool> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_always_open() {
        assert!(TradingHours::AlwaysOpen.is_open().await);
    }

    #[tokio::test]
    async fn test_market_clock_decides() {
        assert!(TradingHours::Market(Arc::new(Clockwork(Ok(true)))).is_open().await);
        assert!(!TradingHours::Market(Arc::new(Clockwork(Ok(false)))).is_open().await);
    }

    #[tokio::test]
    async fn test_clock_error_is_closed() {
        let _ = env_logger::try_init();
        let hours = TradingHours::Market(Arc::new(Clockwork(Err(GatewayError::Unavailable(
            "timeout".into(),
        )))));
        assert!(!hours.is_open().await);
    }
}
