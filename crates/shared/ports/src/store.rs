use async_trait::async_trait;
use hermes_core::{AgentState, Trade};

use crate::error::StoreResult;

/// Port for agent state snapshots
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn save_state(&self, state: &AgentState) -> StoreResult<()>;

    /// Load the last saved snapshot, or `StoreError::NotFound`
    async fn load_state(&self, agent: &str) -> StoreResult<AgentState>;
}

/// Port for the append-only trade history
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn save_trade(&self, trade: &Trade) -> StoreResult<()>;
}
