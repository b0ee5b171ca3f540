use async_trait::async_trait;
use dashmap::DashMap;
use hermes_core::{AgentState, Trade, TradeAction};
use hermes_ports::{StateStore, StoreError, StoreResult, TradeStore};
use parking_lot::Mutex;
use std::sync::Arc;

/// In-memory state and trade history
///
/// Thread-safe storage using DashMap. Clones share the same storage.
#[derive(Clone, Default)]
pub struct MemoryStore {
    states: Arc<DashMap<String, AgentState>>,
    trades: Arc<Mutex<Vec<Trade>>>,
    /// Key: "trades:{agent}:{action}"
    counters: Arc<DashMap<String, u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter_key(agent: &str, action: TradeAction) -> String {
        format!("trades:{}:{}", agent, action)
    }

    /// All saved trades in save order
    pub fn trades(&self) -> Vec<Trade> {
        self.trades.lock().clone()
    }

    pub fn trades_for(&self, agent: &str) -> Vec<Trade> {
        self.trades()
            .into_iter()
            .filter(|t| t.agent_name == agent)
            .collect()
    }

    /// Number of saved trades for `agent` with `action`
    pub fn trade_count(&self, agent: &str, action: TradeAction) -> u64 {
        self.counters
            .get(&Self::counter_key(agent, action))
            .map(|c| *c.value())
            .unwrap_or(0)
    }

    /// Last saved snapshot for `agent`
    pub fn state(&self, agent: &str) -> Option<AgentState> {
        self.states.get(agent).map(|s| s.value().clone())
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn save_state(&self, state: &AgentState) -> StoreResult<()> {
        self.states.insert(state.name.clone(), state.clone());
        Ok(())
    }

    async fn load_state(&self, agent: &str) -> StoreResult<AgentState> {
        self.state(agent)
            .ok_or_else(|| StoreError::NotFound(agent.to_string()))
    }
}

#[async_trait]
impl TradeStore for MemoryStore {
    async fn save_trade(&self, trade: &Trade) -> StoreResult<()> {
        self.trades.lock().push(trade.clone());
        *self
            .counters
            .entry(Self::counter_key(&trade.agent_name, trade.action))
            .or_insert(0) += 1;
        Ok(())
    }
}
