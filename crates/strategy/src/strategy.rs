//! Decider Trait
//!
//! Defines the interface between an agent runtime and its decision logic.

use async_trait::async_trait;
use hermes_core::{AgentState, Symbol, Trade};

use crate::error::Result;

/// Outcome of one decision step
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Submit this trade
    Trade(Trade),
    /// Do nothing this cycle
    Hold { rationale: Option<String> },
}

impl Decision {
    pub fn hold() -> Self {
        Decision::Hold { rationale: None }
    }

    pub fn is_hold(&self) -> bool {
        matches!(self, Decision::Hold { .. })
    }

    pub fn into_trade(self) -> Option<Trade> {
        match self {
            Decision::Trade(trade) => Some(trade),
            Decision::Hold { .. } => None,
        }
    }
}

/// Read-only view handed to a decider
///
/// `state` is a snapshot taken under the agent's lock; deciders never see the
/// live state.
pub struct DecisionContext<'a> {
    pub state: &'a AgentState,
    /// Tradable universe
    pub symbols: &'a [Symbol],
}

impl<'a> DecisionContext<'a> {
    pub fn new(state: &'a AgentState, symbols: &'a [Symbol]) -> Self {
        Self { state, symbols }
    }

    pub fn agent(&self) -> &str {
        &self.state.name
    }

    /// Error left by the previous failed trade or decision
    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error.as_deref()
    }
}

/// Decision logic - implement this for a trading strategy
#[async_trait]
pub trait Decider: Send {
    /// Strategy name for logging
    fn name(&self) -> &str;

    /// Produce a trade or a hold from the current snapshot
    async fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Decision>;
}
