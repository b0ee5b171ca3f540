use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{AccountSnapshot, Position, Trade, TradeAction};
use crate::error::{ReconcileError, ValidationError};
use crate::values::{Amount, Quantity, Symbol};

/// Running counters for an agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    pub initial_balance: Amount,
    /// Trades confirmed executed by the market
    pub total_trades: u64,
    /// Trades rejected or failed at placement
    pub failed_trades: u64,
    /// Cycles where the decision was to do nothing
    pub holds: u64,
}

/// Mutable per-agent snapshot
///
/// Holdings are keyed by symbol so there is exactly one position per symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub name: String,
    holdings: BTreeMap<Symbol, Position>,
    pub account: AccountSnapshot,
    /// Error from the last failed trade or decision, fed into the next decision
    pub last_error: Option<String>,
    #[serde(default)]
    pub stats: AgentStats,
}

impl AgentState {
    /// Fresh state with a cash-only starting balance
    pub fn new(name: impl Into<String>, starting_balance: Amount) -> Self {
        Self {
            name: name.into(),
            holdings: BTreeMap::new(),
            account: AccountSnapshot::with_cash(starting_balance),
            last_error: None,
            stats: AgentStats {
                initial_balance: starting_balance,
                ..Default::default()
            },
        }
    }

    pub fn holdings(&self) -> impl Iterator<Item = &Position> {
        self.holdings.values()
    }

    pub fn holding(&self, symbol: &str) -> Option<&Position> {
        self.holdings.get(symbol)
    }

    pub fn holding_count(&self) -> usize {
        self.holdings.len()
    }

    /// Quantity currently available to sell (zero when not held)
    pub fn available_quantity(&self, symbol: &str) -> Quantity {
        self.holdings
            .get(symbol)
            .map(|p| p.quantity())
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum of market value across holdings
    pub fn holdings_value(&self) -> Decimal {
        self.holdings.values().map(|p| p.market_value()).sum()
    }

    /// Replace account and holdings with what the brokerage reports
    ///
    /// Duplicate symbols are merged into one position; flat positions are dropped.
    pub fn refresh(&mut self, account: AccountSnapshot, positions: Vec<Position>) {
        let mut holdings: BTreeMap<Symbol, Position> = BTreeMap::new();
        for position in positions {
            match holdings.get_mut(position.symbol()) {
                Some(existing) => {
                    existing.adjust_quantity(position.quantity());
                    existing.set_price(position.price());
                }
                None => {
                    holdings.insert(position.symbol().to_string(), position);
                }
            }
        }
        holdings.retain(|_, p| !p.is_flat());

        self.holdings = holdings;
        self.account = account;
    }

    /// Local pre-submission checks against current buying power and holdings
    pub fn validate(&self, trade: &Trade) -> Result<(), ValidationError> {
        if trade.symbol.trim().is_empty() {
            return Err(ValidationError::MissingSymbol);
        }

        match trade.action {
            TradeAction::Buy => {
                if trade.quantity.is_some() {
                    return Err(ValidationError::ConflictingSize {
                        action: "BUY",
                        field: "a quantity",
                    });
                }
                let amount = match trade.amount {
                    Some(amount) if amount > Decimal::ZERO => amount,
                    _ => return Err(ValidationError::MissingAmount),
                };
                if amount > self.account.buying_power {
                    return Err(ValidationError::InsufficientBuyingPower {
                        requested: amount,
                        available: self.account.buying_power,
                    });
                }
            }
            TradeAction::Sell => {
                if trade.amount.is_some() {
                    return Err(ValidationError::ConflictingSize {
                        action: "SELL",
                        field: "an amount",
                    });
                }
                let quantity = match trade.quantity {
                    Some(quantity) if quantity > Decimal::ZERO => quantity,
                    _ => return Err(ValidationError::MissingQuantity),
                };
                let holding = self
                    .holdings
                    .get(&trade.symbol)
                    .ok_or_else(|| ValidationError::NotHeld(trade.symbol.clone()))?;
                if quantity > holding.quantity() {
                    return Err(ValidationError::InsufficientQuantity {
                        symbol: trade.symbol.clone(),
                        requested: quantity,
                        available: holding.quantity(),
                    });
                }
            }
            TradeAction::Hold => return Err(ValidationError::NotSubmittable),
        }

        Ok(())
    }

    /// Apply an executed trade using fill price * filled quantity
    pub fn apply_fill(&mut self, trade: &Trade) -> Result<(), ReconcileError> {
        if trade.agent_name != self.name {
            return Err(ReconcileError::WrongAgent {
                order_id: trade.order_id.clone(),
                owner: trade.agent_name.clone(),
                agent: self.name.clone(),
            });
        }
        let (price, quantity) = match (trade.price, trade.quantity) {
            (Some(price), Some(quantity)) => (price, quantity),
            _ => return Err(ReconcileError::Unfilled(trade.order_id.clone())),
        };
        let notional = price * quantity;

        match trade.action {
            TradeAction::Buy => {
                self.account.cash -= notional;
                self.account.buying_power -= notional;
                self.holdings
                    .entry(trade.symbol.clone())
                    .and_modify(|p| {
                        p.adjust_quantity(quantity);
                        p.set_price(price);
                    })
                    .or_insert_with(|| Position::new(trade.symbol.clone(), quantity, price));
            }
            TradeAction::Sell => {
                self.account.cash += notional;
                self.account.buying_power += notional;
                if let Some(position) = self.holdings.get_mut(&trade.symbol) {
                    position.adjust_quantity(-quantity);
                    position.set_price(price);
                    if position.is_flat() {
                        self.holdings.remove(&trade.symbol);
                    }
                }
            }
            TradeAction::Hold => return Err(ReconcileError::Hold),
        }

        let holdings_value = self.holdings_value();
        self.account.revalue(holdings_value);
        self.stats.total_trades += 1;
        self.last_error = None;
        Ok(())
    }

    /// Remember a failed trade so the next decision can see it
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
        self.stats.failed_trades += 1;
    }

    /// Remember a decision failure (not a trade failure)
    pub fn record_decision_error(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }

    pub fn record_hold(&mut self) {
        self.stats.holds += 1;
    }
}
