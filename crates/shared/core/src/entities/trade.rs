use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TradeAction;
use crate::values::{Amount, OrderId, Price, Quantity, Symbol, Timestamp};

/// Generate a fresh client order id
pub fn new_order_id() -> OrderId {
    Uuid::new_v4().to_string()
}

/// Intent-to-execution record for a single order
///
/// A BUY is created with an amount to spend, a SELL with a quantity to sell.
/// Price, broker order id and (for buys) quantity are only filled in once the
/// market reports the execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Client-generated order id (empty until assigned)
    pub order_id: OrderId,
    /// Order id assigned by the brokerage after placement
    pub broker_order_id: Option<String>,
    pub symbol: Symbol,
    pub action: TradeAction,
    /// Cash to spend (BUY); after a fill, the executed notional
    pub amount: Option<Amount>,
    /// Shares to sell (SELL); after a fill, the executed quantity
    pub quantity: Option<Quantity>,
    /// Execution price per share
    pub price: Option<Price>,
    pub agent_name: String,
    pub timestamp: Timestamp,
    /// Free-form reasoning attached by the decision that produced the trade
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Trade {
    fn base(agent_name: impl Into<String>, symbol: impl Into<Symbol>, action: TradeAction) -> Self {
        Self {
            order_id: new_order_id(),
            broker_order_id: None,
            symbol: symbol.into(),
            action,
            amount: None,
            quantity: None,
            price: None,
            agent_name: agent_name.into(),
            timestamp: Utc::now(),
            rationale: None,
        }
    }

    /// Create a BUY spending `amount`
    pub fn buy(agent_name: impl Into<String>, symbol: impl Into<Symbol>, amount: Amount) -> Self {
        Self {
            amount: Some(amount),
            ..Self::base(agent_name, symbol, TradeAction::Buy)
        }
    }

    /// Create a SELL of `quantity` shares
    pub fn sell(
        agent_name: impl Into<String>,
        symbol: impl Into<Symbol>,
        quantity: Quantity,
    ) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::base(agent_name, symbol, TradeAction::Sell)
        }
    }

    /// Create a HOLD audit record (never submitted to a market)
    pub fn hold(agent_name: impl Into<String>) -> Self {
        Self::base(agent_name, String::new(), TradeAction::Hold)
    }

    /// Builder: override the creation timestamp (clock-provided time)
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Builder: set an explicit client order id
    pub fn with_order_id(mut self, order_id: impl Into<OrderId>) -> Self {
        self.order_id = order_id.into();
        self
    }

    /// Builder: attach decision reasoning
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn has_order_id(&self) -> bool {
        !self.order_id.trim().is_empty()
    }

    /// Assign a client order id if the trade lacks one, returning the id
    pub fn ensure_order_id(&mut self) -> &str {
        if !self.has_order_id() {
            self.order_id = new_order_id();
        }
        &self.order_id
    }

    /// Record an execution reported by the market
    ///
    /// The amount is rewritten to the executed notional so it reflects what
    /// actually traded rather than what was requested.
    pub fn fill(&mut self, broker_order_id: impl Into<String>, price: Price, quantity: Quantity) {
        self.broker_order_id = Some(broker_order_id.into());
        self.price = Some(price);
        self.quantity = Some(quantity);
        self.amount = Some(price * quantity);
    }

    /// Returns true once price and quantity are known
    pub fn is_filled(&self) -> bool {
        self.price.is_some() && self.quantity.is_some()
    }

    /// Executed notional (price * quantity), if filled
    pub fn notional(&self) -> Option<Decimal> {
        Some(self.price? * self.quantity?)
    }

    pub fn is_hold(&self) -> bool {
        self.action == TradeAction::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_buy_carries_amount_only() {
        let trade = Trade::buy("agent", "XYZ", dec!(200));
        assert_eq!(trade.action, TradeAction::Buy);
        assert_eq!(trade.amount, Some(dec!(200)));
        assert!(trade.quantity.is_none());
        assert!(trade.price.is_none());
        assert!(trade.broker_order_id.is_none());
        assert!(trade.has_order_id());
    }

    #[test]
    fn test_sell_carries_quantity_only() {
        let trade = Trade::sell("agent", "ABC", dec!(3));
        assert_eq!(trade.quantity, Some(dec!(3)));
        assert!(trade.amount.is_none());
    }

    #[test]
    fn test_fill_populates_execution() {
        let mut trade = Trade::buy("agent", "XYZ", dec!(200));
        trade.fill("brk-1", dec!(50), dec!(4));

        assert!(trade.is_filled());
        assert_eq!(trade.broker_order_id.as_deref(), Some("brk-1"));
        assert_eq!(trade.notional(), Some(dec!(200)));
        assert_eq!(trade.amount, Some(dec!(200)));
    }

    #[test]
    fn test_ensure_order_id_only_when_missing() {
        let mut trade = Trade::buy("agent", "XYZ", dec!(1)).with_order_id("");
        assert!(!trade.has_order_id());
        let assigned = trade.ensure_order_id().to_string();
        assert!(!assigned.is_empty());

        trade.ensure_order_id();
        assert_eq!(trade.order_id, assigned);
    }

    #[test]
    fn test_serde_action_uppercase() {
        let trade = Trade::hold("agent");
        let json = serde_json::to_string(&trade).unwrap();
        assert!(json.contains("\"HOLD\""));
        assert!(!json.contains("rationale"));
    }
}
