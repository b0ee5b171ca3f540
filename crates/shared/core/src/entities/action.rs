use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a trade asks the market to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    /// No-op, only ever persisted as an audit record
    Hold,
}

impl TradeAction {
    /// Returns the opposite side (Hold stays Hold)
    pub fn opposite(&self) -> Self {
        match self {
            TradeAction::Buy => TradeAction::Sell,
            TradeAction::Sell => TradeAction::Buy,
            TradeAction::Hold => TradeAction::Hold,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
            TradeAction::Hold => "HOLD",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeAction {
    type Err = String;

    /// Case-insensitive; "NONE" is accepted as a synonym for HOLD
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(TradeAction::Buy),
            "SELL" => Ok(TradeAction::Sell),
            "HOLD" | "NONE" => Ok(TradeAction::Hold),
            other => Err(format!("unknown trade action: {other}")),
        }
    }
}
