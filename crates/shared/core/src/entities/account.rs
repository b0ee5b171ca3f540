use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::Amount;

/// Account metrics as reported by the brokerage
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub buying_power: Amount,
    /// Cash plus market value of all holdings
    pub portfolio_value: Amount,
    pub cash: Amount,
}

impl AccountSnapshot {
    /// Cash-only account (no holdings, no margin)
    pub fn with_cash(cash: Amount) -> Self {
        Self {
            buying_power: cash,
            portfolio_value: cash,
            cash,
        }
    }

    /// Recompute portfolio value from cash and the given holdings value
    pub fn revalue(&mut self, holdings_value: Decimal) {
        self.portfolio_value = self.cash + holdings_value;
    }
}
