use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Price, Quantity, Symbol};

/// Holding in a single symbol
///
/// `market_value` is always `price * quantity`. The fields are private so the
/// value can only change through the setters, which recompute it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PositionFields")]
pub struct Position {
    symbol: Symbol,
    quantity: Quantity,
    /// Current price per share
    price: Price,
    market_value: Decimal,
}

/// Wire shape; a persisted market value is ignored and recomputed
#[derive(Deserialize)]
struct PositionFields {
    symbol: Symbol,
    quantity: Quantity,
    price: Price,
}

impl From<PositionFields> for Position {
    fn from(fields: PositionFields) -> Self {
        Position::new(fields.symbol, fields.quantity, fields.price)
    }
}

impl Position {
    pub fn new(symbol: impl Into<Symbol>, quantity: Quantity, price: Price) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            price,
            market_value: price * quantity,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn market_value(&self) -> Decimal {
        self.market_value
    }

    pub fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
        self.recompute();
    }

    pub fn set_price(&mut self, price: Price) {
        self.price = price;
        self.recompute();
    }

    /// Add (or with a negative delta, remove) shares
    pub fn adjust_quantity(&mut self, delta: Quantity) {
        self.quantity += delta;
        self.recompute();
    }

    pub fn is_flat(&self) -> bool {
        self.quantity <= Decimal::ZERO
    }

    fn recompute(&mut self) {
        self.market_value = self.price * self.quantity;
    }
}
