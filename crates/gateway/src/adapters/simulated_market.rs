use async_trait::async_trait;
use dashmap::DashMap;
use hermes_core::{AccountSnapshot, Position, Price, Quantity, Symbol, Trade, TradeAction};
use hermes_ports::{GatewayError, GatewayResult, MarketGateway};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Price used for symbols without an explicit quote
pub const DEFAULT_PRICE: Price = dec!(100.00);

/// Decimal places kept on fractional share quantities
const QUANTITY_DP: u32 = 6;

#[derive(Debug, Clone, Default)]
struct SimAccount {
    cash: Decimal,
    positions: BTreeMap<Symbol, Quantity>,
}

/// In-process paper brokerage
///
/// Orders fill immediately and in full at the current quote. Each agent
/// trades against its own cash-only account.
pub struct SimulatedMarket {
    accounts: DashMap<String, SimAccount>,
    prices: DashMap<Symbol, Price>,
    default_price: Option<Price>,
    open: AtomicBool,
    next_order: AtomicU64,
}

impl SimulatedMarket {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            prices: DashMap::new(),
            default_price: Some(DEFAULT_PRICE),
            open: AtomicBool::new(true),
            next_order: AtomicU64::new(1),
        }
    }

    /// Builder: fallback quote for unpriced symbols (`None` rejects them)
    pub fn with_default_price(mut self, price: Option<Price>) -> Self {
        self.default_price = price;
        self
    }

    /// Builder: initial quotes
    pub fn with_prices(self, prices: HashMap<Symbol, Price>) -> Self {
        for (symbol, price) in prices {
            self.prices.insert(symbol, price);
        }
        self
    }

    /// Builder: initial market-hours flag
    pub fn with_market_open(self, open: bool) -> Self {
        self.open.store(open, Ordering::SeqCst);
        self
    }

    /// Open a cash-only account; an existing account is left untouched
    pub fn open_account(&self, agent: &str, starting_cash: Decimal) {
        self.accounts
            .entry(agent.to_string())
            .or_insert_with(|| SimAccount {
                cash: starting_cash,
                positions: BTreeMap::new(),
            });
    }

    /// Create or overwrite an account from a saved cash balance and holdings
    pub fn seed_account<'a>(
        &self,
        agent: &str,
        cash: Decimal,
        holdings: impl IntoIterator<Item = &'a Position>,
    ) {
        let positions = holdings
            .into_iter()
            .filter(|p| !p.is_flat())
            .map(|p| (p.symbol().to_string(), p.quantity()))
            .collect();
        self.accounts
            .insert(agent.to_string(), SimAccount { cash, positions });
    }

    pub fn has_account(&self, agent: &str) -> bool {
        self.accounts.contains_key(agent)
    }

    pub fn set_price(&self, symbol: impl Into<Symbol>, price: Price) {
        self.prices.insert(symbol.into(), price);
    }

    pub fn set_market_open(&self, open: bool) {
        self.open.store(open, Ordering::SeqCst);
    }

    /// Current quote for `symbol`
    pub fn quote(&self, symbol: &str) -> Option<Price> {
        self.prices
            .get(symbol)
            .map(|p| *p.value())
            .or(self.default_price)
    }

    fn next_broker_id(&self) -> String {
        format!("sim-{}", self.next_order.fetch_add(1, Ordering::Relaxed))
    }

    fn holdings_value(&self, account: &SimAccount) -> Decimal {
        account
            .positions
            .iter()
            .filter_map(|(symbol, qty)| self.quote(symbol).map(|price| price * qty))
            .sum()
    }
}

impl Default for SimulatedMarket {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketGateway for SimulatedMarket {
    async fn place_order(&self, trade: &mut Trade) -> GatewayResult<()> {
        if trade.action == TradeAction::Hold {
            return Err(GatewayError::Rejected("HOLD orders are not placed".into()));
        }
        let price = self
            .quote(&trade.symbol)
            .ok_or_else(|| GatewayError::NoQuote(trade.symbol.clone()))?;
        let mut account = self
            .accounts
            .get_mut(&trade.agent_name)
            .ok_or_else(|| GatewayError::UnknownAccount(trade.agent_name.clone()))?;

        let quantity = match trade.action {
            TradeAction::Buy => {
                let amount = trade
                    .amount
                    .filter(|a| *a > Decimal::ZERO)
                    .ok_or(GatewayError::MissingSize("amount"))?;
                let quantity =
                    (amount / price).round_dp_with_strategy(QUANTITY_DP, RoundingStrategy::ToZero);
                if quantity.is_zero() {
                    return Err(GatewayError::Rejected(format!(
                        "amount {} buys no shares at {}",
                        amount, price
                    )));
                }
                let cost = price * quantity;
                if cost > account.cash {
                    return Err(GatewayError::InsufficientCash {
                        required: cost,
                        available: account.cash,
                    });
                }
                account.cash -= cost;
                *account
                    .positions
                    .entry(trade.symbol.clone())
                    .or_insert(Decimal::ZERO) += quantity;
                quantity
            }
            TradeAction::Sell => {
                let quantity = trade
                    .quantity
                    .filter(|q| *q > Decimal::ZERO)
                    .ok_or(GatewayError::MissingSize("quantity"))?;
                let held = account
                    .positions
                    .get(&trade.symbol)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                if quantity > held {
                    return Err(GatewayError::InsufficientPosition {
                        symbol: trade.symbol.clone(),
                        required: quantity,
                        available: held,
                    });
                }
                account.cash += price * quantity;
                let remaining = held - quantity;
                if remaining.is_zero() {
                    account.positions.remove(&trade.symbol);
                } else {
                    account.positions.insert(trade.symbol.clone(), remaining);
                }
                quantity
            }
            TradeAction::Hold => return Err(GatewayError::Rejected("HOLD".into())),
        };
        drop(account);

        let broker_id = self.next_broker_id();
        log::debug!(
            "[{}] Filled {} {} {} @ {} ({})",
            trade.agent_name,
            trade.action,
            quantity,
            trade.symbol,
            price,
            broker_id
        );
        trade.fill(broker_id, price, quantity);
        Ok(())
    }

    async fn account(&self, agent: &str) -> GatewayResult<AccountSnapshot> {
        let account = self
            .accounts
            .get(agent)
            .ok_or_else(|| GatewayError::UnknownAccount(agent.to_string()))?;
        let mut snapshot = AccountSnapshot::with_cash(account.cash);
        snapshot.revalue(self.holdings_value(&account));
        Ok(snapshot)
    }

    async fn positions(&self, agent: &str) -> GatewayResult<Vec<Position>> {
        let account = self
            .accounts
            .get(agent)
            .ok_or_else(|| GatewayError::UnknownAccount(agent.to_string()))?;
        Ok(account
            .positions
            .iter()
            .map(|(symbol, qty)| {
                let price = self.quote(symbol).unwrap_or(Decimal::ZERO);
                Position::new(symbol.clone(), *qty, price)
            })
            .collect())
    }

    async fn is_market_open(&self) -> GatewayResult<bool> {
        Ok(self.open.load(Ordering::SeqCst))
    }

    fn name(&self) -> &str {
        "SimulatedMarket"
    }
}
