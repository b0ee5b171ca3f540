//! Uniform-random strategy
//!
//! Each decision rolls 1-100: a third of the time it buys a random symbol with
//! a random slice of buying power, a third of the time it sells a random slice
//! of a random holding, and otherwise holds.

use async_trait::async_trait;
use hermes_core::{Position, Trade};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::Result;
use crate::strategy::{Decider, Decision, DecisionContext};

const BUY_CEILING: u32 = 33;
const SELL_CEILING: u32 = 66;

pub struct RandomDecider {
    name: String,
    rng: StdRng,
}

impl RandomDecider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible decisions for tests and replays
    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform value in [0, max] on a grid of 0.01
    fn random_hundredths(&mut self, max: Decimal) -> Decimal {
        let steps = (max * Decimal::ONE_HUNDRED).trunc().to_i64().unwrap_or(0);
        if steps <= 0 {
            return Decimal::ZERO;
        }
        Decimal::new(self.rng.gen_range(0..=steps), 2)
    }

    fn buy(&mut self, ctx: &DecisionContext<'_>) -> Decision {
        let Some(symbol) = ctx.symbols.choose(&mut self.rng).cloned() else {
            return Decision::hold();
        };
        let buying_power = ctx.state.account.buying_power;
        let spend = self.random_hundredths(buying_power).min(buying_power);
        log::debug!("[{}] Buying {} of {}", ctx.agent(), spend, symbol);
        Decision::Trade(Trade::buy(ctx.agent(), symbol, spend))
    }

    fn sell(&mut self, ctx: &DecisionContext<'_>) -> Decision {
        let holdings: Vec<&Position> = ctx.state.holdings().collect();
        let Some(holding) = holdings.choose(&mut self.rng) else {
            return Decision::hold();
        };
        let available = holding.quantity();
        let quantity = self.random_hundredths(available).min(available);
        log::debug!("[{}] Selling {} of {}", ctx.agent(), quantity, holding.symbol());
        Decision::Trade(Trade::sell(ctx.agent(), holding.symbol(), quantity))
    }
}

#[async_trait]
impl Decider for RandomDecider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Decision> {
        let roll: u32 = self.rng.gen_range(1..=100);
        log::debug!("[{}] Random value {}", ctx.agent(), roll);

        let decision = if roll <= BUY_CEILING {
            self.buy(ctx)
        } else if roll <= SELL_CEILING {
            self.sell(ctx)
        } else {
            Decision::hold()
        };
        Ok(decision)
    }
}
