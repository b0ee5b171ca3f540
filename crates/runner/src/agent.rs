//! Agent runtime - one decision cycle per tick
//!
//! Each tick the runtime:
//! - Skips if the market is closed or a trade is still awaiting completion
//! - Refreshes account and holdings from the market
//! - Asks its decider for a trade or a hold
//! - Validates the trade locally and queues it with the broker
//!
//! The broker's completion callback reconciles the fill into the agent's
//! state and signals the agent task, which persists the snapshot. All state
//! writes for one agent therefore happen on its own task, in order.

use hermes_broker::{Broker, TradeResult};
use hermes_clock::{Shutdown, TickReceiver};
use hermes_core::{AgentState, Symbol, Timestamp, Trade};
use hermes_ports::{MarketGateway, StateStore, TradeStore};
use hermes_strategy::{Decider, Decision, DecisionContext};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::hours::TradingHours;

/// Where an agent is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPhase {
    Idle,
    Deciding,
    AwaitingCompletion,
    ShuttingDown,
}

/// Agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Unique agent name (also the market account key)
    pub name: String,
    /// Symbols the decider may trade
    pub symbols: Vec<Symbol>,
    /// Persist an audit record for each hold
    pub record_holds: bool,
    /// Refuse two consecutive trades in the same symbol
    pub wash_guard: bool,
    /// How long shutdown waits for an in-flight trade to complete
    pub shutdown_grace: Duration,
}

impl AgentConfig {
    pub fn new(name: impl Into<String>, symbols: Vec<Symbol>) -> Self {
        Self {
            name: name.into(),
            symbols,
            record_holds: true,
            wash_guard: false,
            shutdown_grace: Duration::from_secs(5),
        }
    }

    pub fn with_record_holds(mut self, record_holds: bool) -> Self {
        self.record_holds = record_holds;
        self
    }

    pub fn with_wash_guard(mut self, wash_guard: bool) -> Self {
        self.wash_guard = wash_guard;
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }
}

/// Shared collaborators every agent talks to
#[derive(Clone)]
pub struct AgentServices {
    pub broker: Arc<Broker>,
    pub market: Arc<dyn MarketGateway>,
    pub states: Arc<dyn StateStore>,
    pub trades: Arc<dyn TradeStore>,
    pub hours: TradingHours,
}

/// State touched by both the agent task and the broker callback
#[derive(Debug)]
struct Shared {
    state: AgentState,
    phase: AgentPhase,
    last_submitted_symbol: Option<Symbol>,
}

/// Read-only view of a running agent
#[derive(Clone)]
pub struct AgentHandle {
    name: String,
    shared: Arc<Mutex<Shared>>,
}

impl AgentHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy of the current state
    pub fn state(&self) -> AgentState {
        self.shared.lock().state.clone()
    }

    pub fn phase(&self) -> AgentPhase {
        self.shared.lock().phase
    }
}

/// Runs one agent's decide/submit/reconcile cycle
pub struct AgentRuntime {
    config: AgentConfig,
    decider: Box<dyn Decider>,
    shared: Arc<Mutex<Shared>>,
    services: AgentServices,
    ticks: TickReceiver,
    /// Signalled by the broker callback after each reconciliation
    completed_tx: mpsc::UnboundedSender<()>,
    completed: mpsc::UnboundedReceiver<()>,
}

impl AgentRuntime {
    pub fn new(
        config: AgentConfig,
        decider: Box<dyn Decider>,
        state: AgentState,
        ticks: TickReceiver,
        services: AgentServices,
    ) -> Self {
        let (completed_tx, completed) = mpsc::unbounded_channel();
        Self {
            config,
            decider,
            shared: Arc::new(Mutex::new(Shared {
                state,
                phase: AgentPhase::Idle,
                last_submitted_symbol: None,
            })),
            services,
            ticks,
            completed_tx,
            completed,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn handle(&self) -> AgentHandle {
        AgentHandle {
            name: self.config.name.clone(),
            shared: self.shared.clone(),
        }
    }

    /// Main loop: act on every tick until shutdown, then flush state
    pub async fn run(mut self, shutdown: Shutdown) -> AgentState {
        log::info!(
            "[{}] Agent started ({})",
            self.config.name,
            self.decider.name()
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                Some(()) = self.completed.recv() => self.persist().await,

                tick = self.ticks.recv() => match tick {
                    Some(tick) => self.on_tick(tick).await,
                    None => {
                        log::info!("[{}] Tick source closed", self.config.name);
                        break;
                    }
                },
            }
        }

        self.await_in_flight().await;

        let final_state = {
            let mut shared = self.shared.lock();
            shared.phase = AgentPhase::ShuttingDown;
            shared.state.clone()
        };
        self.save(&final_state).await;

        log::info!("[{}] Agent stopped", self.config.name);
        final_state
    }

    /// Wait for the outstanding trade, if any, so the final flush includes it
    async fn await_in_flight(&mut self) {
        let completed = &mut self.completed;
        let shared = &self.shared;
        let wait = async {
            loop {
                let phase = shared.lock().phase;
                if phase != AgentPhase::AwaitingCompletion || completed.recv().await.is_none() {
                    break;
                }
            }
        };
        if tokio::time::timeout(self.config.shutdown_grace, wait)
            .await
            .is_err()
        {
            log::warn!(
                "[{}] Trade still in flight after {:?}, flushing last known state",
                self.config.name,
                self.config.shutdown_grace
            );
        }
    }

    async fn persist(&mut self) {
        let snapshot = self.shared.lock().state.clone();
        self.save(&snapshot).await;
    }

    async fn save(&mut self, state: &AgentState) {
        if let Err(e) = self.services.states.save_state(state).await {
            log::error!("[{}] Failed to save state: {}", self.config.name, e);
        }
    }

    async fn on_tick(&mut self, tick: Timestamp) {
        let name = self.config.name.clone();

        let phase = self.shared.lock().phase;
        if phase == AgentPhase::AwaitingCompletion {
            log::debug!("[{}] Previous trade still in flight, skipping tick", name);
            return;
        }

        if !self.services.hours.is_open().await {
            log::debug!("[{}] Not trading hours, skipping tick", name);
            return;
        }

        self.shared.lock().phase = AgentPhase::Deciding;
        self.refresh().await;

        let snapshot = self.shared.lock().state.clone();
        let ctx = DecisionContext::new(&snapshot, &self.config.symbols);
        let decision = self.decider.decide(&ctx).await;

        match decision {
            Err(e) => {
                log::error!("[{}] Decision failed: {}", name, e);
                let mut shared = self.shared.lock();
                shared.state.record_decision_error(e.to_string());
                shared.phase = AgentPhase::Idle;
            }
            Ok(Decision::Hold { rationale }) => {
                log::info!("[{}] No trade made", name);
                {
                    let mut shared = self.shared.lock();
                    shared.state.record_hold();
                    shared.phase = AgentPhase::Idle;
                }
                if self.config.record_holds {
                    let mut record = Trade::hold(name.as_str()).at(tick);
                    record.rationale = rationale;
                    if let Err(e) = self.services.trades.save_trade(&record).await {
                        log::error!("[{}] Failed to save hold record: {}", name, e);
                    }
                }
            }
            Ok(Decision::Trade(trade)) => self.submit(trade),
        }
    }

    /// Pull account and holdings from the market; keep the old view on error
    async fn refresh(&mut self) {
        let name = self.config.name.as_str();
        let account = self.services.market.account(name).await;
        let positions = self.services.market.positions(name).await;

        match (account, positions) {
            (Ok(account), Ok(positions)) => {
                self.shared.lock().state.refresh(account, positions);
            }
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("[{}] Could not refresh account, using last known state: {}", name, e);
            }
        }
    }

    fn submit(&mut self, trade: Trade) {
        let name = self.config.name.clone();
        {
            let mut shared = self.shared.lock();

            if let Err(e) = shared.state.validate(&trade) {
                log::info!("[{}] Skipping {} {}: {}", name, trade.action, trade.symbol, e);
                shared.phase = AgentPhase::Idle;
                return;
            }

            if self.config.wash_guard
                && shared.last_submitted_symbol.as_deref() == Some(trade.symbol.as_str())
            {
                log::info!(
                    "[{}] Skipping {} {}: same symbol as previous trade",
                    name,
                    trade.action,
                    trade.symbol
                );
                shared.phase = AgentPhase::Idle;
                return;
            }

            shared.last_submitted_symbol = Some(trade.symbol.clone());
            shared.phase = AgentPhase::AwaitingCompletion;
        }

        log::info!(
            "[{}] Submitting {} {} (amount {:?}, quantity {:?})",
            name,
            trade.action,
            trade.symbol,
            trade.amount,
            trade.quantity
        );

        // The callback may run inline if the broker has stopped, so no lock is held here
        let shared = self.shared.clone();
        let completed = self.completed_tx.clone();
        self.services.broker.submit_trade(trade, move |result| {
            on_completion(&name, &shared, result);
            let _ = completed.send(());
        });
    }
}

/// Broker callback: reconcile and release the agent
fn on_completion(name: &str, shared: &Mutex<Shared>, result: TradeResult) {
    let mut shared = shared.lock();
    match result {
        Ok(trade) => match shared.state.apply_fill(&trade) {
            Ok(()) => log::info!(
                "[{}] Trade executed: {} {} x {:?} @ {:?}",
                name,
                trade.action,
                trade.symbol,
                trade.quantity,
                trade.price
            ),
            Err(e) => {
                log::error!("[{}] Could not reconcile trade {}: {}", name, trade.order_id, e);
                shared.state.record_decision_error(e.to_string());
            }
        },
        Err(e) => {
            log::warn!("[{}] Trade failed: {}", name, e);
            shared.state.record_failure(e.to_string());
        }
    }
    if shared.phase == AgentPhase::AwaitingCompletion {
        shared.phase = AgentPhase::Idle;
    }
}
