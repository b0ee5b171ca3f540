//! Simulation - full trading system orchestration
//!
//! Ties together:
//! - Simulated market and persistence
//! - Broker loop
//! - Tick distributor
//! - One runtime per configured agent

use crate::{
    agent::{AgentConfig, AgentHandle, AgentRuntime, AgentServices},
    config::{AgentSpec, RunnerConfig, StrategyKind},
    error::Result,
    hours::TradingHours,
};
use hermes_broker::{Broker, BrokerConfig, BrokerStats};
use hermes_clock::{Shutdown, TickDistributor};
use hermes_core::AgentState;
use hermes_gateway::{JsonFileStore, MemoryStore, SimulatedMarket};
use hermes_ports::{StateStore, StoreError, TradeStore};
use hermes_strategy::{ChatCompletionClient, Decider, LanguageModel, ModelDecider, RandomDecider};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Externally built collaborators
pub struct SimulationParts {
    pub market: Arc<SimulatedMarket>,
    pub states: Arc<dyn StateStore>,
    pub trades: Arc<dyn TradeStore>,
    /// Used by every model agent instead of an HTTP client
    pub model: Option<Arc<dyn LanguageModel>>,
}

impl SimulationParts {
    /// Market and stores as described by `config`
    pub fn from_config(config: &RunnerConfig) -> Self {
        let market = Arc::new(
            SimulatedMarket::new()
                .with_default_price(config.market.default_price)
                .with_prices(config.market.prices.clone())
                .with_market_open(config.market.always_open),
        );

        let (states, trades) = match &config.state_dir {
            Some(dir) => {
                let store = Arc::new(JsonFileStore::new(dir));
                (
                    store.clone() as Arc<dyn StateStore>,
                    store as Arc<dyn TradeStore>,
                )
            }
            None => {
                let store = Arc::new(MemoryStore::new());
                (
                    store.clone() as Arc<dyn StateStore>,
                    store as Arc<dyn TradeStore>,
                )
            }
        };

        Self {
            market,
            states,
            trades,
            model: None,
        }
    }

    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }
}

/// Simulation results
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationResults {
    pub broker: BrokerStats,
    /// Final state of every agent, in configuration order
    pub agents: Vec<AgentState>,
}

impl SimulationResults {
    pub fn agent(&self, name: &str) -> Option<&AgentState> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Executed trades across all agents
    pub fn total_trades(&self) -> u64 {
        self.agents.iter().map(|a| a.stats.total_trades).sum()
    }
}

/// Full trading simulation
pub struct TradingSimulation {
    market: Arc<SimulatedMarket>,
    broker: Arc<Broker>,
    distributor: TickDistributor,
    agents: Vec<AgentRuntime>,
}

impl TradingSimulation {
    /// Build everything from configuration alone
    pub async fn from_config(config: RunnerConfig) -> Result<Self> {
        let parts = SimulationParts::from_config(&config);
        Self::new(config, parts).await
    }

    pub async fn new(config: RunnerConfig, parts: SimulationParts) -> Result<Self> {
        config.validate()?;
        let symbols = config.resolve_symbols()?;
        let system_prompt = config.model.load_system_prompt()?;

        let SimulationParts {
            market,
            states,
            trades,
            model,
        } = parts;

        let broker = Arc::new(
            Broker::new(market.clone(), trades.clone()).with_config(BrokerConfig {
                idle_backoff: config.broker_idle_backoff(),
            }),
        );
        let hours = if config.dev_mode {
            TradingHours::AlwaysOpen
        } else {
            TradingHours::Market(market.clone())
        };
        let services = AgentServices {
            broker: broker.clone(),
            market: market.clone(),
            states: states.clone(),
            trades,
            hours,
        };

        let mut distributor = TickDistributor::new(config.tick_period()?);
        let mut agents = Vec::with_capacity(config.agents.len());

        for spec in &config.agents {
            let state = restore_or_open(&market, states.as_ref(), spec).await?;
            let decider = build_decider(&config, spec, model.as_ref(), system_prompt.as_deref())?;
            let agent_config = AgentConfig::new(spec.name.clone(), symbols.clone())
                .with_record_holds(config.record_holds)
                .with_wash_guard(spec.strategy == StrategyKind::Random);

            log::info!(
                "[{}] Configured {} agent: cash={} holdings={}",
                spec.name,
                decider.name(),
                state.account.cash,
                state.holding_count()
            );

            let ticks = distributor.register(spec.name.clone());
            agents.push(AgentRuntime::new(
                agent_config,
                decider,
                state,
                ticks,
                services.clone(),
            ));
        }

        log::info!(
            "Simulation ready: {} agents, {} symbols, tick every {:?}{}",
            agents.len(),
            symbols.len(),
            distributor.period(),
            if config.dev_mode { " (dev mode)" } else { "" }
        );

        Ok(Self {
            market,
            broker,
            distributor,
            agents,
        })
    }

    pub fn market(&self) -> &Arc<SimulatedMarket> {
        &self.market
    }

    pub fn broker(&self) -> &Arc<Broker> {
        &self.broker
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name()).collect()
    }

    /// Run until `shutdown` fires, then wait for every task to wind down
    pub async fn run(self, shutdown: Shutdown) -> Result<SimulationResults> {
        let Self {
            broker,
            distributor,
            agents,
            ..
        } = self;

        let broker_task = broker.process_trades(shutdown.clone())?;
        let handles: Vec<AgentHandle> = agents.iter().map(|a| a.handle()).collect();
        let agent_tasks: Vec<_> = agents
            .into_iter()
            .map(|agent| tokio::spawn(agent.run(shutdown.clone())))
            .collect();
        let distributor_task = tokio::spawn(distributor.run(shutdown.clone()));

        shutdown.cancelled().await;
        log::info!("Shutting down simulation...");

        if let Err(e) = distributor_task.await {
            log::error!("Tick distributor task failed: {}", e);
        }
        if let Err(e) = broker_task.await {
            log::error!("Broker task failed: {}", e);
        }
        for (handle, task) in handles.iter().zip(agent_tasks) {
            if let Err(e) = task.await {
                log::error!("[{}] Agent task failed: {}", handle.name(), e);
            }
        }

        Ok(SimulationResults {
            broker: broker.stats(),
            agents: handles.iter().map(|h| h.state()).collect(),
        })
    }

    /// Run for a fixed wall-clock duration
    pub async fn run_for(self, duration: Duration) -> Result<SimulationResults> {
        let (handle, shutdown) = hermes_clock::shutdown_channel();
        let run = self.run(shutdown);
        let timer = async {
            tokio::time::sleep(duration).await;
            handle.trigger();
        };
        let (results, ()) = tokio::join!(run, timer);
        results
    }
}

/// Saved state if present (re-seeding the market account), otherwise a fresh account
async fn restore_or_open(
    market: &SimulatedMarket,
    states: &dyn StateStore,
    spec: &AgentSpec,
) -> Result<AgentState> {
    match states.load_state(&spec.name).await {
        Ok(state) => {
            log::info!("[{}] Restored saved state", spec.name);
            market.seed_account(&spec.name, state.account.cash, state.holdings());
            Ok(state)
        }
        Err(StoreError::NotFound(_)) => {
            market.open_account(&spec.name, spec.starting_balance);
            Ok(AgentState::new(spec.name.clone(), spec.starting_balance))
        }
        Err(e) => Err(e.into()),
    }
}

fn build_decider(
    config: &RunnerConfig,
    spec: &AgentSpec,
    shared_model: Option<&Arc<dyn LanguageModel>>,
    system_prompt: Option<&str>,
) -> Result<Box<dyn Decider>> {
    match spec.strategy {
        StrategyKind::Random => {
            let decider = match spec.seed {
                Some(seed) => RandomDecider::with_seed(spec.name.clone(), seed),
                None => RandomDecider::new(spec.name.clone()),
            };
            Ok(Box::new(decider))
        }
        StrategyKind::Model => {
            let model: Arc<dyn LanguageModel> = match shared_model {
                Some(model) => model.clone(),
                None => {
                    let name = spec.model.as_deref().unwrap_or(&config.model.model);
                    let mut client = ChatCompletionClient::from_env(
                        config.model.base_url.clone(),
                        name,
                        &config.model.api_key_env,
                    )?;
                    if let Some(temperature) = config.model.temperature {
                        client = client.with_temperature(temperature);
                    }
                    Arc::new(client)
                }
            };
            let mut decider = ModelDecider::new(spec.name.clone(), model);
            if let Some(prompt) = system_prompt {
                decider = decider.with_system_prompt(prompt);
            }
            Ok(Box::new(decider))
        }
    }
}
