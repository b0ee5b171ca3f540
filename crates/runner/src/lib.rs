//! Hermes Runner - Multi-Agent Trading Simulation
//!
//! Orchestrates the full trading system:
//!
//! - **Config**: JSON configuration, symbol universe, agent roster
//! - **Trading hours**: dev-mode bypass or the market's clock
//! - **Agent runtime**: one decide/submit/reconcile cycle per tick
//! - **Simulation**: wiring, startup restore and graceful shutdown
//!
//! ## Architecture
//!
//! ```text
//!                     ┌──────────────────┐
//!                     │ Tick Distributor │
//!                     └────────┬─────────┘
//!                              │ aligned ticks
//!               ┌──────────────┴──────────────┐
//!               ▼                             ▼
//!      ┌─────────────────┐           ┌─────────────────┐
//!      │  Agent Runtime  │    ...    │  Agent Runtime  │
//!      │ (RandomDecider) │           │ (ModelDecider)  │
//!      └────────┬────────┘           └────────┬────────┘
//!               │ submit_trade                │
//!               └──────────────┬──────────────┘
//!                              ▼
//!                     ┌──────────────────┐      completion
//!                     │      Broker      │ ───────────────▶ agent state
//!                     └────────┬─────────┘
//!                              │ place_order        save_trade
//!                              ▼                         │
//!                     ┌──────────────────┐      ┌────────▼─────────┐
//!                     │ Simulated Market │      │   State Stores   │
//!                     └──────────────────┘      └──────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hermes_clock::shutdown_channel;
//! use hermes_runner::{RunnerConfig, TradingSimulation};
//!
//! let config = RunnerConfig::from_file("hermes.json")?;
//! let simulation = TradingSimulation::from_config(config).await?;
//!
//! let (handle, shutdown) = shutdown_channel();
//! tokio::spawn(async move {
//!     let _ = tokio::signal::ctrl_c().await;
//!     handle.trigger();
//! });
//!
//! let results = simulation.run(shutdown).await?;
//! println!("{} trades executed", results.total_trades());
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod hours;
pub mod simulation;

// Re-export main types
pub use agent::{AgentConfig, AgentHandle, AgentPhase, AgentRuntime, AgentServices};
pub use config::{AgentSpec, MarketConfig, ModelConfig, RunnerConfig, StrategyKind};
pub use error::{ConfigError, Result, RunnerError};
pub use hours::TradingHours;
pub use simulation::{SimulationParts, SimulationResults, TradingSimulation};
