//! Configuration loading for the simulator
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```json
//! {
//!   "dev_mode": true,
//!   "symbols_file": "symbols.txt",
//!   "state_dir": "state",
//!   "agents": [
//!     { "name": "RNG_Agent", "strategy": "random", "seed": 7 },
//!     { "name": "LLM_Agent", "strategy": "model", "starting_balance": "50000" }
//!   ],
//!   "model": { "model": "google/gemini-2.5-flash", "api_key_env": "OPENROUTER_KEY" },
//!   "market": { "prices": { "AAPL": "190.25" } }
//! }
//! ```

use hermes_core::{Amount, Price, Symbol};
use hermes_gateway::DEFAULT_PRICE;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Seconds between decision ticks
    pub tick_period_secs: f64,
    /// Tick period used in dev mode
    pub dev_tick_period_secs: f64,
    /// Short ticks and no trading-hours gate
    pub dev_mode: bool,
    /// Inline symbol universe
    pub symbols: Vec<Symbol>,
    /// One ticker per line, merged with `symbols`
    pub symbols_file: Option<PathBuf>,
    /// JSON file persistence root; in-memory when unset
    pub state_dir: Option<PathBuf>,
    /// Broker sleep between polls of an empty queue
    pub broker_idle_backoff_ms: u64,
    /// Persist an audit record for every hold
    pub record_holds: bool,
    pub agents: Vec<AgentSpec>,
    pub model: ModelConfig,
    pub market: MarketConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_period_secs: 600.0,
            dev_tick_period_secs: 20.0,
            dev_mode: false,
            symbols: ["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA"]
                .into_iter()
                .map(String::from)
                .collect(),
            symbols_file: None,
            state_dir: None,
            broker_idle_backoff_ms: 100,
            record_holds: true,
            agents: vec![AgentSpec::random("RNG_Agent")],
            model: ModelConfig::default(),
            market: MarketConfig::default(),
        }
    }
}

/// Which decision strategy an agent runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Random,
    Model,
}

/// One agent to run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub strategy: StrategyKind,
    #[serde(default = "default_starting_balance")]
    pub starting_balance: Amount,
    /// Fixed RNG seed (random strategy)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Model override (model strategy)
    #[serde(default)]
    pub model: Option<String>,
}

fn default_starting_balance() -> Amount {
    dec!(100000)
}

impl AgentSpec {
    pub fn random(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategy: StrategyKind::Random,
            starting_balance: default_starting_balance(),
            seed: None,
            model: None,
        }
    }

    pub fn model(name: impl Into<String>) -> Self {
        Self {
            strategy: StrategyKind::Model,
            ..Self::random(name)
        }
    }

    pub fn with_starting_balance(mut self, balance: Amount) -> Self {
        self.starting_balance = balance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Language model endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// OpenAI-compatible API root
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub system_prompt_file: Option<PathBuf>,
    pub temperature: Option<f32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "google/gemini-2.5-flash".to_string(),
            api_key_env: "OPENROUTER_KEY".to_string(),
            system_prompt_file: None,
            temperature: None,
        }
    }
}

impl ModelConfig {
    /// Contents of `system_prompt_file`, if configured
    pub fn load_system_prompt(&self) -> Result<Option<String>, ConfigError> {
        self.system_prompt_file
            .as_deref()
            .map(read_file)
            .transpose()
    }
}

/// Simulated brokerage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Quote for symbols missing from `prices`; `null` rejects them
    pub default_price: Option<Price>,
    pub prices: HashMap<Symbol, Price>,
    /// Market-hours flag reported outside dev mode
    pub always_open: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            default_price: Some(DEFAULT_PRICE),
            prices: HashMap::new(),
            always_open: true,
        }
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        error: e.to_string(),
    })
}

impl RunnerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&read_file(path.as_ref())?)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Tick period for the current mode
    pub fn tick_period(&self) -> Result<Duration, ConfigError> {
        let secs = if self.dev_mode {
            self.dev_tick_period_secs
        } else {
            self.tick_period_secs
        };
        if secs <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tick period must be positive, got {}",
                secs
            )));
        }
        Duration::try_from_secs_f64(secs)
            .map_err(|e| ConfigError::Invalid(format!("tick period {}: {}", secs, e)))
    }

    pub fn broker_idle_backoff(&self) -> Duration {
        Duration::from_millis(self.broker_idle_backoff_ms)
    }

    /// Inline symbols followed by the symbols file, trimmed and de-duplicated
    pub fn resolve_symbols(&self) -> Result<Vec<Symbol>, ConfigError> {
        let mut candidates = self.symbols.clone();
        if let Some(path) = &self.symbols_file {
            candidates.extend(read_file(path)?.lines().map(String::from));
        }

        let mut seen = HashSet::new();
        let symbols: Vec<Symbol> = candidates
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(s.clone()))
            .collect();

        if symbols.is_empty() {
            return Err(ConfigError::Invalid("no tradable symbols".to_string()));
        }
        Ok(symbols)
    }

    /// Check agents and timing settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tick_period()?;

        if self.agents.is_empty() {
            return Err(ConfigError::Invalid("no agents configured".to_string()));
        }
        let mut names = HashSet::new();
        for agent in &self.agents {
            if agent.name.trim().is_empty() {
                return Err(ConfigError::Invalid("agent name is empty".to_string()));
            }
            if !names.insert(agent.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate agent name: {}",
                    agent.name
                )));
            }
            if agent.starting_balance < Decimal::ZERO {
                return Err(ConfigError::Invalid(format!(
                    "{}: starting balance is negative",
                    agent.name
                )));
            }
        }
        Ok(())
    }

    pub fn uses_model(&self) -> bool {
        self.agents
            .iter()
            .any(|a| a.strategy == StrategyKind::Model)
    }
}
