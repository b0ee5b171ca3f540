//! Hermes Strategy Framework
//!
//! Provides the decision side of an agent:
//! - `Decider` trait: snapshot in, trade-or-hold out
//! - `RandomDecider`: uniform buy / sell / hold
//! - `ModelDecider`: prompt a language model and parse its JSON answer
//!
//! ## Architecture
//!
//! ```text
//!   AgentState snapshot ──► DecisionContext
//!                                 │
//!                 ┌───────────────┴───────────────┐
//!                 ▼                               ▼
//!           RandomDecider                    ModelDecider
//!           (seeded StdRng)                       │ user_prompt()
//!                 │                               ▼
//!                 │                     LanguageModel::complete
//!                 │                     (ChatCompletionClient)
//!                 │                               │ parse_decision()
//!                 └───────────────┬───────────────┘
//!                                 ▼
//!                    Decision::Trade | Decision::Hold
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hermes_strategy::{Decider, DecisionContext, RandomDecider};
//!
//! let mut decider = RandomDecider::with_seed("rng", 7);
//! let decision = decider.decide(&DecisionContext::new(&snapshot, &symbols)).await?;
//! ```

pub mod client;
pub mod error;
pub mod model;
pub mod parse;
pub mod prompt;
pub mod random;
pub mod strategy;

// Re-export main types
pub use client::ChatCompletionClient;
pub use error::{DecisionError, ModelError, ParseError, Result};
pub use model::{LanguageModel, ModelDecider};
pub use parse::{TradeDecision, parse_decision};
pub use prompt::{DEFAULT_SYSTEM_PROMPT, user_prompt};
pub use random::RandomDecider;
pub use strategy::{Decider, Decision, DecisionContext};
