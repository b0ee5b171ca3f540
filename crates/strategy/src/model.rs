//! Language-model driven strategy

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{DecisionError, ModelError, Result};
use crate::parse::parse_decision;
use crate::prompt::{DEFAULT_SYSTEM_PROMPT, HISTORY_LIMIT, user_prompt};
use crate::strategy::{Decider, Decision, DecisionContext};

/// Text completion capability
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> std::result::Result<String, ModelError>;

    fn model_name(&self) -> &str {
        "LanguageModel"
    }
}

/// Asks a language model for each decision
///
/// Raw responses that parsed successfully are kept and fed back into later
/// prompts as the agent's previous trades.
pub struct ModelDecider {
    name: String,
    model: Arc<dyn LanguageModel>,
    system_prompt: String,
    history: Vec<String>,
}

impl ModelDecider {
    pub fn new(name: impl Into<String>, model: Arc<dyn LanguageModel>) -> Self {
        Self {
            name: name.into(),
            model,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history: Vec::new(),
        }
    }

    /// Builder: replace the default system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    fn remember(&mut self, response: String) {
        self.history.push(response);
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }
}

#[async_trait]
impl Decider for ModelDecider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Decision> {
        let prompt = user_prompt(ctx.state, ctx.symbols, &self.history)
            .map_err(|e| DecisionError::Prompt(e.to_string()))?;

        log::debug!(
            "[{}] Asking {} for a decision",
            ctx.agent(),
            self.model.model_name()
        );
        let response = self.model.complete(&self.system_prompt, &prompt).await?;

        let decision = parse_decision(&response)?;
        log::debug!("[{}] Model decision: {:?}", ctx.agent(), decision);
        self.remember(response);

        Ok(decision.into_decision(ctx.agent())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use hermes_core::{AgentState, TradeAction};
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records the prompts it was given
    struct ScriptedModel {
        responses: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedModel {
        fn new(responses: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(
            &self,
            system_prompt: &str,
            user_prompt: &str,
        ) -> std::result::Result<String, ModelError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_prompt.to_string()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(ModelError::EmptyResponse)
        }
    }

    #[tokio::test]
    async fn test_model_decision_becomes_trade() {
        let _ = env_logger::try_init();
        let model = ScriptedModel::new(&[
            r#"{"action":"buy","symbol":"AAPL","amount":"125.50","reasoning":"momentum"}"#,
        ]);
        let mut decider = ModelDecider::new("llm", model.clone()).with_system_prompt("be brief");
        let state = AgentState::new("llm", dec!(1000));
        let symbols = vec!["AAPL".to_string()];

        let decision = decider
            .decide(&DecisionContext::new(&state, &symbols))
            .await
            .unwrap();
        let trade = decision.into_trade().unwrap();

        assert_eq!(trade.action, TradeAction::Buy);
        assert_eq!(trade.amount, Some(dec!(125.50)));
        assert_eq!(trade.rationale.as_deref(), Some("momentum"));
        assert_eq!(decider.history().len(), 1);

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts[0].0, "be brief");
        assert!(prompts[0].1.contains("List of tradable symbols: AAPL"));
    }

    #[tokio::test]
    async fn test_history_and_last_error_feed_next_prompt() {
        let model = ScriptedModel::new(&[
            r#"{"action":"NONE","symbol":""}"#,
            r#"{"action":"SELL","symbol":"MSFT","quantity":1}"#,
        ]);
        let mut decider = ModelDecider::new("llm", model.clone());
        let mut state = AgentState::new("llm", dec!(1000));
        let symbols: Vec<String> = Vec::new();

        let first = decider
            .decide(&DecisionContext::new(&state, &symbols))
            .await
            .unwrap();
        assert!(first.is_hold());

        state.record_failure("market closed");
        decider
            .decide(&DecisionContext::new(&state, &symbols))
            .await
            .unwrap();

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[1].1.contains(r#"{"action":"NONE","symbol":""}"#));
        assert!(prompts[1].1.contains("Last trade error: market closed"));
    }

    #[tokio::test]
    async fn test_unparseable_response_is_an_error_and_not_remembered() {
        let model = ScriptedModel::new(&["I would rather not say"]);
        let mut decider = ModelDecider::new("llm", model);
        let state = AgentState::new("llm", dec!(1000));

        let err = decider
            .decide(&DecisionContext::new(&state, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::Parse(ParseError::NoJson)));
        assert!(decider.history().is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_is_an_error() {
        let model = ScriptedModel::new(&[]);
        let mut decider = ModelDecider::new("llm", model);
        let state = AgentState::new("llm", dec!(1000));

        let err = decider
            .decide(&DecisionContext::new(&state, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::Model(ModelError::EmptyResponse)));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut decider = ModelDecider::new("llm", ScriptedModel::new(&[]));
        for i in 0..(HISTORY_LIMIT + 5) {
            decider.remember(format!("r{i}"));
        }
        assert_eq!(decider.history().len(), HISTORY_LIMIT);
        assert_eq!(decider.history()[0], "r5");
    }
}
