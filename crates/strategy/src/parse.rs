//! Extracting a trade decision from free-form model output

use hermes_core::{Amount, Quantity, Trade, TradeAction};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ParseError;
use crate::strategy::Decision;

const FENCE: &str = "```";

/// Decision as emitted by the model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TradeDecision {
    pub action: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl TradeDecision {
    /// Turn into a runtime decision for `agent`
    ///
    /// BUY keeps only the amount and SELL only the quantity; sizes are not
    /// checked here, the runtime validates them against live state.
    pub fn into_decision(self, agent: &str) -> Result<Decision, ParseError> {
        let action: TradeAction = self
            .action
            .parse()
            .map_err(|_| ParseError::UnknownAction(self.action.clone()))?;

        let mut trade = match action {
            TradeAction::Hold => {
                return Ok(Decision::Hold {
                    rationale: self.reasoning,
                });
            }
            TradeAction::Buy => {
                let mut trade = Trade::buy(agent, self.symbol, Amount::ZERO);
                trade.amount = self.amount;
                trade
            }
            TradeAction::Sell => {
                let mut trade = Trade::sell(agent, self.symbol, Quantity::ZERO);
                trade.quantity = self.quantity;
                trade
            }
        };
        trade.rationale = self.reasoning;
        Ok(Decision::Trade(trade))
    }
}

/// Find and decode the decision in a model response
///
/// A fenced code block is preferred; if it is missing or does not decode, the
/// first balanced JSON object in the text is used instead.
pub fn parse_decision(text: &str) -> Result<TradeDecision, ParseError> {
    if let Some(block) = code_fence(text) {
        if let Ok(decision) = decode(block.trim()) {
            return Ok(decision);
        }
    }
    decode(first_json_object(text)?.trim())
}

/// Contents of the first ``` block, skipping a language tag line
fn code_fence(text: &str) -> Option<&str> {
    let start = text.find(FENCE)?;
    let mut rest = &text[start + FENCE.len()..];
    if let Some(newline) = rest.find('\n') {
        let first = &rest[..newline];
        if !first.is_empty() && !first.contains('{') {
            rest = &rest[newline + 1..];
        }
    }
    let end = rest.find(FENCE)?;
    Some(&rest[..end])
}

/// First top-level `{...}`, ignoring braces inside string literals
fn first_json_object(text: &str) -> Result<&str, ParseError> {
    let text = text.trim();
    let start = text.find('{').ok_or(ParseError::NoJson)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    Err(ParseError::Unterminated)
}

/// Decode JSON, unwrapping an optional `trade_decision` envelope
fn decode(json: &str) -> Result<TradeDecision, ParseError> {
    let mut value: Value =
        serde_json::from_str(json).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    if let Some(inner) = value.get_mut("trade_decision") {
        value = inner.take();
    }
    let mut decision: TradeDecision =
        serde_json::from_value(value).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    decision.action = decision.action.trim().to_uppercase();
    Ok(decision)
}
