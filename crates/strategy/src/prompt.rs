//! Prompt construction for model-driven decisions

use hermes_core::{AgentState, Symbol};
use std::fmt::Write;

/// Previous responses included in each prompt
pub const HISTORY_LIMIT: usize = 50;

/// Used when no system prompt file is configured
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an autonomous equity trader managing a paper-trading account.
Each turn you receive your account, holdings and the symbols you may trade.
Respond with exactly one JSON object:
{\"action\": \"BUY\" | \"SELL\" | \"NONE\", \"symbol\": \"TICKER\", \
\"amount\": <USD to spend, BUY only>, \"quantity\": <shares, SELL only>, \
\"reasoning\": \"short explanation\"}
Never spend more than your buying power and never sell more shares than you hold.";

/// Build the per-decision user prompt
pub fn user_prompt(
    state: &AgentState,
    symbols: &[Symbol],
    history: &[String],
) -> Result<String, serde_json::Error> {
    let account_json = serde_json::to_string_pretty(&state.account)?;

    Ok(format!(
        "Analyze the current market context and your portfolio to make a trading decision.

---
**Current Portfolio State:**

**Account Summary:**
{account}

**Current Holdings:**
{holdings}
---
**Decision Parameters:**
- Available buying power: {buying_power} USD
- Current total portfolio value: {portfolio_value} USD
- List of your previous trades: {previous}
- List of tradable symbols: {symbols}
- Last trade error: {last_error}
---
**Based on the above information and your directives, generate a single JSON object representing your optimal trading decision or no action.**",
        account = account_json,
        holdings = holdings_listing(state),
        buying_power = state.account.buying_power,
        portfolio_value = state.account.portfolio_value,
        previous = recent_history(history),
        symbols = symbols.join(", "),
        last_error = state.last_error.as_deref().unwrap_or("None"),
    ))
}

/// Numbered holdings, one block per position
fn holdings_listing(state: &AgentState) -> String {
    let mut out = String::new();
    for (i, position) in state.holdings().enumerate() {
        let _ = writeln!(out, "{}. Symbol: {}", i + 1, position.symbol());
        let _ = writeln!(out, "Quantity: {}", position.quantity());
        let _ = writeln!(out, "Market Value: {}", position.market_value());
        let _ = writeln!(out, "Current Price: {}", position.price());
        out.push('\n');
    }
    out
}

fn recent_history(history: &[String]) -> String {
    let start = history.len().saturating_sub(HISTORY_LIMIT);
    history[start..].join("\n")
}
