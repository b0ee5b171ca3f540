mod account;
mod action;
mod agent_state;
mod position;
mod trade;

pub use account::AccountSnapshot;
pub use action::TradeAction;
pub use agent_state::{AgentState, AgentStats};
pub use position::Position;
pub use trade::{Trade, new_order_id};
