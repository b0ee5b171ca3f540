//! Broker errors

use hermes_ports::GatewayError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    #[error("order placement failed: {0}")]
    Placement(#[from] GatewayError),

    #[error("broker shut down before the trade was placed")]
    ShuttingDown,

    #[error("processing loop already started")]
    AlreadyRunning,
}

pub type Result<T> = std::result::Result<T, BrokerError>;
