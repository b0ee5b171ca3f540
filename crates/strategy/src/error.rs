//! Strategy errors

use thiserror::Error;

/// Failures talking to a language model
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("model returned no content")]
    EmptyResponse,

    #[error("API key environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Model output that does not contain a usable decision
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no JSON object found in response")]
    NoJson,

    #[error("unterminated JSON object")]
    Unterminated,

    #[error("invalid trade decision JSON: {0}")]
    InvalidJson(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),
}

/// Why a decision step produced nothing
#[derive(Error, Debug)]
pub enum DecisionError {
    #[error("language model call failed: {0}")]
    Model(#[from] ModelError),

    #[error("failed to parse trade decision: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to build prompt: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, DecisionError>;
