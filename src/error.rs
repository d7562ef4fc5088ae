//! Error taxonomy shared by the signal pipeline, the exchange client and the
//! trading loop.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Insufficient data: need at least {needed} prices, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Order execution failed: {0}")]
    OrderExecution(String),

    #[error("Balance unavailable: {0}")]
    Balance(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse failure classification recorded per instrument and used as a
/// metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Parse,
    Transport,
    InsufficientData,
    OrderExecution,
    Balance,
    Config,
    Io,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Parse => "parse",
            FailureKind::Transport => "transport",
            FailureKind::InsufficientData => "insufficient_data",
            FailureKind::OrderExecution => "order_execution",
            FailureKind::Balance => "balance",
            FailureKind::Config => "config",
            FailureKind::Io => "io",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BotError {
    pub fn kind(&self) -> FailureKind {
        match self {
            BotError::Parse(_) => FailureKind::Parse,
            // Non-success responses on fetches are transport-level failures
            BotError::Transport(_) | BotError::Api { .. } => FailureKind::Transport,
            BotError::InsufficientData { .. } => FailureKind::InsufficientData,
            BotError::OrderExecution(_) => FailureKind::OrderExecution,
            BotError::Balance(_) => FailureKind::Balance,
            BotError::Config(_) => FailureKind::Config,
            BotError::Io(_) => FailureKind::Io,
        }
    }

    /// Re-tag any failure raised while submitting an order.
    pub fn into_order_failure(self) -> Self {
        match self {
            BotError::OrderExecution(_) => self,
            other => BotError::OrderExecution(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BotError::Parse(format!("Malformed response: {}", err))
        } else if err.is_timeout() {
            BotError::Transport(format!("Request timed out: {}", err))
        } else {
            BotError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::Parse(format!("JSON parse error: {}", err))
    }
}

impl From<chrono::ParseError> for BotError {
    fn from(err: chrono::ParseError) -> Self {
        BotError::Parse(format!("Timestamp parse error: {}", err))
    }
}

pub type BotResult<T> = std::result::Result<T, BotError>;
