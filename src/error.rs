//! Top-level error type for agent operations
//!
//! Every layer defines its own error enum; this type exists so the binary
//! and the composition root can propagate any of them with `?`.

use thiserror::Error;

/// Main error type for monitoring agent operations
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Input error: {0}")]
    Input(#[from] crate::input::InputError),

    #[error("Transport error: {0}")]
    Transport(#[from] crate::transport::mqtt::MqttError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for agent operations
pub type AgentResult<T> = Result<T, AgentError>;
