//! Error types for the context propagation subsystem.

use thiserror::Error;

/// Context-related errors
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("context stack is empty")]
    EmptyStack,

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for ContextError {
    fn from(err: config::ConfigError) -> Self {
        ContextError::Config(err.to_string())
    }
}
