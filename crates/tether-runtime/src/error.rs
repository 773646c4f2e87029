//! Runtime error types.

use tether_core::TetherError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while starting or driving the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tether(#[from] TetherError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
