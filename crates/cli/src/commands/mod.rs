//! CLI command implementations.

pub mod cart;
pub mod watch;

use storefront_cart::{CartError, ConfigError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A cart operation was rejected.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A file did not contain valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
