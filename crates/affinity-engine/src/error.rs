//! Error types for engine operations

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur inside the affinity engine
///
/// `compute_affinity` never returns these; they surface from configuration
/// loading, batch rescoring, and from `evaluate` as fallback reasons.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Repository read or write failed
    #[error("Repository error: {0}")]
    Repository(String),

    /// Repository call did not finish within the fetch timeout
    #[error("Repository call timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read a configuration file
    #[error("Failed to read config file: {0}")]
    ConfigFile(#[from] std::io::Error),

    /// Failed to parse a configuration file
    #[error("Failed to parse config TOML: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
