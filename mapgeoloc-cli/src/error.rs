//! CLI error type.

use mapgeoloc::{ConfigError, GeolocationError, ReplayError};
use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(std::io::Error),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::ConfigFile(_) => 2,
            CliError::Replay(_) => 3,
            _ => 1,
        }
    }
}
