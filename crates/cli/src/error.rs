// CLI error taxonomy; every variant ends the command with exit status 1

use hello_core::{ConfigError, EngineError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    /// Missing or invalid environment configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed arguments, rejected before any remote call
    #[error("invalid arguments: {0}")]
    Validation(String),

    /// Remote call failed
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Result could not be rendered
    #[error("failed to render output: {0}")]
    Output(String),
}
