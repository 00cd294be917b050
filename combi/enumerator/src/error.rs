use std::io;

use thiserror::Error;

/// Errors surfaced while configuring or running an enumeration.
#[derive(Debug, Error)]
pub enum EnumerationError {
    /// Entry-point validation rejected the parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The emission target failed; enumeration stops at the failing combination.
    #[error("sink failure: {0}")]
    Sink(#[from] io::Error),
    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
    /// The run log could not be opened or written.
    #[error("telemetry failure: {0}")]
    Telemetry(String),
}
