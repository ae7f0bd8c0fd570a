use crate::app::config::ConfigError;
use crate::app::logging_system::LoggingError;
use thiserror::Error;

/// Top-level error type for the integration layers around the enricher.
///
/// `LogEnricher::enrich` itself is infallible; these errors come from
/// configuration, argument parsing and I/O at the edges.
#[derive(Error, Debug)]
pub enum EnricherError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Argument error: {0}")]
    Cli(#[from] clap::Error),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
