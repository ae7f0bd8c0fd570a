//! Domain layer for log-enricher.
//!
//! Contains the canonical types shared across all modules:
//! - `LogRecord`: One emitted log line as a mutable field map
//! - `ErrorValue`: The error attached to an exception record
//! - `LinkingMetadata`: Entity/host/trace identifiers supplied by the agent
//! - `LogLevel`: Severity labels used for line metrics
//! - `EnricherError`: Top-level error type

pub mod error;
pub mod error_value;
pub mod linking_metadata;
pub mod log_level;
pub mod log_record;

pub use error::EnricherError;
pub use error_value::ErrorValue;
pub use linking_metadata::LinkingMetadata;
pub use log_level::LogLevel;
pub use log_record::LogRecord;
