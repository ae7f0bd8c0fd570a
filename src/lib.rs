#![deny(rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Counts stay well within u64
    clippy::missing_errors_doc,       // Internal API
    clippy::missing_panics_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. EnrichmentMode in enricher module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

pub mod agent;
pub mod app;
pub mod domain;
pub mod enricher;
pub mod format;
pub mod hooks;

// Re-export main types for easy access
pub use agent::{Agent, LocalAgent, StubAgent};
pub use app::{App, EnrichmentConfig};
pub use domain::{EnricherError, ErrorValue, LinkingMetadata, LogRecord};
pub use enricher::{EnrichmentMode, LogEnricher};
pub use format::{Format, create_formatter};
pub use hooks::{EnricherHooks, EnrichmentLayer, create_hooks};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
