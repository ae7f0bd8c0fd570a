use super::cli::DiagnosticLevel;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::OnceLock;
use thiserror::Error;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log directive '{directive}': {details}")]
    InvalidDirective { directive: String, details: String },
    #[error("Logging initialization failed: {0}")]
    InitFailed(String),
}

/// Diagnostics for the enricher itself. Output goes to stderr; stdout
/// carries the enriched stream.
pub struct LoggingSystem {
    directives: Arc<RwLock<Vec<String>>>,
}

impl LoggingSystem {
    pub fn new() -> Self {
        Self {
            directives: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Adds a `target=level` directive. Malformed directives are skipped
    /// with a warning on stderr.
    pub fn add_directive(&self, directive: &str) -> Result<(), LoggingError> {
        let directive = directive.trim();
        if directive.is_empty() || !directive.contains('=') {
            eprintln!("Warning: skipping log directive '{directive}'");
            return Ok(());
        }

        directive
            .parse::<Directive>()
            .map_err(|e| LoggingError::InvalidDirective {
                directive: directive.to_string(),
                details: e.to_string(),
            })?;

        self.directives.write().push(directive.to_string());
        Ok(())
    }

    pub fn add_default_directives(&self) -> Result<(), LoggingError> {
        for directive in ["tokio=warn", "mio=warn"] {
            self.add_directive(directive)?;
        }
        Ok(())
    }

    pub fn build_filter_string(&self, default_level: DiagnosticLevel) -> String {
        let directives = self.directives.read();
        let mut parts = Vec::with_capacity(directives.len() + 1);
        parts.push(default_level.as_str().to_string());
        parts.extend(directives.iter().cloned());
        parts.join(",")
    }

    pub fn initialize_tracing(&self, default_level: DiagnosticLevel) -> Result<(), LoggingError> {
        let filter_string = self.build_filter_string(default_level);
        let env_filter = EnvFilter::try_new(&filter_string).map_err(|e| {
            LoggingError::InitFailed(format!("invalid filter '{filter_string}': {e}"))
        })?;

        let subscriber = tracing_subscriber::registry().with(env_filter).with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .compact(),
        );

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| LoggingError::InitFailed(e.to_string()))
    }

    pub fn directive_count(&self) -> usize {
        self.directives.read().len()
    }
}

impl Default for LoggingSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Installs the global subscriber once per process. Later calls return the
/// first call's outcome.
pub fn setup_logging(level: DiagnosticLevel) -> Result<(), LoggingError> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();

    let outcome = INIT.get_or_init(|| {
        let logging_system = LoggingSystem::new();
        logging_system
            .add_default_directives()
            .and_then(|()| logging_system.initialize_tracing(level))
            .map_err(|e| e.to_string())
    });

    outcome.clone().map_err(LoggingError::InitFailed)
}
