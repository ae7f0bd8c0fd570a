use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity of the enricher's own diagnostics on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl DiagnosticLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warn => "warn",
            DiagnosticLevel::Info => "info",
            DiagnosticLevel::Debug => "debug",
            DiagnosticLevel::Trace => "trace",
        }
    }
}

impl From<DiagnosticLevel> for tracing::Level {
    fn from(level: DiagnosticLevel) -> Self {
        match level {
            DiagnosticLevel::Error => tracing::Level::ERROR,
            DiagnosticLevel::Warn => tracing::Level::WARN,
            DiagnosticLevel::Info => tracing::Level::INFO,
            DiagnosticLevel::Debug => tracing::Level::DEBUG,
            DiagnosticLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "log-enricher", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Configuration file path (optional)
    #[arg(long, env = "LOG_ENRICHER_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// NDJSON input file (stdin when omitted)
    #[arg(long, env = "LOG_ENRICHER_INPUT")]
    pub input: Option<PathBuf>,

    /// Where harvested forwarded records are written as NDJSON
    #[arg(long, env = "LOG_ENRICHER_FORWARD_OUTPUT")]
    pub forward_output: Option<PathBuf>,

    /// Diagnostic log level
    #[arg(long, env = "LOG_ENRICHER_LOG_LEVEL", default_value = "info")]
    pub log_level: DiagnosticLevel,

    /// Render each output record as indented JSON
    #[arg(long)]
    pub pretty: bool,
}

impl CliArgs {
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }
}
