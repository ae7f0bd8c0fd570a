//! Format-chain integration.
//!
//! Host libraries of this kind pass each record through a chain of
//! composable `Format`s and finish with a JSON formatter that renders the
//! line. The enricher joins the chain as one more participant built by
//! `create_formatter`; it never patches the host's own formatters.

pub mod factory;

pub use factory::{EnrichingFormat, create_formatter, create_formatter_with_enricher};

use crate::domain::LogRecord;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Render multi-line, indented JSON.
    pub pretty: bool,
}

pub trait Format: Send + Sync {
    /// Transforms one record. `None` drops the record from the chain.
    fn transform(&self, record: LogRecord, opts: &FormatOptions) -> Option<LogRecord>;
}

/// Baseline formatter: renders the record as a JSON line.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Format for JsonFormat {
    fn transform(&self, mut record: LogRecord, opts: &FormatOptions) -> Option<LogRecord> {
        let rendered = if opts.pretty {
            serde_json::to_string_pretty(&record)
        } else {
            serde_json::to_string(&record)
        };

        match rendered {
            Ok(line) => record.set_rendered(line),
            Err(e) => tracing::warn!("Failed to render log record as JSON: {}", e),
        }
        Some(record)
    }
}

/// Applies formats in order, stopping at the first that drops the record.
#[derive(Clone, Default)]
pub struct Combine {
    formats: Vec<Arc<dyn Format>>,
}

impl Combine {
    pub fn new(formats: Vec<Arc<dyn Format>>) -> Self {
        Self { formats }
    }

    pub fn then(mut self, format: Arc<dyn Format>) -> Self {
        self.formats.push(format);
        self
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

impl Format for Combine {
    fn transform(&self, record: LogRecord, opts: &FormatOptions) -> Option<LogRecord> {
        self.formats
            .iter()
            .try_fold(record, |record, format| format.transform(record, opts))
    }
}

/// A `Format` from a closure.
pub struct FnFormat<F>(pub F);

impl<F> Format for FnFormat<F>
where
    F: Fn(LogRecord, &FormatOptions) -> Option<LogRecord> + Send + Sync,
{
    fn transform(&self, record: LogRecord, opts: &FormatOptions) -> Option<LogRecord> {
        (self.0)(record, opts)
    }
}

/// The host library as seen by the formatter factory.
pub trait FormatHost: Send + Sync {
    /// The baseline JSON formatter. Returns the same `Arc` on every call.
    fn json(&self) -> Arc<dyn Format>;

    /// Name of the logger-construction entry point the agent instruments.
    fn logger_entry_point(&self) -> &str;
}

pub const FORMAT_CHAIN_ENTRY_POINT: &str = "format_chain::create_logger";

/// Default host: a JSON baseline formatter shared by every caller.
#[derive(Clone)]
pub struct FormatChainHost {
    json: Arc<dyn Format>,
}

impl FormatChainHost {
    pub fn new() -> Self {
        Self {
            json: Arc::new(JsonFormat),
        }
    }
}

impl Default for FormatChainHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatHost for FormatChainHost {
    fn json(&self) -> Arc<dyn Format> {
        Arc::clone(&self.json)
    }

    fn logger_entry_point(&self) -> &str {
        FORMAT_CHAIN_ENTRY_POINT
    }
}
