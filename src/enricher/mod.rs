//! The log enrichment pipeline.
//!
//! `LogEnricher` runs once per emitted log line, on whatever thread the host
//! logging library formats on. Per record it:
//!
//! 1. normalizes exception records into `error.message`, `error.class` and
//!    `error.stack`, dropping the duplicate `trace`/`stack` fields;
//! 2. moves any producer timestamp to `original_timestamp` and stamps the
//!    current epoch milliseconds;
//! 3. merges fresh linking metadata;
//! 4. depending on the mode, appends the inline linking blob instead, or
//!    submits the enriched record to the agent's aggregator;
//! 5. counts the line in `Logging/lines` and `Logging/lines/{level}`.
//!
//! Nothing here can fail: missing metadata becomes empty strings and
//! malformed errors fall back to the record message.

pub mod decoration;
pub mod metrics;
pub mod mode;
pub mod truncate;

pub use decoration::format_linking_metadata;
pub use mode::EnrichmentMode;
pub use truncate::truncate;

use crate::agent::Agent;
use crate::domain::log_record::{MESSAGE, ORIGINAL_TIMESTAMP, TIMESTAMP};
use crate::domain::{ErrorValue, LogRecord};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const ERROR_MESSAGE: &str = "error.message";
pub const ERROR_CLASS: &str = "error.class";
pub const ERROR_STACK: &str = "error.stack";

/// Auxiliary fields that duplicate the captured stack.
const STACK_DUPLICATES: [&str; 2] = ["trace", "stack"];

static TIMESTAMP_OVERWRITE_TRACED: AtomicBool = AtomicBool::new(false);

/// Source of the current time in epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().timestamp_millis())
}

#[derive(Clone)]
pub struct LogEnricher {
    agent: Arc<dyn Agent>,
    clock: Clock,
}

impl LogEnricher {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self {
            agent,
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn agent(&self) -> &Arc<dyn Agent> {
        &self.agent
    }

    /// Mode for the next record under the current configuration.
    pub fn mode(&self) -> EnrichmentMode {
        EnrichmentMode::for_agent(self.agent.as_ref())
    }

    pub fn enrich(&self, record: LogRecord) -> LogRecord {
        let mode = self.mode();
        self.enrich_with_mode(record, mode)
    }

    pub fn enrich_with_mode(&self, mut record: LogRecord, mode: EnrichmentMode) -> LogRecord {
        let metrics_enabled = self.agent.is_active()
            && self.agent.config().read(|config| config.is_metrics_enabled());
        if metrics_enabled {
            metrics::increment_logging_lines(self.agent.metrics(), record.level());
        }

        match mode {
            EnrichmentMode::Disabled => {}
            EnrichmentMode::LogEnricher => self.reformat_log_line(&mut record),
            EnrichmentMode::LocalDecorating => self.decorate_message(&mut record),
            EnrichmentMode::Forwarding => {
                self.reformat_log_line(&mut record);
                if let Some(logs) = self.agent.logs() {
                    logs.add(record.clone(), self.agent.active_priority());
                }
            }
        }

        record
    }

    fn reformat_log_line(&self, record: &mut LogRecord) {
        if record.is_exception() {
            reformat_error(record);
        }

        self.reformat_timestamp(record);

        let metadata = self.agent.linking_metadata(true);
        for (key, value) in metadata.iter() {
            record.insert(key, value);
        }
    }

    fn reformat_timestamp(&self, record: &mut LogRecord) {
        match record.remove(TIMESTAMP) {
            Some(Value::Null) | None => {}
            Some(previous) => {
                if !TIMESTAMP_OVERWRITE_TRACED.swap(true, Ordering::Relaxed) {
                    tracing::trace!(
                        "Overwriting `timestamp` key; assigning original value to `original_timestamp`."
                    );
                }
                record.insert(ORIGINAL_TIMESTAMP, previous);
            }
        }
        record.insert(TIMESTAMP, (self.clock)());
    }

    fn decorate_message(&self, record: &mut LogRecord) {
        let metadata = self.agent.linking_metadata(true);
        let mut message = match record.get(MESSAGE) {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        message.push_str(&format_linking_metadata(&metadata));
        record.insert(MESSAGE, message);
    }
}

/// Flat, truncated view of an error for a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorFields {
    pub message: String,
    pub class: Option<String>,
    pub stack: Option<String>,
}

impl ErrorFields {
    /// The message falls back from the error's own message to
    /// `fallback_message`, then to the empty string.
    pub fn extract(error: Option<&ErrorValue>, fallback_message: Option<&str>) -> Self {
        let message = error
            .and_then(ErrorValue::message)
            .or_else(|| fallback_message.filter(|message| !message.is_empty()))
            .unwrap_or("");

        Self {
            message: truncate(message).into_owned(),
            class: error.and_then(ErrorValue::class).map(str::to_string),
            stack: error
                .and_then(ErrorValue::stack)
                .map(|stack| truncate(stack).into_owned()),
        }
    }

    pub fn write_to(self, fields: &mut Map<String, Value>) {
        fields.insert(ERROR_MESSAGE.to_string(), Value::String(self.message));
        if let Some(class) = self.class {
            fields.insert(ERROR_CLASS.to_string(), Value::String(class));
        }
        if let Some(stack) = self.stack {
            fields.insert(ERROR_STACK.to_string(), Value::String(stack));
        }
    }
}

/// Rewrites an exception record's error into flat, truncated fields.
fn reformat_error(record: &mut LogRecord) {
    let error = record.error();
    let error_fields = ErrorFields::extract(error.as_ref(), record.message());
    let message = match record.message().map(truncate) {
        Some(Cow::Owned(message)) => Some(message),
        _ => None,
    };

    error_fields.write_to(record.fields_mut());
    if let Some(message) = message {
        record.insert(MESSAGE, message);
    }

    for key in STACK_DUPLICATES {
        record.remove(key);
    }
}
