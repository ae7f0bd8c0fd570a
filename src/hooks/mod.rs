//! Hook-based integration.
//!
//! Structured JSON loggers of this kind expose a handful of extension
//! points instead of a format chain: a mixin that contributes extra fields,
//! a timestamp fragment, a per-record object formatter and a wrapper around
//! the log method. `EnricherHooks` implements each of them;
//! `EnrichmentLayer` plugs them into `tracing`.

pub mod layer;

pub use layer::EnrichmentLayer;

use crate::agent::Agent;
use crate::domain::ErrorValue;
use crate::domain::log_record::MESSAGE;
use crate::enricher::metrics::{self, increment_logging_lines_for_label};
use crate::enricher::{Clock, ErrorFields, system_clock};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Key the hooked logger reads errors from.
pub const ERR_KEY: &str = "err";

pub struct EnricherHooks {
    agent: Arc<dyn Agent>,
    clock: Clock,
}

/// Hooks for an active agent; `None` for the stub, in which case the host
/// keeps its own defaults.
pub fn create_hooks(agent: Arc<dyn Agent>) -> Option<EnricherHooks> {
    agent.shim()?;

    agent
        .metrics()
        .get_or_create_metric(metrics::HOOKS_ENRICHER)
        .increment_call_count();

    Some(EnricherHooks {
        agent,
        clock: system_clock(),
    })
}

impl EnricherHooks {
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn agent(&self) -> &Arc<dyn Agent> {
        &self.agent
    }

    pub fn message_key(&self) -> &'static str {
        MESSAGE
    }

    /// Literal JSON fragment spliced into the line after the level.
    pub fn timestamp(&self) -> String {
        format!(r#","timestamp": "{}""#, (self.clock)())
    }

    /// Extra fields merged into every line.
    pub fn mixin(&self) -> Map<String, Value> {
        self.agent
            .linking_metadata(true)
            .iter()
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect()
    }

    /// Replaces an `err` object with flat `error.*` fields.
    pub fn format_log(&self, mut obj: Map<String, Value>) -> Map<String, Value> {
        let Some(err) = obj.remove(ERR_KEY) else {
            return obj;
        };
        if err.is_null() {
            return obj;
        }

        let error = ErrorValue::from_value(err);
        let fallback = obj.get(MESSAGE).and_then(Value::as_str).map(str::to_string);
        ErrorFields::extract(Some(&error), fallback.as_deref()).write_to(&mut obj);
        obj
    }

    /// Counts the line when line metrics are enabled, then always calls
    /// through to the original log method.
    pub fn log_method<R>(&self, level_label: &str, call_through: impl FnOnce() -> R) -> R {
        if self.agent.config().read(|config| config.is_metrics_enabled()) {
            increment_logging_lines_for_label(self.agent.metrics(), level_label);
        }
        call_through()
    }
}
