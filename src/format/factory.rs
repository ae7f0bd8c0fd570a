use super::{Format, FormatHost, FormatOptions};
use crate::agent::Agent;
use crate::domain::LogRecord;
use crate::enricher::{LogEnricher, metrics};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

static COLLISION_WARNED: AtomicBool = AtomicBool::new(false);

/// Enriches each record, then delegates rendering to the host's JSON
/// formatter.
pub struct EnrichingFormat {
    enricher: LogEnricher,
    json: Arc<dyn Format>,
}

impl EnrichingFormat {
    pub fn enricher(&self) -> &LogEnricher {
        &self.enricher
    }
}

impl Format for EnrichingFormat {
    fn transform(&self, record: LogRecord, opts: &FormatOptions) -> Option<LogRecord> {
        let record = self.enricher.enrich(record);
        self.json.transform(record, opts)
    }
}

/// Builds the formatter a host should install for this agent.
///
/// - Stub agent: the host's baseline JSON formatter, records untouched.
/// - Host logger already instrumented by the agent: application logging is
///   switched off for the rest of the process so later records take the
///   bare enricher path, and the baseline JSON formatter is returned.
/// - Otherwise: a new enriching formatter.
pub fn create_formatter(agent: Arc<dyn Agent>, host: &dyn FormatHost) -> Arc<dyn Format> {
    create_formatter_with_enricher(LogEnricher::new(agent), host)
}

pub fn create_formatter_with_enricher(
    enricher: LogEnricher,
    host: &dyn FormatHost,
) -> Arc<dyn Format> {
    let agent = Arc::clone(enricher.agent());

    let already_wrapped = match agent.shim() {
        None => return host.json(),
        Some(shim) => shim.is_wrapped(host.logger_entry_point()),
    };

    if already_wrapped {
        agent.config().disable_application_logging();
        if !COLLISION_WARNED.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                entry_point = host.logger_entry_point(),
                "Host logger is already instrumented. Disabling application logging and using package as log enricher."
            );
        }
        create_module_usage_metric(agent.as_ref());
        return host.json();
    }

    create_module_usage_metric(agent.as_ref());

    Arc::new(EnrichingFormat {
        enricher,
        json: host.json(),
    })
}

fn create_module_usage_metric(agent: &dyn Agent) {
    let name = if agent.config().read(|config| config.is_log_enricher()) {
        metrics::FORMAT_CHAIN_ENRICHER
    } else {
        metrics::FORMAT_CHAIN_APPLICATION_LOGGING
    };
    agent.metrics().get_or_create_metric(name).increment_call_count();
}
