use crate::agent::MetricRegistry;
use crate::domain::LogLevel;
use serde_json::Value;

pub const LOGGING_LINES: &str = "Logging/lines";
pub const FORMAT_CHAIN_ENRICHER: &str = "Supportability/ExternalModules/WinstonLogEnricher";
pub const FORMAT_CHAIN_APPLICATION_LOGGING: &str =
    "Supportability/Logging/Rust/format-chain/enabled";
pub const HOOKS_ENRICHER: &str = "Supportability/ExternalModules/PinoLogEnricher";

pub fn logging_lines_for(level_label: &str) -> String {
    format!("{LOGGING_LINES}/{level_label}")
}

/// Increments `Logging/lines` and `Logging/lines/{level}`.
pub fn increment_logging_lines(metrics: &dyn MetricRegistry, level: Option<&Value>) {
    increment_logging_lines_for_label(metrics, &LogLevel::label_of(level));
}

pub fn increment_logging_lines_for_label(metrics: &dyn MetricRegistry, label: &str) {
    metrics.get_or_create_metric(LOGGING_LINES).increment_call_count();
    metrics
        .get_or_create_metric(&logging_lines_for(label))
        .increment_call_count();
}
