use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Domain log level representing the severity of a log record.
///
/// Host libraries report levels either as labels (`"info"`) or as numbers
/// (`30`); the numeric scale is the one used by hook-based JSON loggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    pub fn number(&self) -> u64 {
        match self {
            LogLevel::Trace => 10,
            LogLevel::Debug => 20,
            LogLevel::Info => 30,
            LogLevel::Warn => 40,
            LogLevel::Error => 50,
            LogLevel::Fatal => 60,
        }
    }

    pub fn from_number(number: u64) -> Option<Self> {
        match number {
            10 => Some(LogLevel::Trace),
            20 => Some(LogLevel::Debug),
            30 => Some(LogLevel::Info),
            40 => Some(LogLevel::Warn),
            50 => Some(LogLevel::Error),
            60 => Some(LogLevel::Fatal),
            _ => None,
        }
    }

    /// Metric label for a raw `level` field value.
    ///
    /// Strings are used verbatim, known numbers map to their label and
    /// anything else is rendered as-is. A missing level yields `"unknown"`.
    pub fn label_of(level: Option<&Value>) -> String {
        match level {
            Some(Value::String(label)) => label.clone(),
            Some(Value::Number(number)) => number
                .as_u64()
                .and_then(LogLevel::from_number)
                .map(|level| level.as_str().to_string())
                .unwrap_or_else(|| number.to_string()),
            Some(other) => other.to_string(),
            None => "unknown".to_string(),
        }
    }
}

impl From<&tracing::Level> for LogLevel {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => LogLevel::Error,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::TRACE => LogLevel::Trace,
        }
    }
}
