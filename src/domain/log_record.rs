use super::error_value::ErrorValue;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};

pub const MESSAGE: &str = "message";
pub const LEVEL: &str = "level";
pub const TIMESTAMP: &str = "timestamp";
pub const ORIGINAL_TIMESTAMP: &str = "original_timestamp";
pub const EXCEPTION: &str = "exception";
pub const ERROR: &str = "error";

/// One emitted log line.
///
/// A mutable mapping from field name to JSON value. The `error` entry stays
/// in the map exactly as the producer supplied it and is only interpreted
/// as an `ErrorValue` when read. `rendered` holds the final encoded line
/// once the host library's JSON formatter has run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogRecord {
    fields: Map<String, Value>,
    rendered: Option<String>,
}

impl LogRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            rendered: None,
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn with_error(mut self, error: ErrorValue) -> Self {
        self.set_error(error);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The `message` field when it is a string.
    pub fn message(&self) -> Option<&str> {
        self.fields.get(MESSAGE).and_then(Value::as_str)
    }

    pub fn level(&self) -> Option<&Value> {
        self.fields.get(LEVEL)
    }

    /// True when the record was produced for a captured exception.
    pub fn is_exception(&self) -> bool {
        matches!(self.fields.get(EXCEPTION), Some(Value::Bool(true)))
    }

    /// The `error` entry interpreted as an `ErrorValue`. The stored value
    /// is left untouched.
    pub fn error(&self) -> Option<ErrorValue> {
        self.fields
            .get(ERROR)
            .filter(|value| !value.is_null())
            .cloned()
            .map(ErrorValue::from_value)
    }

    pub fn set_error(&mut self, error: ErrorValue) {
        self.fields.insert(ERROR.to_string(), error.to_value());
    }

    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }

    pub fn set_rendered(&mut self, rendered: String) {
        self.rendered = Some(rendered);
    }
}

impl Serialize for LogRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LogRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::deserialize(deserializer)?;
        Ok(Self::from_map(fields))
    }
}
