use serde_json::{Map, Value};
use std::error::Error as StdError;

/// Error attached to an exception record.
///
/// Host libraries hand over whatever the application logged: sometimes a
/// real error with a name, message and stack, sometimes a bare string or an
/// empty object. The `Malformed` arm keeps the raw value so that it can be
/// written back out untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorValue {
    Proper {
        name: String,
        message: String,
        stack: Option<String>,
        constructor_name: String,
    },
    Malformed {
        raw: Value,
    },
}

impl ErrorValue {
    /// Captures a concrete error type; its type name stands in for the
    /// constructor name.
    pub fn capture<E>(err: &E) -> Self
    where
        E: StdError + 'static,
    {
        let type_name = std::any::type_name::<E>();
        let constructor_name = type_name
            .rsplit("::")
            .next()
            .unwrap_or(type_name)
            .to_string();

        Self::Proper {
            name: "Error".to_string(),
            message: err.to_string(),
            stack: Some(source_chain(err)),
            constructor_name,
        }
    }

    /// Captures an error known only as a trait object, as handed over by
    /// `tracing::field::Visit::record_error`.
    pub fn from_dyn(err: &(dyn StdError + 'static)) -> Self {
        Self::Proper {
            name: "Error".to_string(),
            message: err.to_string(),
            stack: Some(source_chain(err)),
            constructor_name: "Error".to_string(),
        }
    }

    /// Interprets a JSON value found under a record's `error` key.
    ///
    /// An object carrying at least one of `name`, `message` or `stack` is a
    /// proper error. `constructor` (or `constructor_name`) supplies the
    /// concrete class name and defaults to `name`.
    pub fn from_value(value: Value) -> Self {
        let obj = match value {
            Value::Object(obj) => obj,
            other => return Self::Malformed { raw: other },
        };

        let name = string_field(&obj, "name");
        let message = string_field(&obj, "message");
        let stack = string_field(&obj, "stack");

        if name.is_none() && message.is_none() && stack.is_none() {
            return Self::Malformed {
                raw: Value::Object(obj),
            };
        }

        let name = name.unwrap_or_else(|| "Error".to_string());
        let constructor_name = string_field(&obj, "constructor")
            .or_else(|| string_field(&obj, "constructor_name"))
            .unwrap_or_else(|| name.clone());

        Self::Proper {
            name,
            message: message.unwrap_or_default(),
            stack,
            constructor_name,
        }
    }

    /// The error's own message, if it has a non-empty one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Proper { message, .. } if !message.is_empty() => Some(message.as_str()),
            _ => None,
        }
    }

    /// Class name reported for the error.
    ///
    /// A declared name of exactly `"Error"` is replaced by the constructor
    /// name, which recovers the subclass name lost by generic errors.
    pub fn class(&self) -> Option<&str> {
        match self {
            Self::Proper {
                name,
                constructor_name,
                ..
            } => {
                if name == "Error" {
                    Some(constructor_name.as_str())
                } else {
                    Some(name.as_str())
                }
            }
            Self::Malformed { .. } => None,
        }
    }

    pub fn stack(&self) -> Option<&str> {
        match self {
            Self::Proper { stack, .. } => stack.as_deref(),
            Self::Malformed { .. } => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Proper {
                name,
                message,
                stack,
                constructor_name,
            } => {
                let mut obj = Map::new();
                obj.insert("name".to_string(), Value::String(name.clone()));
                obj.insert("message".to_string(), Value::String(message.clone()));
                if let Some(stack) = stack {
                    obj.insert("stack".to_string(), Value::String(stack.clone()));
                }
                obj.insert(
                    "constructor".to_string(),
                    Value::String(constructor_name.clone()),
                );
                Value::Object(obj)
            }
            Self::Malformed { raw } => raw.clone(),
        }
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn source_chain(err: &(dyn StdError + 'static)) -> String {
    let mut chain = format!("Error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str("\n    caused by: ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use thiserror::Error;

    #[derive(Error, Debug)]
    #[error("disk full")]
    struct DiskFullError;

    #[derive(Error, Debug)]
    #[error("write failed")]
    struct WriteError(#[source] DiskFullError);

    #[test]
    fn test_class_uses_constructor_name_for_generic_error() {
        let err = ErrorValue::from_value(json!({
            "name": "Error",
            "message": "boom",
            "stack": "E: boom\n at f()",
            "constructor": "TestError"
        }));
        assert_eq!(err.class(), Some("TestError"));
        assert_eq!(err.message(), Some("boom"));
        assert_eq!(err.stack(), Some("E: boom\n at f()"));
    }

    #[test]
    fn test_class_uses_declared_name_otherwise() {
        let err = ErrorValue::from_value(json!({
            "name": "TypeError",
            "message": "bad type",
            "constructor": "Error"
        }));
        assert_eq!(err.class(), Some("TypeError"));
    }

    #[test]
    fn test_string_and_empty_object_are_malformed() {
        let err = ErrorValue::from_value(json!("just a string"));
        assert!(matches!(err, ErrorValue::Malformed { .. }));
        assert_eq!(err.message(), None);
        assert_eq!(err.class(), None);
        assert_eq!(err.to_value(), json!("just a string"));

        let err = ErrorValue::from_value(json!({}));
        assert!(matches!(err, ErrorValue::Malformed { .. }));
    }

    #[test]
    fn test_empty_message_is_treated_as_missing() {
        let err = ErrorValue::from_value(json!({"name": "Error", "message": ""}));
        assert_eq!(err.message(), None);
    }

    #[test]
    fn test_capture_records_type_name_and_source_chain() {
        let err = ErrorValue::capture(&WriteError(DiskFullError));
        assert_eq!(err.class(), Some("WriteError"));
        assert_eq!(err.message(), Some("write failed"));
        assert_eq!(
            err.stack(),
            Some("Error: write failed\n    caused by: disk full")
        );
    }

    #[test]
    fn test_from_dyn_keeps_generic_class() {
        let err = WriteError(DiskFullError);
        let value = ErrorValue::from_dyn(&err);
        assert_eq!(value.class(), Some("Error"));
    }
}
