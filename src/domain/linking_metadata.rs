use serde::Serialize;
use std::collections::BTreeMap;

pub const ENTITY_NAME: &str = "entity.name";
pub const ENTITY_TYPE: &str = "entity.type";
pub const ENTITY_GUID: &str = "entity.guid";
pub const HOSTNAME: &str = "hostname";
pub const TRACE_ID: &str = "trace.id";
pub const SPAN_ID: &str = "span.id";

/// Identifiers that correlate a log line with the agent's entity and trace
/// data.
///
/// Produced by the agent for every record and never cached by the
/// enricher: `trace.id` and `span.id` are only present inside an active
/// trace, which changes from call to call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LinkingMetadata(BTreeMap<String, String>);

impl LinkingMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value for `key`, or the empty string when missing or empty.
    pub fn value_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for LinkingMetadata
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_or_empty() {
        let metadata = LinkingMetadata::new()
            .with(ENTITY_GUID, "g1")
            .with(HOSTNAME, "h1");

        assert_eq!(metadata.value_or_empty(ENTITY_GUID), "g1");
        assert_eq!(metadata.value_or_empty(TRACE_ID), "");
        assert_eq!(metadata.len(), 2);
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let metadata: LinkingMetadata = [(ENTITY_NAME, "app"), (ENTITY_TYPE, "SERVICE")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"entity.name":"app","entity.type":"SERVICE"}"#);
    }
}
