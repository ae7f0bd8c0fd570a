use crate::domain::LinkingMetadata;
use crate::domain::linking_metadata::{ENTITY_GUID, ENTITY_NAME, HOSTNAME, SPAN_ID, TRACE_ID};

/// Formats the inline linking blob appended to messages:
/// ` NR-LINKING|{entity.guid}|{hostname}|{trace.id}|{span.id}|{entity.name}|`
///
/// Missing values become empty strings. The entity name is URI-component
/// encoded.
pub fn format_linking_metadata(metadata: &LinkingMetadata) -> String {
    format!(
        " NR-LINKING|{}|{}|{}|{}|{}|",
        metadata.value_or_empty(ENTITY_GUID),
        metadata.value_or_empty(HOSTNAME),
        metadata.value_or_empty(TRACE_ID),
        metadata.value_or_empty(SPAN_ID),
        encode_uri_component(metadata.value_or_empty(ENTITY_NAME)),
    )
}

/// Percent-encodes like `encodeURIComponent`: unreserved characters plus
/// `!'()*` stay literal.
fn encode_uri_component(input: &str) -> String {
    let encoded = urlencoding::encode(input);
    if !encoded.contains('%') {
        return encoded.into_owned();
    }

    encoded
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_blob() {
        let metadata = LinkingMetadata::new()
            .with(ENTITY_GUID, "g1")
            .with(HOSTNAME, "h1")
            .with(TRACE_ID, "t1")
            .with(SPAN_ID, "s1")
            .with(ENTITY_NAME, "my app");

        assert_eq!(
            format_linking_metadata(&metadata),
            " NR-LINKING|g1|h1|t1|s1|my%20app|"
        );
    }

    #[test]
    fn test_missing_values_are_empty() {
        let metadata = LinkingMetadata::new().with(ENTITY_NAME, "app");
        assert_eq!(format_linking_metadata(&metadata), " NR-LINKING|||||app|");
        assert_eq!(
            format_linking_metadata(&LinkingMetadata::new()),
            " NR-LINKING||||||"
        );
    }

    #[test]
    fn test_encoding_matches_uri_component_rules() {
        assert_eq!(encode_uri_component("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(encode_uri_component("it's (ok)!*"), "it's%20(ok)!*");
        assert_eq!(encode_uri_component("a/b|c"), "a%2Fb%7Cc");
        assert_eq!(encode_uri_component("café"), "caf%C3%A9");
    }
}
