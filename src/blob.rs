// JSON blob encoding for a whole record collection

use crate::error::ImportError;
use crate::record::{Collection, Record};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Decode a stored collection, degrading to whatever is readable
///
/// Blank or unparseable text, or a top-level value that is not an array,
/// yields an empty collection. Elements that don't deserialize to `T` are
/// kept as unreadable entries so a later write preserves them. Both cases
/// are logged, never returned as errors.
pub fn decode_collection<T: Record>(text: &str, origin: &str) -> Collection<T> {
    if text.trim().is_empty() {
        return Collection::new();
    }

    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!(origin, error = %e, "Stored collection is not valid JSON, treating as empty");
            return Collection::new();
        }
    };

    let Value::Array(elements) = value else {
        warn!(origin, "Stored collection is not a JSON array, treating as empty");
        return Collection::new();
    };

    let mut collection = Collection::new();
    for (index, element) in elements.into_iter().enumerate() {
        match T::deserialize(&element) {
            Ok(record) => collection.push(record),
            Err(e) => {
                warn!(origin, index, error = %e, "Failed to parse stored record, keeping it as is");
                collection.push_unreadable(element);
            }
        }
    }

    debug!(
        origin,
        count = collection.len(),
        unreadable = collection.unreadable_count(),
        "Decoded collection"
    );
    collection
}

/// Encode elements as pretty-printed JSON (2-space indentation)
pub fn encode_collection<T: Serialize>(elements: &[T]) -> Result<String> {
    serde_json::to_string_pretty(elements).context("Failed to serialize collection")
}

/// Parse an import payload down to its array elements
///
/// Fails before anything is merged if the text is not JSON or not an array.
pub fn parse_import(text: &str) -> std::result::Result<Vec<Value>, ImportError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(elements) => Ok(elements),
        _ => Err(ImportError::NotAnArray),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{NewPattern, Pattern};

    fn decode(text: &str) -> Collection<Pattern> {
        decode_collection(text, "test")
    }

    #[test]
    fn test_decode_blank_and_corrupt() {
        assert!(decode("").is_empty());
        assert!(decode("   \n").is_empty());
        assert!(decode("{malformed json}").is_empty());
        assert!(decode(r#"{"id":"p1"}"#).is_empty());
    }

    #[test]
    fn test_decode_keeps_malformed_elements_unread() {
        let text = r#"[
            {"id":"p1","title":"Valid"},
            {"title":"No id"},
            {"id":"p2","title":"Bad tool","tool":"emacs"},
            {"id":"p3","title":"Also valid"}
        ]"#;

        let collection = decode(text);
        assert_eq!(collection.len(), 4);
        assert_eq!(collection.unreadable_count(), 2);

        let ids: Vec<&str> = collection.records().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[test]
    fn test_encode_writes_unreadable_elements_back() {
        let text = r#"[{"id":"keep","tool":"windsurf"},{"id":"b"}]"#;
        let mut collection = decode(text);
        assert!(collection.remove("b"));

        let written = encode_collection(collection.entries()).unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value, serde_json::json!([{"id": "keep", "tool": "windsurf"}]));
    }

    #[test]
    fn test_encode_is_pretty_printed() {
        let pattern = NewPattern::new("Test").into_pattern(1000);
        let text = encode_collection(&[pattern]).unwrap();

        assert!(text.starts_with("[\n  {\n    \"id\": "));
        let back = decode(&text).into_records();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].title, "Test");
    }

    #[test]
    fn test_parse_import() {
        assert_eq!(parse_import("[]").unwrap().len(), 0);
        assert_eq!(parse_import(r#"[{"id":"a"},{"id":"b"}]"#).unwrap().len(), 2);
        assert!(matches!(parse_import(r#"{"not":"an array"}"#), Err(ImportError::NotAnArray)));
        assert!(matches!(parse_import("not json at all"), Err(ImportError::InvalidJson(_))));
    }
}
