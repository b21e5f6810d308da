//! JSON serialization helpers for deterministic output.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes a value to deterministic, pretty-printed JSON with a trailing
/// newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assay_domain::testing::SuiteReport;
    use std::time::Duration;

    #[test]
    fn test_trailing_newline_and_indent() {
        let report = SuiteReport::new("Empty", Vec::new(), Duration::from_nanos(42));
        let json = to_json_stable(&report).expect("serialization should work");

        assert!(json.ends_with("}\n"));
        assert!(json.contains("\n  \"suite_name\": \"Empty\""));
        assert!(json.contains("\"duration\": 42"));
    }

    #[test]
    fn test_report_fields_keep_declaration_order() {
        let report = SuiteReport::new("Order", Vec::new(), Duration::ZERO);
        let json = to_json_stable(&report).expect("serialization should work");

        let name = json.find("suite_name").expect("suite_name present");
        let total = json.find("total_tests").expect("total_tests present");
        let results = json.find("results").expect("results present");
        assert!(name < total);
        assert!(total < results);
    }
}
