//! Flat JSON codec: an array of string-valued objects, one per record.
//!
//! Output uses 4-space indentation and the record's own field order; the
//! decoder expects exactly the flat array shape. The richer catalog shape
//! consumed by the report renderer lives in [`crate::report`], not here.

use crate::error::ConvertError;
use crate::record::CanonicalRecord;
use serde::Serialize;
use std::io;

pub fn to_json(records: &[CanonicalRecord]) -> Result<String, ConvertError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    String::from_utf8(buf)
        .map_err(|err| ConvertError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

pub fn from_json(text: &str) -> Result<Vec<CanonicalRecord>, ConvertError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CanonicalRecord {
        let mut record = CanonicalRecord {
            date: "20240101".to_string(),
            host_name: "web01".to_string(),
            host_ip: "10.0.0.5".to_string(),
            vuln_num: "V-1001".to_string(),
            severity: "high".to_string(),
            rule_id: "SV-1".to_string(),
            status: "Open".to_string(),
            finding_details: "none".to_string(),
            ..Default::default()
        };
        record.stamp_unique_id();
        record
    }

    #[test]
    fn round_trip_is_field_for_field_identical() {
        let records = vec![sample()];
        let text = to_json(&records).unwrap();
        let back = from_json(&text).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn output_uses_four_space_indent_and_field_order() {
        let text = to_json(&[sample()]).unwrap();
        assert!(text.starts_with("[\n    {\n        \"DATE\": \"20240101\","));
        // DATE must come first and Unique_ID last, not alphabetical order.
        let date_at = text.find("\"DATE\"").unwrap();
        let host_at = text.find("\"HOST_NAME\"").unwrap();
        let unique_at = text.find("\"Unique_ID\"").unwrap();
        assert!(date_at < host_at && host_at < unique_at);
    }

    #[test]
    fn empty_batch_is_an_empty_array() {
        assert_eq!(to_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn decoder_rejects_non_array_input() {
        assert!(from_json("{\"DATE\": \"20240101\"}").is_err());
        assert!(from_json("42").is_err());
    }

    #[test]
    fn decoder_rejects_nested_structures() {
        let text = r#"[{"DATE": "20240101", "nested": {"a": 1}}]"#;
        assert!(from_json(text).is_err());
    }
}
