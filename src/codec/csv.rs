//! Tabular codec.
//!
//! The header row is the fixed 14-column list from [`crate::record`], written
//! exactly once and always first, even for an empty batch. Values stay
//! strings in both directions; nothing is coerced.

use crate::error::ConvertError;
use crate::record::{CanonicalRecord, FIELD_NAMES};
use std::io;

pub fn to_csv(records: &[CanonicalRecord]) -> Result<String, ConvertError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(FIELD_NAMES)?;
    for record in records {
        writer.write_record(record.values())?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ConvertError::Io(err.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|err| ConvertError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

pub fn from_csv(text: &str) -> Result<Vec<CanonicalRecord>, ConvertError> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
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
    fn header_is_written_even_for_empty_input() {
        let out = to_csv(&[]).unwrap();
        assert_eq!(
            out,
            "DATE,HOST_NAME,HOST_IP,Vuln_Num,Severity,Group_Title,Rule_ID,Rule_Ver,Rule_Title,Fix_Text,STATUS,FINDING_DETAILS,COMMENTS,Unique_ID\n"
        );
    }

    #[test]
    fn missing_attributes_become_empty_columns() {
        let out = to_csv(&[sample()]).unwrap();
        let mut lines = out.lines();
        lines.next().unwrap();
        assert_eq!(
            lines.next().unwrap(),
            "20240101,web01,10.0.0.5,V-1001,high,,SV-1,,,,Open,none,,web01-SV-1-20240101"
        );
    }

    #[test]
    fn decode_keeps_every_value_a_string() {
        let out = to_csv(&[sample()]).unwrap();
        let records = from_csv(&out).unwrap();
        assert_eq!(records, vec![sample()]);
        assert_eq!(records[0].date, "20240101");
    }

    #[test]
    fn embedded_delimiters_survive_the_round_trip() {
        let mut record = sample();
        record.finding_details = "a, b and \"c\"".to_string();
        let out = to_csv(&[record.clone()]).unwrap();
        let records = from_csv(&out).unwrap();
        assert_eq!(records[0].finding_details, "a, b and \"c\"");
    }
}
