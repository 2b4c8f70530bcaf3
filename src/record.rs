//! Canonical finding records.
//!
//! Every format the converter speaks is read into, or written from, the
//! `CanonicalRecord` shape defined here. The field set is closed: the CSV
//! header, the flat JSON objects, and the CKL attribute allow-list all derive
//! from the two constant lists in this module, so a new field lands in one
//! place.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed column order shared by the CSV header and the JSON object fields.
pub const FIELD_NAMES: [&str; 14] = [
    "DATE",
    "HOST_NAME",
    "HOST_IP",
    "Vuln_Num",
    "Severity",
    "Group_Title",
    "Rule_ID",
    "Rule_Ver",
    "Rule_Title",
    "Fix_Text",
    "STATUS",
    "FINDING_DETAILS",
    "COMMENTS",
    "Unique_ID",
];

/// The closed allow-list of per-finding attribute names pulled from a
/// checklist's STIG_DATA pairs. Attribute names outside this set are ignored,
/// never an error.
pub const VULN_ATTRIBUTES: [&str; 7] = [
    "Vuln_Num",
    "Severity",
    "Group_Title",
    "Rule_ID",
    "Rule_Ver",
    "Rule_Title",
    "Fix_Text",
];

/// One vulnerability check result for one host.
///
/// All values are strings, including the date; log pipelines downstream do
/// their own typing. `host_name` and `host_ip` are document-level facts
/// projected onto every record parsed from the same checklist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanonicalRecord {
    #[serde(rename = "DATE")]
    pub date: String,
    #[serde(rename = "HOST_NAME")]
    pub host_name: String,
    #[serde(rename = "HOST_IP")]
    pub host_ip: String,
    #[serde(rename = "Vuln_Num")]
    pub vuln_num: String,
    #[serde(rename = "Severity")]
    pub severity: String,
    #[serde(rename = "Group_Title")]
    pub group_title: String,
    #[serde(rename = "Rule_ID")]
    pub rule_id: String,
    #[serde(rename = "Rule_Ver")]
    pub rule_ver: String,
    #[serde(rename = "Rule_Title")]
    pub rule_title: String,
    #[serde(rename = "Fix_Text")]
    pub fix_text: String,
    #[serde(rename = "STATUS")]
    pub status: String,
    #[serde(rename = "FINDING_DETAILS")]
    pub finding_details: String,
    #[serde(rename = "COMMENTS")]
    pub comments: String,
    #[serde(rename = "Unique_ID")]
    pub unique_id: String,
}

impl CanonicalRecord {
    /// Recomputes `unique_id` from the current host, rule and date values.
    ///
    /// The id is a pure function of those three fields; callers must call
    /// this after changing any of them rather than copying an old id along.
    pub fn stamp_unique_id(&mut self) {
        self.unique_id = format!("{}-{}-{}", self.host_name, self.rule_id, self.date);
    }

    /// Looks a value up by its external field name (CSV header / CKL tag).
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "DATE" => &self.date,
            "HOST_NAME" => &self.host_name,
            "HOST_IP" => &self.host_ip,
            "Vuln_Num" => &self.vuln_num,
            "Severity" => &self.severity,
            "Group_Title" => &self.group_title,
            "Rule_ID" => &self.rule_id,
            "Rule_Ver" => &self.rule_ver,
            "Rule_Title" => &self.rule_title,
            "Fix_Text" => &self.fix_text,
            "STATUS" => &self.status,
            "FINDING_DETAILS" => &self.finding_details,
            "COMMENTS" => &self.comments,
            "Unique_ID" => &self.unique_id,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Stores an allow-listed attribute value. Names outside
    /// [`VULN_ATTRIBUTES`] are silently dropped.
    pub fn set_attribute(&mut self, name: &str, value: String) {
        match name {
            "Vuln_Num" => self.vuln_num = value,
            "Severity" => self.severity = value,
            "Group_Title" => self.group_title = value,
            "Rule_ID" => self.rule_id = value,
            "Rule_Ver" => self.rule_ver = value,
            "Rule_Title" => self.rule_title = value,
            "Fix_Text" => self.fix_text = value,
            _ => {}
        }
    }

    /// Values in [`FIELD_NAMES`] order, for positional writers like CSV.
    pub fn values(&self) -> [&str; 14] {
        [
            &self.date,
            &self.host_name,
            &self.host_ip,
            &self.vuln_num,
            &self.severity,
            &self.group_title,
            &self.rule_id,
            &self.rule_ver,
            &self.rule_title,
            &self.fix_text,
            &self.status,
            &self.finding_details,
            &self.comments,
            &self.unique_id,
        ]
    }
}

/// Conversion-time date stamp, `YYYYMMDD`.
///
/// Conversions never read the wall clock themselves; the caller builds one of
/// these (usually [`RunDate::today`]) and passes it down, which keeps repeated
/// runs in tests deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDate(String);

impl RunDate {
    pub fn today() -> Self {
        Self(chrono::Local::now().format("%Y%m%d").to_string())
    }

    /// Accepts exactly eight ASCII digits.
    pub fn parse(value: &str) -> Result<Self, ConvertError> {
        if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(value.to_string()))
        } else {
            Err(ConvertError::InvalidRunDate {
                value: value.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
