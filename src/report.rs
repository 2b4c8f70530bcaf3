//! Markdown report rendering for catalog-style checklists.
//!
//! The input here is not the flat record array: it is the richer shape served
//! by the public checklist catalog, a `stig` header with an ID-keyed findings
//! map. Findings render in the order the document lists them.

use crate::error::ConvertError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt::Write;

const FALLBACK_TITLE: &str = "STIG Findings";

const COLOR_HIGH: &str = "#ff0000";
const COLOR_MEDIUM: &str = "#ff8c00";
const COLOR_LOW: &str = "#b3b31a";

#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub stig: CatalogHeader,
}

#[derive(Debug, Deserialize)]
pub struct CatalogHeader {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub findings: IndexMap<String, CatalogFinding>,
}

/// One catalog finding. The upstream feed is not under our control, so
/// missing fields render as empty strings instead of failing the report.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogFinding {
    pub title: String,
    pub severity: String,
    pub id: String,
    #[serde(rename = "ruleID")]
    pub rule_id: String,
    pub description: String,
    pub checktext: String,
    pub checkid: String,
    pub fixtext: String,
    pub fixid: String,
}

pub fn parse_catalog(text: &str) -> Result<Catalog, ConvertError> {
    Ok(serde_json::from_str(text)?)
}

/// Colored severity span for a finding heading.
///
/// Classification is a case-sensitive exact match: `"high"` and `"medium"`
/// get their tiers, anything else (including `"High"` or `"critical"`) falls
/// to the lowest tier. That matches how the catalog feed spells severities.
pub fn severity_tag(severity: &str) -> String {
    let color = match severity {
        "high" => COLOR_HIGH,
        "medium" => COLOR_MEDIUM,
        _ => COLOR_LOW,
    };
    format!(
        "<span style=\"color:{color};font-size:150%;\">{} Severity</span>",
        capitalize(severity)
    )
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Renders the whole catalog to Markdown text.
pub fn render(catalog: &Catalog) -> String {
    let header = &catalog.stig;
    let title = header.title.as_deref().unwrap_or(FALLBACK_TITLE);

    let mut out = String::new();
    // Infallible writes into a String; fmt errors cannot occur here.
    let _ = write!(
        out,
        "# {title}\n\n**Date:** {}\n\n**Description:** {}\n\n---\n\n",
        header.date, header.description
    );

    for finding in header.findings.values() {
        let _ = write!(
            out,
            "## {}\n\n{}\n\n### Description\n\n{}\n\n### Check Text\n\n{}\n\n**Check ID:**  {}\n\n### Fix Text \n\n{}\n\n**Fix ID:**  {}\n\n**Vulnerability ID:**  {}\n\n**Rule ID:**  {}\n\n---\n\n",
            finding.title,
            severity_tag(&finding.severity),
            finding.description,
            finding.checktext,
            finding.checkid,
            finding.fixtext,
            finding.fixid,
            finding.id,
            finding.rule_id,
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "stig": {
            "title": "Application Security and Development",
            "date": "2023-06-08",
            "description": "App dev requirements.",
            "findings": {
                "V-222400": {
                    "title": "Second by ID, first in document",
                    "severity": "medium",
                    "id": "V-222400",
                    "ruleID": "SV-222400r1",
                    "description": "desc one",
                    "checktext": "check one",
                    "checkid": "C-1",
                    "fixtext": "fix one",
                    "fixid": "F-1"
                },
                "V-222399": {
                    "title": "First by ID, second in document",
                    "severity": "high",
                    "id": "V-222399",
                    "ruleID": "SV-222399r1",
                    "description": "desc two",
                    "checktext": "check two",
                    "checkid": "C-2",
                    "fixtext": "fix two",
                    "fixid": "F-2"
                }
            }
        }
    }"#;

    #[test]
    fn severity_classification_is_case_sensitive() {
        assert!(severity_tag("high").contains(COLOR_HIGH));
        assert!(severity_tag("medium").contains(COLOR_MEDIUM));
        assert!(severity_tag("low").contains(COLOR_LOW));
        // Unknown values and unexpected casing fall through, never error.
        assert!(severity_tag("critical").contains(COLOR_LOW));
        assert!(severity_tag("High").contains(COLOR_LOW));
        assert!(severity_tag("").contains(COLOR_LOW));
    }

    #[test]
    fn severity_title_is_capitalized() {
        assert!(severity_tag("high").contains(">High Severity<"));
        assert!(severity_tag("medium").contains(">Medium Severity<"));
    }

    #[test]
    fn renders_header_and_findings_in_document_order() {
        let catalog = parse_catalog(CATALOG).unwrap();
        let out = render(&catalog);
        assert!(out.starts_with("# Application Security and Development\n\n"));
        assert!(out.contains("**Date:** 2023-06-08\n\n"));
        assert!(out.contains("**Description:** App dev requirements.\n\n---\n\n"));

        let first = out.find("Second by ID, first in document").unwrap();
        let second = out.find("First by ID, second in document").unwrap();
        assert!(first < second, "findings must keep document order");

        assert!(out.contains("**Check ID:**  C-1\n\n"));
        assert!(out.contains("**Fix ID:**  F-1\n\n"));
        assert!(out.contains("**Vulnerability ID:**  V-222400\n\n"));
        assert!(out.contains("**Rule ID:**  SV-222400r1\n\n---\n\n"));
    }

    #[test]
    fn missing_finding_fields_render_as_empty() {
        let catalog =
            parse_catalog(r#"{"stig": {"findings": {"V-1": {"severity": "high"}}}}"#).unwrap();
        let out = render(&catalog);
        assert!(out.starts_with("# STIG Findings\n\n"));
        assert!(out.contains("## \n\n"));
        assert!(out.contains(COLOR_HIGH));
    }

    #[test]
    fn catalog_without_stig_key_is_rejected() {
        assert!(parse_catalog("{}").is_err());
        assert!(parse_catalog("[]").is_err());
    }
}
