//! Pull parser turning a CKL document into canonical records.
//!
//! The walk is a single pass over the event stream. Element presence matters
//! here: a required field whose element is absent is a fatal error, while a
//! present-but-empty element is an empty string (and, for HOST_NAME, the
//! caller-supplied default). A serde mapping cannot tell those apart, so this
//! module tracks open elements by hand.

use crate::error::ConvertError;
use crate::record::{CanonicalRecord, RunDate, VULN_ATTRIBUTES};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::path::Path;

/// How embedded newlines in attribute values are normalized.
///
/// The CSV pipeline has always removed them outright while the JSON pipeline
/// replaces them with a space; downstream consumers rely on the difference,
/// so it is kept per target codec rather than unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewlinePolicy {
    Strip,
    Space,
}

impl NewlinePolicy {
    fn apply(self, value: &str) -> String {
        match self {
            NewlinePolicy::Strip => value.replace('\n', ""),
            NewlinePolicy::Space => value.replace('\n', " "),
        }
    }
}

/// Per-document parse configuration.
pub struct ParseOptions<'a> {
    /// Stamped onto every record in the batch; never read from the document.
    pub run_date: &'a RunDate,
    /// Used when the asset's HOST_NAME element exists but is empty. An absent
    /// element stays an empty string.
    pub default_host: Option<&'a str>,
}

/// Parses CKL text into one record per VULN block, in document order.
pub fn parse_ckl(
    path: &Path,
    text: &str,
    policy: NewlinePolicy,
    options: &ParseOptions<'_>,
) -> Result<Vec<CanonicalRecord>, ConvertError> {
    let raw = walk_document(path, text)?;

    let host_name = match raw.host_name {
        Some(name) if name.is_empty() => options.default_host.unwrap_or("").to_string(),
        Some(name) => name,
        None => String::new(),
    };
    let host_ip = raw.host_ip.unwrap_or_default();
    let date = options.run_date.as_str().to_string();

    let mut records = Vec::with_capacity(raw.vulns.len());
    for (index, vuln) in raw.vulns.into_iter().enumerate() {
        let mut record = CanonicalRecord {
            date: date.clone(),
            host_name: host_name.clone(),
            host_ip: host_ip.clone(),
            ..Default::default()
        };
        for (name, value) in vuln.attributes {
            record.set_attribute(&name, policy.apply(&value));
        }
        record.status = require_field(path, index, "STATUS", vuln.status)?;
        record.finding_details =
            require_field(path, index, "FINDING_DETAILS", vuln.finding_details)?;
        record.comments = require_field(path, index, "COMMENTS", vuln.comments)?;
        record.stamp_unique_id();
        records.push(record);
    }

    Ok(records)
}

fn require_field(
    path: &Path,
    index: usize,
    field: &'static str,
    value: Option<String>,
) -> Result<String, ConvertError> {
    value.ok_or_else(|| ConvertError::Field {
        path: path.to_path_buf(),
        index,
        field,
    })
}

#[derive(Default)]
struct RawDocument {
    host_name: Option<String>,
    host_ip: Option<String>,
    vulns: Vec<RawVuln>,
}

#[derive(Default)]
struct RawVuln {
    attributes: Vec<(String, String)>,
    status: Option<String>,
    finding_details: Option<String>,
    comments: Option<String>,
}

// One STIG_DATA pair being collected.
#[derive(Default)]
struct RawPair {
    name: Option<String>,
    value: Option<String>,
}

fn walk_document(path: &Path, text: &str) -> Result<RawDocument, ConvertError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<String> = Vec::new();
    let mut doc = RawDocument::default();
    let mut vuln: Option<RawVuln> = None;
    let mut pair: Option<RawPair> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                stack.push(name);
                on_open(&stack, &mut doc, &mut vuln, &mut pair);
            }
            Event::Empty(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                stack.push(name);
                on_open(&stack, &mut doc, &mut vuln, &mut pair);
                on_close(&mut stack, &mut doc, &mut vuln, &mut pair);
            }
            Event::Text(t) => {
                let value = t.unescape()?.into_owned();
                append_text(&stack, &value, &mut doc, &mut vuln, &mut pair);
            }
            Event::CData(data) => {
                let value = String::from_utf8_lossy(data.into_inner().as_ref()).into_owned();
                append_text(&stack, &value, &mut doc, &mut vuln, &mut pair);
            }
            Event::End(_) => {
                on_close(&mut stack, &mut doc, &mut vuln, &mut pair);
            }
            Event::Eof => break,
            // Declaration, comments and processing instructions carry no
            // finding data.
            _ => {}
        }
    }

    if let Some(_unclosed) = vuln.take() {
        return Err(ConvertError::Template {
            path: path.to_path_buf(),
            reason: "unterminated VULN block".to_string(),
        });
    }

    Ok(doc)
}

// Initializes the capture slot for an element we care about, so that an
// element that closes with no text still registers as present ("").
fn on_open(
    stack: &[String],
    doc: &mut RawDocument,
    vuln: &mut Option<RawVuln>,
    pair: &mut Option<RawPair>,
) {
    match stack.last().map(String::as_str) {
        Some("VULN") => {
            *vuln = Some(RawVuln::default());
        }
        Some("STIG_DATA") if vuln.is_some() && parent_is(stack, "VULN") => {
            *pair = Some(RawPair::default());
        }
        _ => {
            if let Some(slot) = capture_slot(stack, doc, vuln, pair) {
                slot.get_or_insert_with(String::new);
            }
        }
    }
}

fn on_close(
    stack: &mut Vec<String>,
    doc: &mut RawDocument,
    vuln: &mut Option<RawVuln>,
    pair: &mut Option<RawPair>,
) {
    let closed = stack.pop();
    match closed.as_deref() {
        Some("VULN") => {
            if let Some(finished) = vuln.take() {
                doc.vulns.push(finished);
            }
        }
        Some("STIG_DATA") => {
            if let (Some(finished), Some(current)) = (pair.take(), vuln.as_mut()) {
                // Only allow-listed names are kept; the value node may still
                // be absent, which the record builder reports as fatal.
                if let Some(name) = finished.name {
                    if VULN_ATTRIBUTES.contains(&name.as_str()) {
                        current
                            .attributes
                            .push((name, finished.value.unwrap_or_default()));
                    }
                }
            }
        }
        _ => {}
    }
}

fn append_text(
    stack: &[String],
    value: &str,
    doc: &mut RawDocument,
    vuln: &mut Option<RawVuln>,
    pair: &mut Option<RawPair>,
) {
    if let Some(slot) = capture_slot(stack, doc, vuln, pair) {
        match slot {
            Some(existing) => existing.push_str(value),
            None => *slot = Some(value.to_string()),
        }
    }
}

// Maps the currently open element to the field it feeds, if any.
fn capture_slot<'a>(
    stack: &[String],
    doc: &'a mut RawDocument,
    vuln: &'a mut Option<RawVuln>,
    pair: &'a mut Option<RawPair>,
) -> Option<&'a mut Option<String>> {
    let leaf = stack.last().map(String::as_str)?;
    match leaf {
        "HOST_NAME" if parent_is(stack, "ASSET") => Some(&mut doc.host_name),
        "HOST_IP" if parent_is(stack, "ASSET") => Some(&mut doc.host_ip),
        "VULN_ATTRIBUTE" if parent_is(stack, "STIG_DATA") => {
            pair.as_mut().map(|p| &mut p.name)
        }
        "ATTRIBUTE_DATA" if parent_is(stack, "STIG_DATA") => {
            pair.as_mut().map(|p| &mut p.value)
        }
        "STATUS" if parent_is(stack, "VULN") => vuln.as_mut().map(|v| &mut v.status),
        "FINDING_DETAILS" if parent_is(stack, "VULN") => {
            vuln.as_mut().map(|v| &mut v.finding_details)
        }
        "COMMENTS" if parent_is(stack, "VULN") => vuln.as_mut().map(|v| &mut v.comments),
        _ => None,
    }
}

fn parent_is(stack: &[String], expected: &str) -> bool {
    stack.len() >= 2 && stack[stack.len() - 2] == expected
}
