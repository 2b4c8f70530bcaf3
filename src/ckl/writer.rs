//! Merges canonical records back into a CKL template document.
//!
//! The template is an existing checklist; the merge never adds or removes
//! nodes, it only overwrites the text of nodes it recognizes. Each VULN block
//! is buffered, its Rule_ID is read, and the record with the matching
//! `rule_id` (if any) is applied to that block. Key matching was chosen over
//! positional zipping because JSON inputs are routinely subsets of a full
//! checklist; a record whose Rule_ID appears in no template block is an
//! error, a template block with no matching record is left untouched.

use crate::error::ConvertError;
use crate::record::{CanonicalRecord, VULN_ATTRIBUTES};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesText, Event};
use std::collections::BTreeMap;
use std::path::Path;

/// The checklist-authoring tool expects these two lines byte-for-byte ahead
/// of the serialized tree.
const PREAMBLE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!--DISA STIG Viewer :: 2.16-->\n";

/// Direct per-finding fields overwritten alongside the attribute list.
const DIRECT_FIELDS: [&str; 3] = ["STATUS", "FINDING_DETAILS", "COMMENTS"];

/// Applies `records` to the template text and returns the new document bytes.
///
/// Asset HOST_NAME/HOST_IP come from the first record; a batch is assumed to
/// share one host.
pub fn merge_into_template(
    template_path: &Path,
    template_text: &str,
    records: &[CanonicalRecord],
) -> Result<Vec<u8>, ConvertError> {
    if records.is_empty() {
        return Err(ConvertError::RecordCountMismatch {
            reason: "no records to merge into the template".to_string(),
        });
    }

    let mut by_rule: BTreeMap<&str, usize> = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        if by_rule.insert(record.rule_id.as_str(), index).is_some() {
            return Err(ConvertError::RecordCountMismatch {
                reason: format!("duplicate Rule_ID '{}' in input records", record.rule_id),
            });
        }
    }
    let mut consumed = vec![false; records.len()];

    let mut reader = Reader::from_str(template_text);
    let mut writer = Writer::new(Vec::new());
    let mut stack: Vec<String> = Vec::new();
    let mut root_seen = false;
    let mut saw_asset = false;
    let mut saw_vuln = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|err| template_error(template_path, &err.to_string()))?;
        match event {
            // The preamble is emitted fresh; the template's declaration,
            // leading comment and surrounding whitespace are dropped.
            Event::Decl(_) => {}
            Event::Comment(_) if !root_seen => {}
            Event::Text(_) if !root_seen => {}
            Event::Eof => break,
            Event::Start(start) => {
                root_seen = true;
                let name = element_name(&start);
                match name.as_str() {
                    "VULN" => {
                        saw_vuln = true;
                        let block = read_block(&mut reader, Event::Start(start.into_owned()))
                            .map_err(|err| template_error(template_path, &err.to_string()))?;
                        let matched = block_rule_id(&block)?
                            .and_then(|rule_id| by_rule.get(rule_id.as_str()).copied());
                        match matched {
                            Some(index) => {
                                consumed[index] = true;
                                rewrite_block(&block, &records[index], &mut writer)?;
                            }
                            None => {
                                for ev in &block {
                                    writer.write_event(ev.clone())?;
                                }
                            }
                        }
                    }
                    "HOST_NAME" | "HOST_IP" if parent_is(&stack, "ASSET") => {
                        let value = host_value(&name, &records[0]);
                        writer.write_event(Event::Start(start.borrow()))?;
                        writer.write_event(Event::Text(BytesText::new(value)))?;
                        consume_to_end(&mut reader, &name)
                            .map_err(|err| template_error(template_path, &err.to_string()))?;
                        writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
                    }
                    _ => {
                        if name == "ASSET" {
                            saw_asset = true;
                        }
                        stack.push(name);
                        writer.write_event(Event::Start(start.borrow()))?;
                    }
                }
            }
            Event::Empty(start) => {
                root_seen = true;
                let name = element_name(&start);
                if matches!(name.as_str(), "HOST_NAME" | "HOST_IP") && parent_is(&stack, "ASSET")
                {
                    let value = host_value(&name, &records[0]);
                    writer.write_event(Event::Start(start.borrow()))?;
                    writer.write_event(Event::Text(BytesText::new(value)))?;
                    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
                } else {
                    if name == "ASSET" {
                        saw_asset = true;
                    }
                    writer.write_event(Event::Empty(start.borrow()))?;
                }
            }
            Event::End(end) => {
                stack.pop();
                writer.write_event(Event::End(end.borrow()))?;
            }
            other => {
                writer.write_event(other.borrow())?;
            }
        }
    }

    if !root_seen {
        return Err(template_error(template_path, "document has no root element"));
    }
    if !saw_asset {
        return Err(template_error(template_path, "missing ASSET section"));
    }
    if !saw_vuln {
        return Err(template_error(template_path, "template contains no VULN blocks"));
    }

    let unmatched: Vec<&str> = consumed
        .iter()
        .enumerate()
        .filter(|(_, done)| !**done)
        .map(|(index, _)| records[index].rule_id.as_str())
        .collect();
    if !unmatched.is_empty() {
        return Err(ConvertError::RecordCountMismatch {
            reason: format!(
                "{} record(s) matched no template block: Rule_ID {}",
                unmatched.len(),
                unmatched.join(", ")
            ),
        });
    }

    let mut output = PREAMBLE.as_bytes().to_vec();
    output.extend_from_slice(&writer.into_inner());
    Ok(output)
}

fn template_error(path: &Path, reason: &str) -> ConvertError {
    ConvertError::Template {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn element_name(start: &quick_xml::events::BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn host_value<'a>(name: &str, record: &'a CanonicalRecord) -> &'a str {
    if name == "HOST_NAME" {
        &record.host_name
    } else {
        &record.host_ip
    }
}

fn parent_is(stack: &[String], expected: &str) -> bool {
    stack.last().map(String::as_str) == Some(expected)
}

// Collects the events of one element subtree, including its start and end.
fn read_block(
    reader: &mut Reader<&[u8]>,
    start: Event<'static>,
) -> Result<Vec<Event<'static>>, quick_xml::Error> {
    let name = match &start {
        Event::Start(s) => element_name(s),
        _ => unreachable!("read_block is only entered on a start event"),
    };
    let mut events = vec![start];
    let mut depth = 1usize;
    loop {
        let event = reader.read_event()?.into_owned();
        match &event {
            Event::Start(s) if element_name(s) == name => depth += 1,
            Event::End(e) if String::from_utf8_lossy(e.name().as_ref()) == name => {
                depth -= 1;
                if depth == 0 {
                    events.push(event);
                    return Ok(events);
                }
            }
            Event::Eof => {
                return Err(quick_xml::Error::UnexpectedEof(format!(
                    "while reading {name} block"
                )));
            }
            _ => {}
        }
        events.push(event);
    }
}

// Reads the Rule_ID attribute value out of a buffered VULN block.
fn block_rule_id(events: &[Event<'static>]) -> Result<Option<String>, ConvertError> {
    let mut stack: Vec<String> = Vec::new();
    let mut attr_name = String::new();
    let mut attr_value = String::new();
    for event in events {
        match event {
            Event::Start(s) => {
                let name = element_name(s);
                if name == "STIG_DATA" {
                    attr_name.clear();
                    attr_value.clear();
                }
                stack.push(name);
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                match stack.last().map(String::as_str) {
                    Some("VULN_ATTRIBUTE") if parent_in_stack(&stack, "STIG_DATA") => {
                        attr_name.push_str(&text);
                    }
                    Some("ATTRIBUTE_DATA") if parent_in_stack(&stack, "STIG_DATA") => {
                        attr_value.push_str(&text);
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                let name = e.name();
                let closed = String::from_utf8_lossy(name.as_ref());
                if closed == "STIG_DATA" && attr_name == "Rule_ID" {
                    return Ok(Some(attr_value.clone()));
                }
                stack.pop();
            }
            _ => {}
        }
    }
    Ok(None)
}

fn parent_in_stack(stack: &[String], expected: &str) -> bool {
    stack.len() >= 2 && stack[stack.len() - 2] == expected
}

// Re-emits a buffered VULN block with the record's values written over the
// allow-listed attribute data and the three direct fields. Attribute names
// are read from the VULN_ATTRIBUTE node preceding each ATTRIBUTE_DATA node,
// as the checklist tool lays them out.
fn rewrite_block(
    events: &[Event<'static>],
    record: &CanonicalRecord,
    writer: &mut Writer<Vec<u8>>,
) -> Result<(), ConvertError> {
    let mut stack: Vec<String> = Vec::new();
    let mut attr_name: Option<String> = None;
    let mut i = 0;
    while i < events.len() {
        match &events[i] {
            Event::Start(s) => {
                let name = element_name(s);
                if let Some(value) = replacement(&name, &stack, attr_name.as_deref(), record) {
                    writer.write_event(Event::Start(s.borrow()))?;
                    writer.write_event(Event::Text(BytesText::new(value)))?;
                    i = skip_to_end(events, i, &name);
                    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
                } else {
                    if name == "STIG_DATA" {
                        attr_name = None;
                    }
                    stack.push(name);
                    writer.write_event(events[i].clone())?;
                }
            }
            Event::Empty(s) => {
                let name = element_name(s);
                if let Some(value) = replacement(&name, &stack, attr_name.as_deref(), record) {
                    writer.write_event(Event::Start(s.borrow()))?;
                    writer.write_event(Event::Text(BytesText::new(value)))?;
                    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
                } else {
                    writer.write_event(events[i].clone())?;
                }
            }
            Event::Text(t) => {
                if stack.last().map(String::as_str) == Some("VULN_ATTRIBUTE")
                    && parent_in_stack(&stack, "STIG_DATA")
                {
                    let text = t.unescape()?;
                    attr_name.get_or_insert_with(String::new).push_str(&text);
                }
                writer.write_event(events[i].clone())?;
            }
            Event::End(_) => {
                stack.pop();
                writer.write_event(events[i].clone())?;
            }
            other => {
                writer.write_event(other.clone())?;
            }
        }
        i += 1;
    }
    Ok(())
}

fn replacement<'a>(
    name: &str,
    stack: &[String],
    attr_name: Option<&str>,
    record: &'a CanonicalRecord,
) -> Option<&'a str> {
    if DIRECT_FIELDS.contains(&name) && stack.last().map(String::as_str) == Some("VULN") {
        return record.field(name);
    }
    if name == "ATTRIBUTE_DATA" && stack.last().map(String::as_str) == Some("STIG_DATA") {
        let attr = attr_name?;
        if VULN_ATTRIBUTES.contains(&attr) {
            return record.field(attr);
        }
    }
    None
}

// Index of the End event matching the Start at `start_index`.
fn skip_to_end(events: &[Event<'static>], start_index: usize, name: &str) -> usize {
    let mut depth = 1usize;
    let mut i = start_index + 1;
    while i < events.len() {
        match &events[i] {
            Event::Start(s) if element_name(s) == name => depth += 1,
            Event::End(e) if String::from_utf8_lossy(e.name().as_ref()) == name => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
        i += 1;
    }
    events.len() - 1
}

// Discards events up to the end tag of the named leaf element.
fn consume_to_end(reader: &mut Reader<&[u8]>, name: &str) -> Result<(), quick_xml::Error> {
    loop {
        match reader.read_event()? {
            Event::End(e) if String::from_utf8_lossy(e.name().as_ref()) == name => return Ok(()),
            Event::Eof => {
                return Err(quick_xml::Error::UnexpectedEof(format!(
                    "while reading {name} element"
                )));
            }
            _ => {}
        }
    }
}
