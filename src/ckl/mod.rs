//! CKL checklist documents.
//!
//! CKL is the XML format produced by the checklist-authoring tool: one ASSET
//! section describing the host, then VULN blocks each carrying a STIG_DATA
//! attribute list plus STATUS/FINDING_DETAILS/COMMENTS. The reader normalizes
//! VULN blocks into canonical records; the writer merges records back into an
//! existing checklist used as a template.

pub mod reader;
pub mod writer;

pub use reader::{NewlinePolicy, ParseOptions, parse_ckl};
pub use writer::merge_into_template;
