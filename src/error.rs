//! Typed failures for the conversion engine.
//!
//! Structural problems (paths, extensions, conversion pairs) are detected
//! before any output file is opened; per-finding field errors abort the whole
//! document rather than skipping the malformed finding, because the checklist
//! schema guarantees those fields and a gap means the document is corrupt.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("unsupported file extension '{extension}' for {} (expected ckl, csv, json or md)", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("cannot convert {from} to {to}; allowed: ckl->csv, ckl->json, csv->json, json->ckl")]
    UnsupportedConversion { from: &'static str, to: &'static str },

    #[error("invalid checklist template {}: {reason}", path.display())]
    Template { path: PathBuf, reason: String },

    #[error("finding {index} in {} is missing required field {field}", path.display())]
    Field {
        path: PathBuf,
        index: usize,
        field: &'static str,
    },

    #[error("records do not align with the template: {reason}")]
    RecordCountMismatch { reason: String },

    #[error("invalid run date '{value}' (expected YYYYMMDD)")]
    InvalidRunDate { value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
