//! STIG checklist conversion library.
//!
//! Converts DISA STIG checklists between the viewer's CKL XML format and
//! flat CSV/JSON record batches, and renders finding catalogs as Markdown.
//! The record layout shared by every format lives in [`record`]; format
//! routing lives in [`convert`].

pub mod ckl;
pub mod codec;
pub mod convert;
pub mod error;
pub mod paths;
pub mod record;
pub mod report;

pub use convert::{Conversion, ConvertOptions, Format, convert, write_atomic};
pub use error::ConvertError;
pub use record::{CanonicalRecord, FIELD_NAMES, RunDate, VULN_ATTRIBUTES};
