//! Conversion dispatch.
//!
//! The only component aware of every format pair. Everything else in the
//! crate is format-local; this module validates the request, routes it
//! through the right reader/codec pair, stamps the output filename, and
//! writes the result atomically.

use crate::ckl::{NewlinePolicy, ParseOptions, merge_into_template, parse_ckl};
use crate::codec::{csv, json};
use crate::error::ConvertError;
use crate::paths::stamp_filename;
use crate::record::{CanonicalRecord, RunDate};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ckl,
    Csv,
    Json,
    Md,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Ckl => "ckl",
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Md => "md",
        }
    }

    /// The closed conversion table. CSV is JSON's only source and JSON is
    /// CKL's only source on the way back; there is deliberately no direct
    /// ckl->ckl or json->csv path.
    pub fn targets(self) -> &'static [Format] {
        match self {
            Format::Ckl => &[Format::Csv, Format::Json],
            Format::Csv => &[Format::Json],
            Format::Json => &[Format::Ckl],
            // Markdown is produced by the report renderer, never by the
            // record dispatcher.
            Format::Md => &[],
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConvertError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Format::try_from(extension.as_str()).map_err(|_| ConvertError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        })
    }
}

impl TryFrom<&str> for Format {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, ()> {
        match value {
            "ckl" => Ok(Format::Ckl),
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "md" => Ok(Format::Md),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ConvertOptions {
    pub run_date: RunDate,
    /// Fallback hostname for an asset whose HOST_NAME element is empty.
    pub default_host: Option<String>,
    /// Template checklist; required for json->ckl, ignored elsewhere.
    pub template: Option<PathBuf>,
}

/// What a conversion produced: the resolved output path (after filename
/// stamping) and the records that passed through, for callers that also
/// stream them (event mode).
#[derive(Debug)]
pub struct Conversion {
    pub output_path: PathBuf,
    pub records: Vec<CanonicalRecord>,
}

/// Converts `input` to `output`'s format.
///
/// All validation happens before the output file is opened; a failing run
/// leaves no partial output. The final filename carries the run date per the
/// converter convention, so the returned path may differ from `output`.
pub fn convert(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Result<Conversion, ConvertError> {
    if !input.is_file() {
        return Err(ConvertError::InputNotFound {
            path: input.to_path_buf(),
        });
    }
    let from = Format::from_path(input)?;
    let to = Format::from_path(output)?;
    if !from.targets().contains(&to) {
        return Err(ConvertError::UnsupportedConversion {
            from: from.as_str(),
            to: to.as_str(),
        });
    }

    let text = fs::read_to_string(input)?;
    let (records, bytes) = match (from, to) {
        (Format::Ckl, Format::Csv) => {
            let records = parse_records(input, &text, NewlinePolicy::Strip, options)?;
            let out = csv::to_csv(&records)?;
            (records, out.into_bytes())
        }
        (Format::Ckl, Format::Json) => {
            let records = parse_records(input, &text, NewlinePolicy::Space, options)?;
            let out = json::to_json(&records)?;
            (records, out.into_bytes())
        }
        (Format::Csv, Format::Json) => {
            let records = csv::from_csv(&text)?;
            let out = json::to_json(&records)?;
            (records, out.into_bytes())
        }
        (Format::Json, Format::Ckl) => {
            let records = json::from_json(&text)?;
            let template = options.template.as_deref().ok_or_else(|| {
                ConvertError::Template {
                    path: input.to_path_buf(),
                    reason: "json->ckl conversion requires a template checklist".to_string(),
                }
            })?;
            if !template.is_file() {
                return Err(ConvertError::InputNotFound {
                    path: template.to_path_buf(),
                });
            }
            let template_text = fs::read_to_string(template)?;
            let out = merge_into_template(template, &template_text, &records)?;
            (records, out)
        }
        // Unreachable once the pair passed the table check above.
        _ => {
            return Err(ConvertError::UnsupportedConversion {
                from: from.as_str(),
                to: to.as_str(),
            });
        }
    };

    let output_path = stamped_output_path(output, &options.run_date);
    write_atomic(&output_path, &bytes)?;
    Ok(Conversion {
        output_path,
        records,
    })
}

fn parse_records(
    input: &Path,
    text: &str,
    policy: NewlinePolicy,
    options: &ConvertOptions,
) -> Result<Vec<CanonicalRecord>, ConvertError> {
    let parse_options = ParseOptions {
        run_date: &options.run_date,
        default_host: options.default_host.as_deref(),
    };
    parse_ckl(input, text, policy, &parse_options)
}

fn stamped_output_path(output: &Path, date: &RunDate) -> PathBuf {
    match output.file_name() {
        Some(name) => {
            let stamped = stamp_filename(&name.to_string_lossy(), date);
            match output.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.join(stamped),
                _ => PathBuf::from(stamped),
            }
        }
        None => output.to_path_buf(),
    }
}

/// Writes via a temp file in the destination directory and renames into
/// place, so an interrupted run never leaves a truncated file under the
/// final name.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ConvertError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|err| ConvertError::Io(err.error))?;
    Ok(())
}
