//! Output filename conventions and the project-name path heuristic.

use crate::record::RunDate;
use std::path::Path;

/// Applies the converter filename convention: spaces become underscores and
/// the stem carries the run date. An existing `-YYYYMMDD` suffix is replaced
/// in place so repeated runs do not stack dates.
///
/// `report-20230101.csv` on run date 20240101 becomes `report-20240101.csv`;
/// `report.csv` becomes `report-20240101.csv`.
pub fn stamp_filename(filename: &str, date: &RunDate) -> String {
    let (stem, extension) = match filename.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (filename, None),
    };
    let mut stem = stem.replace(' ', "_");

    match find_date_suffix(&stem) {
        Some(start) => stem.replace_range(start..start + 8, date.as_str()),
        None => {
            stem.push('-');
            stem.push_str(date.as_str());
        }
    }

    match extension {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

// Byte offset of the first eight-digit run preceded by a dash.
fn find_date_suffix(stem: &str) -> Option<usize> {
    let bytes = stem.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'-'
            && bytes.len() >= i + 9
            && bytes[i + 1..i + 9].iter().all(u8::is_ascii_digit)
        {
            return Some(i + 1);
        }
    }
    None
}

/// Scans a path's components for a known project name, case-insensitively.
///
/// Checklists on shared drives live under per-project directories
/// (`.../project1/STIGs/host.ckl`); when a checklist carries no hostname the
/// project directory is the best available stand-in.
pub fn project_from_path(path: &Path, projects: &[String]) -> Option<String> {
    let lowered: Vec<String> = projects.iter().map(|p| p.to_lowercase()).collect();
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if lowered.iter().any(|p| *p == name.to_lowercase()) {
            return Some(name.into_owned());
        }
    }
    None
}
