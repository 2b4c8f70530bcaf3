//! Convert STIG checklists between CKL, CSV, and JSON.
//!
//! Usage:
//!   stigconv --input host.ckl --output host.csv
//!   stigconv --input host.ckl --output host.json --name web01
//!   stigconv --input records.json --output merged.ckl --template blank.ckl
//!
//! Status lines go to stderr; with --events the converted records are also
//! emitted to stdout as NDJSON, one record per line.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};
use stigconv::{ConvertOptions, RunDate, convert, paths::project_from_path};

/// Comma-separated project directory names consulted when a checklist has no
/// hostname and no --name was given.
const PROJECTS_ENV: &str = "STIGCONV_PROJECTS";

#[derive(Parser, Debug)]
#[command(name = "stigconv")]
#[command(version)]
#[command(about = "Convert STIG checklists between CKL, CSV, and JSON")]
struct Cli {
    /// Input file; its extension selects the source format.
    #[arg(short, long)]
    input: PathBuf,
    /// Output file; its extension selects the target format. The written
    /// filename additionally carries the run date.
    #[arg(short, long)]
    output: PathBuf,
    /// Hostname to use for assets whose checklist carries none.
    #[arg(short, long)]
    name: Option<String>,
    /// Emit converted records to stdout as NDJSON.
    #[arg(short, long)]
    events: bool,
    /// Template checklist for json->ckl conversion.
    #[arg(long)]
    template: Option<PathBuf>,
    /// Run date as YYYYMMDD; defaults to today.
    #[arg(long)]
    date: Option<String>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if same_path(&cli.input, &cli.output) {
        bail!("input and output refer to the same file: {}", cli.input.display());
    }

    let run_date = match &cli.date {
        Some(value) => RunDate::parse(value)?,
        None => RunDate::today(),
    };
    let default_host = resolve_default_host(&cli, &cli.input);

    let options = ConvertOptions {
        run_date,
        default_host,
        template: cli.template.clone(),
    };
    let outcome = convert(&cli.input, &cli.output, &options)
        .with_context(|| format!("converting {}", cli.input.display()))?;

    eprintln!(
        "converted {} record(s): {} -> {}",
        outcome.records.len(),
        cli.input.display(),
        outcome.output_path.display()
    );

    if cli.events {
        for record in &outcome.records {
            println!("{}", serde_json::to_string(record)?);
        }
    }

    Ok(())
}

fn resolve_default_host(cli: &Cli, input: &Path) -> Option<String> {
    if cli.name.is_some() {
        return cli.name.clone();
    }
    let projects = env::var(PROJECTS_ENV).ok()?;
    let projects = split_list(&projects);
    project_from_path(input, &projects)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// The output path usually does not exist yet, so compare canonical forms
// only when both resolve.
fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_drops_blanks() {
        assert_eq!(split_list("alpha, beta,,gamma "), ["alpha", "beta", "gamma"]);
        assert!(split_list(" ,, ").is_empty());
    }

    #[test]
    fn same_path_matches_identical_spellings() {
        assert!(same_path(Path::new("a/b.ckl"), Path::new("a/b.ckl")));
        assert!(!same_path(Path::new("a/b.ckl"), Path::new("a/b.csv")));
    }
}
