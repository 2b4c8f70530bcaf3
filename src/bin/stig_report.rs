//! Render a STIG finding catalog as a Markdown report.
//!
//! Usage:
//!   stig-report --input catalog.json --output findings.md

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use stigconv::{report, write_atomic};

#[derive(Parser, Debug)]
#[command(name = "stig-report")]
#[command(version)]
#[command(about = "Render a STIG finding catalog as Markdown")]
struct Cli {
    /// Finding catalog JSON file.
    #[arg(short, long)]
    input: PathBuf,
    /// Markdown output file.
    #[arg(short, long)]
    output: PathBuf,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let text = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let catalog = report::parse_catalog(&text)
        .with_context(|| format!("parsing catalog {}", cli.input.display()))?;
    let markdown = report::render(&catalog);
    write_atomic(&cli.output, markdown.as_bytes())
        .with_context(|| format!("writing {}", cli.output.display()))?;
    eprintln!(
        "rendered {} finding(s) to {}",
        catalog.stig.findings.len(),
        cli.output.display()
    );
    Ok(())
}
