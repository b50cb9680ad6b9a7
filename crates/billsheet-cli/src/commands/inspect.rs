//! Inspect command - dump per-sheet extraction results for one workbook.
//!
//! Useful when a new export format arrives and the table heuristics need
//! checking before a full run.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use billsheet_core::{SheetExtraction, SheetExtractor, Workbook};

use super::load_config;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input workbook file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let workbook = Workbook::open(&args.input)?;
    info!(
        "Inspecting workbook '{}' ({} sheets)",
        workbook.name,
        workbook.sheets.len()
    );

    let extractor = SheetExtractor::new(&workbook.name).with_config(config);
    let extractions: Vec<SheetExtraction> = workbook
        .sheets
        .iter()
        .map(|grid| extractor.extract(grid))
        .collect();

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&extractions)?,
        OutputFormat::Text => format_text(&workbook, &extractions),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn format_text(workbook: &Workbook, extractions: &[SheetExtraction]) -> String {
    let mut out = String::new();

    out.push_str(&format!("Workbook: {}\n", workbook.name));
    out.push_str(&format!("Category: {}\n", workbook.category));
    out.push_str(&format!(
        "Invoice month: {}\n",
        if workbook.invoice_month.is_empty() {
            "(not found)"
        } else {
            workbook.invoice_month.as_str()
        }
    ));
    out.push('\n');

    for extraction in extractions {
        let meta = &extraction.metadata;
        out.push_str(&format!("Sheet: {}\n", meta.sheet_name));
        out.push_str(&format!("  PI:         {}\n", meta.pi));
        out.push_str(&format!("  Study Name: {}\n", meta.study_name));
        out.push_str(&format!("  Study Code: {}\n", meta.study_code));
        out.push_str(&format!("  IRB No:     {}\n", meta.irb_no));
        out.push_str(&format!("  KFS No:     {}\n", meta.kfs_no));
        out.push_str(&format!(
            "  Rows: {} extracted, {} dropped, {} raw\n",
            extraction.rows.len(),
            extraction.dropped_row_count,
            extraction.raw_row_count
        ));
        out.push('\n');
    }

    out
}
