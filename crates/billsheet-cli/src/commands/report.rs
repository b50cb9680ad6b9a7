//! Report command - process billing workbooks and generate the combined report.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info};

use billsheet_core::{Combiner, ReportAssembler, SheetExtractor, Workbook};
use billsheet_core::summary::{account_level_summary, study_level_summary};

use super::{is_workbook_file, load_config};

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    /// Input workbook files or glob patterns
    #[arg(required = true)]
    input: Vec<String>,

    /// Output report file (default: timestamped name in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also export the combined table as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Also dump the run summary as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Skip workbooks that fail to open instead of aborting the run
    #[arg(long)]
    skip_bad: bool,
}

pub fn run(args: ReportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = expand_inputs(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No matching workbook files found for: {}", args.input.join(", "));
    }

    println!(
        "{} Found {} workbooks to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} workbooks")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut combiner = Combiner::new();
    let mut skipped = 0usize;

    for path in &files {
        match Workbook::open(path) {
            Ok(workbook) => {
                let extractor =
                    SheetExtractor::new(&workbook.name).with_config(config.clone());
                let sheets = workbook
                    .sheets
                    .iter()
                    .map(|grid| extractor.extract(grid))
                    .collect();
                combiner.add_workbook(&workbook.name, sheets);
                info!("Processed workbook: {}", workbook.name);
            }
            Err(e) if args.skip_bad => {
                error!("Skipping workbook {}: {}", path.display(), e);
                eprintln!("{} Skipping {}: {}", style("✗").red(), path.display(), e);
                skipped += 1;
            }
            Err(e) => {
                pb.finish_and_clear();
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to process {}", path.display())));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    for warning in combiner.validate() {
        println!("{} {}", style("⚠").yellow(), warning);
    }

    let summary = combiner.run_summary();
    let study = study_level_summary(combiner.rows());
    let account = account_level_summary(combiner.rows());

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(ReportAssembler::default_filename("banner_billings")));
    ReportAssembler::new().render_to_file(&output, &summary, &study, &account, combiner.rows())?;
    println!(
        "{} Report written to {}",
        style("✓").green(),
        output.display()
    );

    if let Some(csv_path) = &args.csv {
        write_combined_csv(csv_path, combiner.rows())?;
        println!(
            "{} Combined table exported to {}",
            style("✓").green(),
            csv_path.display()
        );
    }

    if let Some(json_path) = &args.summary_json {
        std::fs::write(json_path, serde_json::to_string_pretty(&summary)?)?;
        println!(
            "{} Run summary written to {}",
            style("✓").green(),
            json_path.display()
        );
    }

    println!(
        "{} {} files, {} sheets, {} rows extracted{}",
        style("ℹ").blue(),
        summary.total_source_files,
        summary.total_sheets_processed,
        summary.total_rows_extracted,
        if skipped > 0 {
            format!(" ({} workbooks skipped)", skipped)
        } else {
            String::new()
        }
    );

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

/// Expand input arguments (paths or glob patterns) into workbook files.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in inputs {
        for entry in glob(pattern)? {
            match entry {
                Ok(path) if is_workbook_file(&path) => files.push(path),
                Ok(path) => debug!("Ignoring non-workbook file: {}", path.display()),
                Err(e) => error!("Unreadable glob entry: {}", e),
            }
        }
    }
    Ok(files)
}

/// Export the combined table as CSV with the report's column layout.
fn write_combined_csv(
    path: &std::path::Path,
    rows: &[billsheet_core::LineItem],
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "Source Workbook",
        "Source Sheet",
        "Invoice Date",
        "Invoice Type",
        "Study Name",
        "Study Code",
        "PI",
        "IRB No",
        "KFS No",
        "Charge Amount",
        "Adjustment",
        "Balance Due",
    ])?;

    for row in rows {
        wtr.write_record([
            &row.source_workbook,
            &row.source_sheet,
            &row.invoice_month,
            &row.invoice_category,
            &row.study_name,
            &row.study_code,
            &row.pi,
            &row.irb_no,
            &row.kfs_no,
            &row.charge_amount.to_string(),
            &row.adjustment.to_string(),
            &row.balance_due.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
