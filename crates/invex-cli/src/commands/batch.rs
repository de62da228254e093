//! Batch processing command for multiple page-text files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use invex_core::{ExtractionResult, InvoiceParser, PageInvoiceParser};

use super::process::{format_result, load_document, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching .json or .txt inputs
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers (default: batch.jobs from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    extraction: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let jobs = args.jobs.unwrap_or(config.batch.jobs);
    if jobs == 0 {
        anyhow::bail!("--jobs must be at least 1");
    }
    let continue_on_error = args.continue_on_error || config.batch.continue_on_error;

    // Expand glob pattern
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "json" | "txt")
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    // One blocking task per file, at most `jobs` running at once
    let parser = Arc::new(PageInvoiceParser::from_config(&config.extraction));
    let semaphore = Arc::new(Semaphore::new(jobs));
    let mut handles = Vec::with_capacity(files.len());

    for path in files {
        let permit = semaphore.clone().acquire_owned().await?;
        let parser = parser.clone();

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let file_start = Instant::now();
            let outcome = process_single_file(&path, &parser);
            let processing_time_ms = file_start.elapsed().as_millis() as u64;

            match outcome {
                Ok(extraction) => FileResult {
                    path,
                    extraction: Some(extraction),
                    error: None,
                    processing_time_ms,
                },
                Err(e) => FileResult {
                    path,
                    extraction: None,
                    error: Some(e.to_string()),
                    processing_time_ms,
                },
            }
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle.await?;
        overall_pb.inc(1);

        if let Some(error_msg) = &result.error {
            if continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                overall_pb.abandon();
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        } else {
            debug!(
                "Processed {} in {}ms",
                result.path.display(),
                result.processing_time_ms
            );
        }

        results.push(result);
    }

    overall_pb.finish_with_message("Complete");

    // Write outputs
    let successful: Vec<_> = results.iter().filter(|r| r.extraction.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            if let Some(extraction) = &result.extraction {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("invoice");

                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));
                let content = format_result(extraction, args.format, false)?;

                fs::write(&output_path, content)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let duplicates = duplicate_invoice_numbers(&results);
    if !duplicates.is_empty() {
        println!();
        println!("{}", style("Duplicate invoice numbers:").yellow());
        for (number, paths) in &duplicates {
            warn!("Invoice number {} appears in {} files", number, paths.len());
            println!("  - {}: {}", number, paths.join(", "));
        }
    }

    // Print summary
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(path: &Path, parser: &PageInvoiceParser) -> anyhow::Result<ExtractionResult> {
    let document = load_document(path, None)?;
    Ok(parser.parse(&document)?)
}

/// Invoice numbers extracted from more than one file.
fn duplicate_invoice_numbers(results: &[FileResult]) -> BTreeMap<String, Vec<String>> {
    let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for result in results {
        let number = result
            .extraction
            .as_ref()
            .and_then(|e| e.header.invoice_number.clone());

        if let Some(number) = number {
            seen.entry(number)
                .or_default()
                .push(result.path.display().to_string());
        }
    }

    seen.retain(|_, paths| paths.len() > 1);
    seen
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "file",
        "status",
        "invoice_number",
        "project_id",
        "date",
        "currency",
        "credit_note",
        "items",
        "total",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(extraction) = &result.extraction {
            let header = &extraction.header;
            let items = extraction.records.iter().filter(|r| r.is_line_item()).count();

            wtr.write_record([
                filename,
                "success",
                header.invoice_number.as_deref().unwrap_or(""),
                header.project_id.as_deref().unwrap_or(""),
                header.date_of_invoice.as_deref().unwrap_or(""),
                header.currency.as_deref().unwrap_or(""),
                &header.credit_note.to_string(),
                &items.to_string(),
                &extraction
                    .total
                    .as_ref()
                    .map(|t| t.amount.to_string())
                    .unwrap_or_default(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
