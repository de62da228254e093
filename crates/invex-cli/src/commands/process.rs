//! Process command - extract records from a single page-text file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{debug, info};

use invex_core::{format_amount, ExtractionResult, InvoiceDocument, InvoiceParser, PageInvoiceParser};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (.json page list or form-feed separated .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Source file name recorded on every record
    #[arg(long)]
    file_name: Option<String>,

    /// Compare the invoice total with the sum of line item totals
    #[arg(long)]
    validate: bool,

    /// Emit the full extraction result instead of the records
    #[arg(long)]
    details: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension used for batch outputs.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );

    pb.set_message("Loading pages...");
    let document = load_document(&args.input, args.file_name.as_deref())?;
    debug!("Document has {} pages", document.page_count());

    pb.set_message("Extracting invoice data...");
    let parser = PageInvoiceParser::from_config(&config.extraction);
    let result = parser.parse(&document)?;

    pb.finish_and_clear();

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    // Validate if requested
    if args.validate {
        let issues = validation_issues(&result);
        if issues.is_empty() {
            eprintln!("{} Totals are consistent", style("✓").green());
        } else {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    // Format output
    let output = format_result(&result, args.format, args.details)?;

    // Write output
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

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read a page-text document from a `.json` or `.txt` file.
///
/// `file_name` overrides the name found in the file or taken from the path.
pub fn load_document(path: &Path, file_name: Option<&str>) -> anyhow::Result<InvoiceDocument> {
    let path_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut document = match extension.as_str() {
        "json" => {
            let content = fs::read_to_string(path)?;
            let value: serde_json::Value = serde_json::from_str(&content)?;
            InvoiceDocument::from_json_value(&value, path_name)?
        }
        "txt" => {
            let content = fs::read_to_string(path)?;
            InvoiceDocument::from_form_feed_text(path_name, &content)
        }
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    if let Some(name) = file_name {
        document.file_name = name.to_string();
    }

    Ok(document)
}

/// Compare the resolved total with the sum of line item totals.
pub fn validation_issues(result: &ExtractionResult) -> Vec<String> {
    let mut issues = Vec::new();

    let items: Vec<Decimal> = result
        .records
        .iter()
        .filter_map(|r| r.position_total)
        .collect();

    let Some(total) = &result.total else {
        issues.push("No invoice total to validate against".to_string());
        return issues;
    };

    if items.is_empty() {
        issues.push("No line items to validate".to_string());
        return issues;
    }

    let sum: Decimal = items.iter().sum();
    if sum != total.amount {
        issues.push(format!(
            "Line items sum to {} but the {:?} on page {} is {}",
            format_amount(sum),
            total.kind,
            total.page_number,
            format_amount(total.amount)
        ));
    }

    issues
}

/// Render an extraction result in the requested format.
pub fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    details: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if details => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&result.records)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result, details)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    for record in &result.records {
        wtr.serialize(record)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult, details: bool) -> String {
    let header = &result.header;
    let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let mut output = String::new();

    output.push_str(&format!("File: {}\n", header.file_name));
    output.push_str(&format!(
        "Invoice: {}{}\n",
        or_dash(&header.invoice_number),
        if header.credit_note { " (credit note)" } else { "" }
    ));
    output.push_str(&format!("Project: {}\n", or_dash(&header.project_id)));
    output.push_str(&format!("Customer: {}\n", or_dash(&header.customer_id)));
    output.push_str(&format!(
        "Date: {} ({})\n",
        or_dash(&header.date_of_invoice),
        or_dash(&header.month_of_invoice)
    ));
    output.push_str(&format!("Currency: {}\n", or_dash(&header.currency)));
    output.push_str(&format!("VAT ID: {}\n", or_dash(&header.vat)));

    match &result.total {
        Some(total) => output.push_str(&format!(
            "Total: {} ({:?}, page {})\n",
            format_amount(total.amount),
            total.kind,
            total.page_number
        )),
        None => output.push_str("Total: -\n"),
    }
    output.push('\n');

    let items: Vec<_> = result.records.iter().filter(|r| r.is_line_item()).collect();
    if items.is_empty() {
        output.push_str("No line items\n");
    } else {
        output.push_str("Line items:\n");
        for record in items {
            output.push_str(&format!(
                "  {} {} x{} {} [{:?}] {}\n",
                record.position.as_deref().unwrap_or(""),
                record.position_description.as_deref().unwrap_or(""),
                record.position_quantity.unwrap_or_default(),
                format_amount(record.position_total.unwrap_or_default()),
                record.type_cost.unwrap_or(invex_core::CostType::Internal),
                record.service_provision_period.as_deref().unwrap_or(""),
            ));
        }
    }

    if details {
        output.push_str("\nPages:\n");
        for page in &result.pages {
            output.push_str(&format!(
                "  {}: {} | {} candidate lines, {} items via {:?} | {} total candidates\n",
                page.page_number,
                page.service_period,
                page.candidate_lines,
                page.line_items,
                page.strategy,
                page.total_candidates.len()
            ));
        }
    }

    if !result.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &result.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(pages: &[&str]) -> ExtractionResult {
        let document = InvoiceDocument::new(
            "test.pdf",
            pages.iter().map(|p| p.to_string()).collect(),
        );
        PageInvoiceParser::new().parse(&document).unwrap()
    }

    #[test]
    fn test_validation_passes_when_sums_match() {
        let result = extract(&[
            "0010 123456 Application hosting 2 PC 21%(V1) 1.000,00 2.000,00\nTotal 2.000,00",
        ]);
        assert!(validation_issues(&result).is_empty());
    }

    #[test]
    fn test_validation_reports_mismatch() {
        let result = extract(&[
            "0010 123456 Application hosting 2 PC 21%(V1) 1.000,00 2.000,00\nTotal 2.420,00",
        ]);
        let issues = validation_issues(&result);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("2.000,00"));
        assert!(issues[0].contains("2.420,00"));
    }

    #[test]
    fn test_csv_uses_camel_case_header() {
        let result = extract(&["Invoice No. 42\nTotal 10,00"]);
        let csv = format_result(&result, OutputFormat::Csv, false).unwrap();
        let header = csv.lines().next().unwrap();

        assert!(header.starts_with("fileName,projectId,invoiceNumber"));
        assert!(header.ends_with("extractedInvoiceTotal"));
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn test_text_summary() {
        let result = extract(&["Credit Note No. 42\nTotal 10,00-"]);
        let text = format_result(&result, OutputFormat::Text, false).unwrap();

        assert!(text.contains("Invoice: 42 (credit note)"));
        assert!(text.contains("Total: 10,00-"));
        assert!(text.contains("No line items"));
    }
}
