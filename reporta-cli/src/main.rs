//! FILENAME: reporta-cli/src/main.rs
//! Reporta CLI - render band-based reports from the command line.
//!
//! Two subcommands:
//! - `render`: load a JSON report definition plus a JSON/CSV record file
//!   and write the report; the output extension picks the writer.
//! - `inspect`: print a summary of a report definition and validate it.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use band_engine::{Report, ReportBand};
use generators::{
    generate_by, CsvGenerator, HtmlGenerator, PdfGenerator, TextGenerator, XlsxGenerator,
};
use model::Record;

mod input;

/// Reporta - band-based report generation
#[derive(Parser, Debug)]
#[command(name = "reporta")]
#[command(about = "Render band-based reports to PDF, text, HTML, CSV or XLSX", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a report definition over a record file
    Render(RenderArgs),
    /// Summarize and validate a report definition
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Path to the report definition (JSON)
    #[arg(short, long, value_name = "FILE")]
    report: PathBuf,

    /// Path to the records (JSON array of objects, or CSV with a header row)
    #[arg(short = 'd', long = "data", value_name = "FILE")]
    records: PathBuf,

    /// Output file; its extension picks the format unless --format is given
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Output format: pdf, txt, html, csv or xlsx
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<String>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Path to the report definition (JSON)
    #[arg(short, long, value_name = "FILE")]
    report: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    log::info!("Reporta v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Command::Render(args) => render_command(args),
        Command::Inspect(args) => inspect_command(args),
    }
}

fn render_command(args: &RenderArgs) -> Result<()> {
    let report = input::load_report(&args.report)?;
    report
        .validate()
        .with_context(|| format!("invalid report definition {:?}", args.report))?;

    let records = input::load_records(&args.records)?;
    log::info!("loaded {} records from {:?}", records.len(), args.records);

    let format = match &args.format {
        Some(format) => format.to_lowercase(),
        None => output_format(&args.output)?,
    };
    write_output(&report, &records, &format, &args.output)?;
    println!("wrote {}", args.output.display());
    Ok(())
}

/// Picks the writer for a format name and runs the full pipeline.
fn write_output(report: &Report, records: &[Record], format: &str, output: &Path) -> Result<()> {
    match format {
        "pdf" => generate_by(report, records, &PdfGenerator::new(), output)?,
        "txt" | "text" => generate_by(report, records, &TextGenerator::new(), output)?,
        "html" | "htm" => generate_by(report, records, &HtmlGenerator::new(), output)?,
        "csv" => generate_by(report, records, &CsvGenerator::new(), output)?,
        "xlsx" => generate_by(report, records, &XlsxGenerator::new(), output)?,
        other => bail!("unsupported output format {:?} (expected pdf, txt, html, csv or xlsx)", other),
    }
    Ok(())
}

fn output_format(path: &Path) -> Result<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .context("output path has no extension; pass --format")
}

fn inspect_command(args: &InspectArgs) -> Result<()> {
    let report = input::load_report(&args.report)?;

    let (page_width, page_height) = report.page_size.dimensions();
    println!("Report: {}", report.title);
    if !report.author.is_empty() {
        println!("Author: {}", report.author);
    }
    println!("Page:   {:.1} x {:.1} pt (printable {:.1} x {:.1} pt)",
        page_width,
        page_height,
        report.printable_width(),
        report.printable_height()
    );

    println!("Bands:");
    print_band("page header", report.band_page_header.as_ref());
    print_band("page footer", report.band_page_footer.as_ref());
    print_band("begin", report.band_begin.as_ref());
    print_band("summary", report.band_summary.as_ref());
    print_band("detail", report.band_detail.as_ref());

    if !report.groups.is_empty() {
        println!("Groups:");
        for group in &report.groups {
            println!("  {}", group.attribute_name);
            print_band("  header", group.band_header.as_ref());
            print_band("  footer", group.band_footer.as_ref());
        }
    }

    match report.validate() {
        Ok(()) => {
            println!("Definition is valid.");
            Ok(())
        }
        Err(error) => Err(error).with_context(|| format!("invalid report definition {:?}", args.report)),
    }
}

fn print_band(name: &str, band: Option<&ReportBand>) {
    match band {
        Some(band) => println!(
            "  {:<12} {:>6.1} pt, {} element(s)",
            name,
            band.total_height(),
            element_count(band)
        ),
        None => println!("  {:<12} -", name),
    }
}

fn element_count(band: &ReportBand) -> usize {
    band.elements.len()
        + band
            .child_bands
            .iter()
            .map(element_count)
            .sum::<usize>()
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

// ============================================================================
// TESTS
// ============================================================================
