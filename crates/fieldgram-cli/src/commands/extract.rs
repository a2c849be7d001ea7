//! Extract command - candidate n-grams from a single document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use super::output::{format_ngrams, OutputFormat};
use super::pipeline::{is_supported, load_config, Pipeline, SourceArgs};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (PDF, page image, or JSON words file)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Only emit n-grams carrying a date or amount
    #[arg(long)]
    candidates_only: bool,

    #[command(flatten)]
    source: SourceArgs,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if !is_supported(&args.input) {
        anyhow::bail!("Unsupported file format: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );

    let mut pipeline = Pipeline::new(config, args.source.clone())?;

    pb.set_message("Reading words...");
    let pages = pipeline.read_pages(&args.input)?;
    debug!("Read {} pages", pages.len());

    pb.set_message("Extracting candidates...");
    let document = pipeline.extract_pages(&pages)?;

    pb.finish_and_clear();

    for failure in &document.failures {
        eprintln!(
            "{} Skipped page {}: {}",
            style("⚠").yellow(),
            failure.page,
            failure.error
        );
    }

    let results = &document.pages;
    let output = format_ngrams(results, args.format, args.candidates_only)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    let candidates: usize = results.iter().map(|r| r.candidates().count()).sum();
    eprintln!(
        "{} {} candidates on {} of {} pages in {:?}",
        style("ℹ").blue(),
        candidates,
        results.len(),
        pages.len(),
        start.elapsed()
    );

    Ok(())
}
