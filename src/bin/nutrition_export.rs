//! Extract products from a saved page and write the JSON export, or merge
//! several per-page exports into one country-tagged list

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nutrition_scraper::export::{
    country_counts, merge_exports, to_pretty_json, write_export, write_merged, MERGED_FILE_NAME,
};
use nutrition_scraper::{invoke, ExtractorConfig, InvocationOutcome, PageContext};

#[derive(Parser, Debug)]
#[command(name = "nutrition-export", about = "Extract nutrition facts from product pages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract products from one saved page
    Extract(ExtractArgs),

    /// Concatenate per-page exports and tag each product with its country
    Merge {
        /// Export files, processed in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Where to write the combined list
        #[arg(short, long, default_value = MERGED_FILE_NAME)]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Saved HTML of the product page
    #[arg(short, long)]
    input: PathBuf,

    /// URL the page was loaded from, used to resolve image links
    #[arg(short, long)]
    url: Option<String>,

    /// JSON file overriding selectors, labels or markers
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to write the export into
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Print the JSON instead of writing a file
    #[arg(long)]
    stdout: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Extract(args) => extract(args),
        Command::Merge { inputs, output } => merge(&inputs, output),
    }
}

fn extract(args: ExtractArgs) -> Result<()> {
    let html = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read HTML file: {}", args.input.display()))?;
    let config = match &args.config {
        Some(path) => ExtractorConfig::from_path(path)?,
        None => ExtractorConfig::default(),
    };

    let page = PageContext {
        url: args.url,
        html: Some(html),
    };
    let products = invoke(&page, &config).context("Extraction failed")?;

    let outcome = InvocationOutcome::from_records(&products);
    eprintln!("{}", outcome);

    if args.stdout {
        println!("{}", to_pretty_json(&products)?);
        return Ok(());
    }

    if !outcome.can_export() {
        bail!("nothing to export");
    }
    let path = write_export(&args.out_dir, &products)?;
    eprintln!("Wrote {}", path.display());
    Ok(())
}

fn merge(inputs: &[PathBuf], output: PathBuf) -> Result<()> {
    let merged = merge_exports(inputs);
    write_merged(&output, &merged)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    eprintln!("Total products processed: {}", merged.len());
    eprintln!("Wrote {}", output.display());
    eprintln!("Country distribution:");
    for (country, count) in country_counts(&merged) {
        eprintln!("  {}: {} products", country, count);
    }
    Ok(())
}
