//! langlabel-rewrite CLI - Label highlighted code blocks in rendered HTML.

use anyhow::{Context, Result, bail};
use facet::Facet;
use facet_args as args;
use langlabel_rewrite::{Config, ProcessOptions, Processor};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Add data-lang labels to highlighted code blocks in rendered HTML.
///
/// Every element matching the selector whose class contains `language-<name>`
/// gets a `data-lang="<name>"` attribute.
#[derive(Debug, Facet)]
struct Args {
    /// Input directory containing rendered HTML (e.g., _site)
    #[facet(args::positional)]
    input: PathBuf,

    /// Output directory (defaults to modifying input in place)
    #[facet(args::positional, default)]
    output: Option<PathBuf>,

    /// TOML file with `attribute` and `selector` overrides
    #[facet(args::named, args::short = 'c', default)]
    config: Option<PathBuf>,

    /// Attribute that receives the label (overrides the config file)
    #[facet(args::named, default)]
    attribute: Option<String>,

    /// CSS selector for candidate elements (overrides the config file)
    #[facet(args::named, default)]
    selector: Option<String>,

    /// Show verbose output
    #[facet(args::named, args::short = 'v', default)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args: Args = facet_args::from_std_args()?;

    init_tracing(args.verbose);

    // Validate input directory
    if !args.input.exists() {
        bail!("Input directory does not exist: {}", args.input.display());
    }

    if !args.input.is_dir() {
        bail!("Input path is not a directory: {}", args.input.display());
    }

    let config = load_config(&args)?;

    let options = ProcessOptions {
        input_dir: args.input.clone(),
        output_dir: args.output.clone(),
        config,
        progress: !args.verbose,
    };

    let mut processor = Processor::new(options);

    // Print header
    eprintln!(
        "{} Labelling code blocks: {}",
        "langlabel-rewrite".green().bold(),
        args.input.display()
    );

    if let Some(out) = &args.output {
        eprintln!("  Output: {}", out.display());
    } else {
        eprintln!("  {} Modifying in place", "Note:".yellow());
    }

    eprintln!();

    // Process
    let start = Instant::now();
    let stats = processor.process()?;
    let elapsed = start.elapsed();

    // Print results
    eprintln!("{}", "Results:".bold());
    eprintln!(
        "  {} HTML files processed ({} changed)",
        stats.files_processed.to_string().cyan(),
        stats.files_changed.to_string().cyan()
    );
    eprintln!(
        "  {} code blocks labelled",
        stats.blocks_labelled.to_string().green()
    );
    eprintln!(
        "  {} candidate blocks skipped (no language class)",
        stats.blocks_skipped.to_string().yellow()
    );

    if !stats.languages.is_empty() {
        eprintln!("  Languages: {}", stats.languages.join(", "));
    }

    eprintln!(
        "\n  Completed in {:.2}s ({:.1} MB/s)",
        elapsed.as_secs_f64(),
        stats.throughput_mb_s()
    );

    Ok(())
}

/// Defaults, then the config file, then command-line overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(attribute) = &args.attribute {
        config.attribute = attribute.clone();
    }
    if let Some(selector) = &args.selector {
        config.selector = selector.clone();
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
