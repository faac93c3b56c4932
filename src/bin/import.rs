//! Splits an existing `registry.json` into `<root>/<name>/spec.yaml`
//! directories, one per entry. Entries that fail to write are reported and
//! skipped; the run exits 1 if any did.

use anyhow::{Context, Result, bail};
use catalog_builder::CatalogError;
use catalog_builder::config::DEFAULT_REGISTRY_DIR;
use catalog_builder::import::{load_catalog, plan_import, write_spec};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog-import", version, about = "Split a catalog file into entry directories")]
struct Cli {
    /// Catalog document to import (e.g. build/registry.json)
    #[arg(short, long)]
    file: PathBuf,

    /// Catalog root to create entry directories in
    #[arg(short, long, env = "CATALOG_ROOT", default_value = DEFAULT_REGISTRY_DIR)]
    output: PathBuf,

    /// Print every entry and its destination
    #[arg(short, long)]
    verbose: bool,

    /// Show what would be written without touching the filesystem
    #[arg(long)]
    dry_run: bool,

    #[arg(long, env = "CATALOG_LOG", default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(err) = run(cli) {
        match err.downcast_ref::<CatalogError>() {
            Some(catalog_err) => {
                for line in catalog_err.report_lines() {
                    eprintln!("{line}");
                }
            }
            None => eprintln!("{err:#}"),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let catalog = load_catalog(&cli.file)?;
    let source = cli.file.display().to_string();
    let specs = plan_import(&catalog, &cli.output, &source, Utc::now())?;
    println!("Found {} registry entries to import", specs.len());

    if cli.dry_run {
        println!("Would create the following structure:");
        for spec in &specs {
            println!("  {} -> {}", spec.name, spec.path.display());
        }
        return Ok(());
    }

    let mut failed = 0;
    for spec in &specs {
        match write_spec(spec).with_context(|| format!("importing '{}'", spec.name)) {
            Ok(()) => {
                if cli.verbose {
                    println!("  {} -> {}", spec.name, spec.path.display());
                }
                info!(entry = %spec.name, path = %spec.path.display(), "imported entry");
            }
            Err(err) => {
                warn!("{err:#}");
                failed += 1;
            }
        }
    }

    println!(
        "Imported {}/{} entries to {}",
        specs.len() - failed,
        specs.len(),
        cli.output.display()
    );
    if failed > 0 {
        bail!("{failed} entries could not be imported");
    }
    Ok(())
}
