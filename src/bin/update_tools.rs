//! Reconciles the `tools` list of one `spec.yaml` with a captured tool
//! listing (JSON or table output of `mcp list`).
//!
//! When the listing is empty but the entry declares tools, the declared list is
//! kept and a dated warning comment is added to the file instead.

use anyhow::{Context, Result, bail};
use catalog_builder::enrich::{CapturedListing, ToolReconciliation, reconcile_tools};
use catalog_builder::spec_edit::{add_warning_comment, update_spec_tools};
use catalog_builder::{Loader, ToolProbe};
use chrono::Utc;
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog-update-tools", version, about = "Refresh the tools list of a catalog entry")]
struct Cli {
    /// Path to the entry's spec.yaml
    spec: PathBuf,

    /// Captured listing output, or `-` for stdin
    #[arg(long)]
    listing: String,

    /// Report changes without writing
    #[arg(long)]
    dry_run: bool,

    /// Do not annotate spec.yaml when the listing comes back empty
    #[arg(long)]
    no_warnings: bool,

    #[arg(long, env = "CATALOG_LOG", default_value = "info")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    if let Err(err) = run(cli) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let spec = fs::canonicalize(&cli.spec)
        .with_context(|| format!("resolving {}", cli.spec.display()))?;
    let Some(entry_dir) = spec.parent() else {
        bail!("{} is not inside an entry directory", spec.display());
    };
    let Some(dir_name) = entry_dir.file_name().and_then(|name| name.to_str()) else {
        bail!("{} is not inside an entry directory", spec.display());
    };
    let entry = Loader::new(entry_dir)
        .load_entry(&spec, dir_name)
        .with_context(|| format!("loading {}", spec.display()))?;
    let name = entry.name().unwrap_or(dir_name).to_string();

    let listing = read_listing(&cli.listing)?;
    let probed = CapturedListing::new(listing)
        .probe(&name, &entry)
        .with_context(|| format!("reading tools for '{name}'"))?;
    info!(entry = %name, declared = entry.tools().len(), probed = probed.len(), "comparing tools");

    match reconcile_tools(entry.tools(), &probed) {
        ToolReconciliation::Unchanged => info!(entry = %name, "tools list is up to date"),
        ToolReconciliation::KeptDeclared => {
            warn!(entry = %name, "listing returned no tools; keeping the declared list");
            if cli.no_warnings || cli.dry_run {
                return Ok(());
            }
            add_warning_comment(
                &spec,
                "Tool list could not be auto-updated",
                "Please verify the tools list manually",
                Utc::now().date_naive(),
            )?;
        }
        ToolReconciliation::Updated {
            added,
            removed,
            tools,
        } => {
            for tool in &added {
                println!("+ {tool}");
            }
            for tool in &removed {
                println!("- {tool}");
            }
            if cli.dry_run {
                info!(entry = %name, "dry run; spec left unchanged");
                return Ok(());
            }
            update_spec_tools(&spec, &tools)?;
            info!(entry = %name, added = added.len(), removed = removed.len(), "updated tools list");
        }
    }
    Ok(())
}

fn read_listing(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading listing from stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(source).with_context(|| format!("reading listing {source}"))
}
