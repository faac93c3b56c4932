//! Command-line front end for the catalog pipeline.
//!
//! `build` writes the JSON catalog, `validate` runs every check without
//! writing, `list` prints what the loader found grouped by entry kind. Failures print one line per
//! problem on stderr and exit with status 1.

use anyhow::{Context, Result};
use catalog_builder::config::{DEFAULT_OUTPUT_DIR, DEFAULT_REGISTRY_DIR};
use catalog_builder::enrich::MetricsSnapshot;
use catalog_builder::{
    BuildConfig, Builder, CATALOG_VERSION, CatalogError, Entry, Loader, MetricsSource, OutputFormat,
    build_catalog,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog-builder", version, about = "Build and validate the service catalog")]
struct Cli {
    /// Catalog root holding one directory per entry
    #[arg(short, long, global = true, env = "CATALOG_ROOT", default_value = DEFAULT_REGISTRY_DIR)]
    registry: PathBuf,

    /// Show per-entry details
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log filter directive (e.g. `debug`, `catalog_builder=info`)
    #[arg(long, global = true, env = "CATALOG_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the catalog and write it to the output directory
    Build {
        #[arg(short, long, env = "CATALOG_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// JSON file of pre-fetched metrics keyed by entry name
        #[arg(long)]
        metrics: Option<PathBuf>,
    },
    /// Load and validate every entry without writing output
    Validate,
    /// List loaded entries
    List,
    /// Print version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

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

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            output_dir,
            format,
            metrics,
        } => {
            let config = BuildConfig::new(&cli.registry, output_dir).with_format(format);
            let snapshot = metrics.as_deref().map(MetricsSnapshot::load).transpose()?;
            let source = snapshot.as_ref().map(|s| s as &dyn MetricsSource);
            for path in build_catalog(&config, source)? {
                println!("wrote {}", path.display());
            }
            Ok(())
        }
        Command::Validate => {
            let mut loader = Loader::new(&cli.registry);
            loader.load_all()?;
            let catalog = Builder::new(loader.entries()).build()?;
            println!("All {} registry entries are valid", catalog.len());
            if !catalog.servers.is_empty() && !catalog.remote_servers.is_empty() {
                println!("  - {} container-based servers", catalog.servers.len());
                println!("  - {} remote servers", catalog.remote_servers.len());
            }
            if cli.verbose {
                println!("\nValidated entries:");
                for (name, entry) in loader.sorted_entries() {
                    println!("  - {name} [{}]: {}", entry.kind().label(), entry.description());
                }
            }
            Ok(())
        }
        Command::List => {
            let mut loader = Loader::new(&cli.registry);
            loader
                .load_all()
                .with_context(|| format!("listing {}", cli.registry.display()))?;
            let entries = loader.sorted_entries();
            println!("Found {} registry entries:\n", entries.len());

            let (remote, container): (Vec<_>, Vec<_>) =
                entries.into_iter().partition(|(_, entry)| entry.is_remote());
            if !container.is_empty() {
                println!("=== Container-based servers ===");
                for (name, entry) in &container {
                    print_entry(name, entry, cli.verbose);
                }
            }
            if !remote.is_empty() {
                if !container.is_empty() {
                    println!();
                }
                println!("=== Remote servers ===");
                for (name, entry) in &remote {
                    print_entry(name, entry, cli.verbose);
                }
            }
            Ok(())
        }
        Command::Version => {
            println!(
                "catalog-builder {} (catalog format {CATALOG_VERSION})",
                env!("CARGO_PKG_VERSION")
            );
            Ok(())
        }
    }
}

/// One summary line; tier and status show their defaults when unset.
fn print_entry(name: &str, entry: &Entry, verbose: bool) {
    let tier = entry.tier().cloned().unwrap_or_default();
    let status = entry.status().cloned().unwrap_or_default();
    println!(
        "{name:<30} [{}/{}] {}",
        tier.as_str(),
        status.as_str(),
        entry.locator()
    );
    if !verbose {
        return;
    }

    println!("  Type:        {}", entry.kind().label());
    println!("  Description: {}", entry.description());
    if let Some(transport) = entry.transport() {
        println!("  Transport:   {}", transport.as_str());
    }
    if !entry.tools().is_empty() {
        println!("  Tools:       {} available", entry.tools().len());
    }
    if let Some(repo) = entry.repository_url() {
        println!("  Repository:  {repo}");
    }
    if let Some(license) = entry.license() {
        println!("  License:     {license}");
    }
    if !entry.examples().is_empty() {
        println!("  Examples:    {} available", entry.examples().len());
    }
    if let Entry::Remote(remote) = entry {
        if remote.oauth_config.is_some() {
            println!("  Auth:        OAuth/OIDC configured");
        }
        if !remote.headers.is_empty() {
            println!("  Headers:     {} configured", remote.headers.len());
        }
    }
    println!();
}
