//! Service catalog builder.
//!
//! Authors keep one `spec.yaml` per entry under a catalog root. The crate
//! loads those documents, validates them, fills defaults and writes a single
//! JSON catalog for the runtime that consumes it, and can split an existing
//! catalog back into entry directories. The binaries in `src/bin`
//! are thin wrappers around the functions exported here.

pub mod builder;
pub mod config;
pub mod enrich;
pub mod entry;
pub mod error;
pub mod import;
pub mod loader;
pub mod schema;
pub mod sink;
pub mod spec_edit;
pub mod validation;

pub use builder::{Builder, CATALOG_VERSION, Catalog};
pub use config::{BuildConfig, OutputFormat};
pub use enrich::{MetricsSource, ToolProbe};
pub use entry::{ContainerEntry, Entry, EntryKind, RemoteEntry, Status, Tier, Transport};
pub use error::{CatalogError, Result, ValidationReport, Violation, ViolationKind};
pub use loader::Loader;
pub use sink::{CATALOG_SCHEMA_URL, write_catalog};
pub use validation::{validate_entry, validate_normalized};

use std::path::PathBuf;
use tracing::info;

/// Load, build and write the catalog described by `config`. Returns the
/// files written, one per concrete output format.
pub fn build_catalog(
    config: &BuildConfig,
    metrics: Option<&dyn MetricsSource>,
) -> Result<Vec<PathBuf>> {
    let mut loader = Loader::new(config.registry_dir());
    loader.load_all()?;

    let mut builder = Builder::new(loader.entries());
    if let Some(source) = metrics {
        builder = builder.with_metrics_source(source);
    }
    let catalog = builder.build()?;

    let mut written = Vec::new();
    // `output_paths` yields concrete formats only, and JSON is the only one.
    for (format, path) in config.output_paths() {
        write_catalog(&catalog, &path)?;
        info!(%format, path = %path.display(), entries = catalog.len(), "wrote catalog");
        written.push(path);
    }
    Ok(written)
}
