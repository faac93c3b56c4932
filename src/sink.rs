//! JSON output for a built catalog.

use crate::builder::Catalog;
use crate::error::{CatalogError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Schema reference stamped at the top of every emitted catalog.
pub const CATALOG_SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/stacklok/toolhive/main/pkg/registry/data/schema.json";

#[derive(Serialize)]
struct Document<'a> {
    #[serde(rename = "$schema")]
    schema: &'a str,
    #[serde(flatten)]
    catalog: &'a Catalog,
}

impl<'a> Document<'a> {
    fn wrap(catalog: &'a Catalog) -> Self {
        Self {
            schema: CATALOG_SCHEMA_URL,
            catalog,
        }
    }
}

/// The wrapped catalog as a JSON value, for schema checks.
pub fn to_document(catalog: &Catalog) -> Result<Value> {
    Ok(serde_json::to_value(Document::wrap(catalog))?)
}

/// Two-space indented JSON with a trailing newline. Keys follow declaration
/// order at the top level and lexicographic order inside each section.
pub fn to_json_string(catalog: &Catalog) -> Result<String> {
    let mut rendered = serde_json::to_string_pretty(&Document::wrap(catalog))?;
    rendered.push('\n');
    Ok(rendered)
}

/// Write the catalog to `path`, creating parent directories as needed. The
/// staged file is synced to disk and then renamed over `path`, so readers
/// never see a partial document.
pub fn write_catalog(catalog: &Catalog, path: &Path) -> Result<()> {
    let rendered = to_json_string(catalog)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|err| CatalogError::io(dir, err))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| CatalogError::io(dir, err))?;
    let staged = tmp.path().to_path_buf();
    tmp.write_all(rendered.as_bytes())
        .map_err(|err| CatalogError::io(&staged, err))?;
    tmp.flush().map_err(|err| CatalogError::io(&staged, err))?;
    tmp.as_file()
        .sync_all()
        .map_err(|err| CatalogError::io(&staged, err))?;
    tmp.persist(path)
        .map_err(|err| CatalogError::io(path, err.error))?;
    Ok(())
}
