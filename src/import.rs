//! Splits a built catalog back into one `spec.yaml` per entry.
//!
//! Importing and then building again yields the same catalog: every entry
//! carries its catalog key as an explicit `name`, so directory names may be
//! sanitized freely.

use crate::builder::Catalog;
use crate::error::{CatalogError, Result, ValidationReport, Violation};
use crate::loader::SPEC_FILE_NAME;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One entry ready to be written under the catalog root.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImportedSpec {
    pub name: String,
    pub dir_name: String,
    pub path: PathBuf,
    pub contents: String,
}

/// Read a catalog document such as `registry.json`. The `$schema` key is
/// ignored.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path).map_err(|err| CatalogError::io(path, err))?;
    parse_catalog(&raw).map_err(|err| err.at(path))
}

pub fn parse_catalog(raw: &str) -> Result<Catalog> {
    Ok(serde_json::from_str(raw)?)
}

/// Lowercase, map separators to `-`, drop anything outside `[a-z0-9-]`, and
/// collapse and trim dashes.
pub fn sanitize_entry_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        let ch = match ch {
            ' ' | '_' | '.' | '/' | '\\' => '-',
            other => other.to_ascii_lowercase(),
        };
        if !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-') {
            continue;
        }
        if ch == '-' && out.ends_with('-') {
            continue;
        }
        out.push(ch);
    }
    out.trim_matches('-').to_string()
}

/// Render every catalog entry as a spec file under `root`. Names that
/// sanitize to nothing, or onto a directory another entry already claimed,
/// are reported together.
pub fn plan_import(
    catalog: &Catalog,
    root: &Path,
    source: &str,
    imported_at: DateTime<Utc>,
) -> Result<Vec<ImportedSpec>> {
    let stamp = imported_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut claimed: BTreeMap<String, &str> = BTreeMap::new();
    let mut report = ValidationReport::new();
    let mut specs = Vec::with_capacity(catalog.len());

    let containers = catalog.servers.iter().map(|(name, entry)| {
        let mut entry = entry.clone();
        entry.name = Some(name.clone());
        (name, serde_yaml::to_string(&entry))
    });
    let remotes = catalog.remote_servers.iter().map(|(name, entry)| {
        let mut entry = entry.clone();
        entry.name = Some(name.clone());
        (name, serde_yaml::to_string(&entry))
    });

    for (name, rendered) in containers.chain(remotes) {
        let dir_name = sanitize_entry_name(name);
        if dir_name.is_empty() {
            report.push(Violation::invalid(
                name,
                "name",
                "has no characters usable in a directory name",
            ));
            continue;
        }
        if let Some(other) = claimed.insert(dir_name.clone(), name.as_str()) {
            report.push(Violation::invalid(
                name,
                "name",
                format!("maps to directory '{dir_name}' already used by '{other}'"),
            ));
            continue;
        }
        let path = root.join(&dir_name).join(SPEC_FILE_NAME);
        let contents = format!("{}{}", header(name, source, &stamp), rendered?);
        specs.push(ImportedSpec {
            name: name.clone(),
            dir_name,
            path,
            contents,
        });
    }

    if !report.is_empty() {
        return Err(CatalogError::Validation(report));
    }
    Ok(specs)
}

/// Write one planned spec, creating its entry directory. An existing spec is
/// replaced.
pub fn write_spec(spec: &ImportedSpec) -> Result<()> {
    if let Some(dir) = spec.path.parent() {
        fs::create_dir_all(dir).map_err(|err| CatalogError::io(dir, err))?;
    }
    if spec.path.exists() {
        debug!(path = %spec.path.display(), "replacing existing spec");
    }
    fs::write(&spec.path, &spec.contents).map_err(|err| CatalogError::io(&spec.path, err))
}

fn header(name: &str, source: &str, stamp: &str) -> String {
    format!("# {name} catalog entry\n# Imported from {source}\n# Import timestamp: {stamp}\n# ---\n")
}
