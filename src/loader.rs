//! Discovers catalog entries on disk.
//!
//! Layout: `<root>/<entry-name>/spec.yaml`. Only the root's immediate
//! subdirectories are considered, in name order, and the first entry that
//! fails to parse or validate aborts the whole load.

use crate::entry::Entry;
use crate::error::{CatalogError, Result};
use crate::validation::validate_entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const SPEC_FILE_NAME: &str = "spec.yaml";

pub struct Loader {
    root: PathBuf,
    entries: BTreeMap<String, Entry>,
    origins: BTreeMap<String, PathBuf>,
}

impl Loader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: BTreeMap::new(),
            origins: BTreeMap::new(),
        }
    }

    pub fn load_all(&mut self) -> Result<()> {
        for dir in self.candidate_dirs()? {
            let Some(dir_name) = dir.file_name().and_then(|name| name.to_str()) else {
                warn!(path = %dir.display(), "skipping directory with a non UTF-8 name");
                continue;
            };
            let spec_path = dir.join(SPEC_FILE_NAME);
            if !spec_path.is_file() {
                debug!(path = %dir.display(), "no {SPEC_FILE_NAME}; skipping");
                continue;
            }

            let entry = self
                .load_entry(&spec_path, dir_name)
                .map_err(|err| err.at(&spec_path))?;
            let name = entry.name().unwrap_or(dir_name).to_string();
            if let Some(first) = self.origins.get(&name) {
                return Err(CatalogError::DuplicateName {
                    name,
                    first: first.clone(),
                    second: spec_path,
                });
            }
            if entry.tools().is_empty() {
                warn!(entry = %name, "no tools declared");
            }
            debug!(entry = %name, kind = entry.kind().label(), "loaded entry");
            self.origins.insert(name.clone(), spec_path);
            self.entries.insert(name, entry);
        }
        Ok(())
    }

    /// Parse and validate one `spec.yaml`. An explicit `name` in the document
    /// wins; otherwise `dir_name` is written back onto the entry.
    pub fn load_entry(&self, path: &Path, dir_name: &str) -> Result<Entry> {
        let raw = fs::read_to_string(path).map_err(|err| CatalogError::io(path, err))?;
        let mut entry = Entry::from_yaml_str(&raw)?;
        let name = match entry.name() {
            Some(explicit) => explicit.to_string(),
            None => {
                entry.set_name(dir_name);
                dir_name.to_string()
            }
        };
        validate_entry(&name, &entry)?;
        Ok(entry)
    }

    pub fn entries(&self) -> &BTreeMap<String, Entry> {
        &self.entries
    }

    pub fn sorted_entries(&self) -> Vec<(&str, &Entry)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
            .collect()
    }

    /// The `spec.yaml` an entry was read from.
    pub fn origin(&self, name: &str) -> Option<&Path> {
        self.origins.get(name).map(PathBuf::as_path)
    }

    fn candidate_dirs(&self) -> Result<Vec<PathBuf>> {
        let read_dir = fs::read_dir(&self.root).map_err(|err| CatalogError::io(&self.root, err))?;
        let mut dirs = Vec::new();
        for item in read_dir {
            let item = item.map_err(|err| CatalogError::io(&self.root, err))?;
            let path = item.path();
            let hidden = item.file_name().to_string_lossy().starts_with('.');
            if hidden || !path.is_dir() {
                continue;
            }
            dirs.push(path);
        }
        dirs.sort();
        Ok(dirs)
    }
}
