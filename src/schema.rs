//! JSON Schema check for the assembled catalog document.
//!
//! The schema ships inside the binary (`schema/catalog.schema.json`) so a
//! build never depends on the working directory. Callers may load a different
//! copy from disk, e.g. a newer revision published by the downstream runtime.

use crate::error::{CatalogError, Result};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const EMBEDDED_SCHEMA: &str = include_str!("../schema/catalog.schema.json");

/// Compiled catalog schema plus the raw document it was compiled from.
#[derive(Debug)]
pub struct CatalogSchema {
    compiled: JSONSchema,
    raw: Value,
}

impl CatalogSchema {
    pub fn embedded() -> Result<Self> {
        let raw: Value = serde_json::from_str(EMBEDDED_SCHEMA).map_err(|err| {
            CatalogError::Schema {
                details: format!("embedded catalog schema is not valid JSON: {err}"),
            }
        })?;
        Self::compile(raw, "embedded catalog schema")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| CatalogError::io(path, err))?;
        let raw: Value = serde_json::from_reader(BufReader::new(file)).map_err(|err| {
            CatalogError::Schema {
                details: format!("parsing schema {}: {err}", path.display()),
            }
        })?;
        Self::compile(raw, &path.display().to_string())
    }

    fn compile(raw: Value, label: &str) -> Result<Self> {
        let compiled = JSONSchema::compile(&raw).map_err(|err| CatalogError::Schema {
            details: format!("compiling {label}: {err}"),
        })?;
        Ok(Self { compiled, raw })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Validate a wrapped catalog document, reporting every schema error.
    pub fn validate(&self, document: &Value) -> Result<()> {
        if let Err(errors) = self.compiled.validate(document) {
            let details = errors
                .map(|err| format!("{}: {err}", err.instance_path))
                .collect::<Vec<_>>()
                .join("\n");
            return Err(CatalogError::Schema { details });
        }
        Ok(())
    }
}

/// Check a wrapped catalog document against the embedded schema.
pub fn validate_document(document: &Value) -> Result<()> {
    CatalogSchema::embedded()?.validate(document)
}
