//! Resolved settings for one build run.

use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_REGISTRY_DIR: &str = "registry";
pub const DEFAULT_OUTPUT_DIR: &str = "build";
pub const CATALOG_FILE_NAME: &str = "registry.json";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    /// Every concrete format.
    All,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::All => "all",
        }
    }

    /// The concrete formats this selector stands for.
    pub fn expand(self) -> &'static [OutputFormat] {
        match self {
            OutputFormat::Json | OutputFormat::All => &[OutputFormat::Json],
        }
    }

    pub fn file_name(self) -> Option<&'static str> {
        match self {
            OutputFormat::Json => Some(CATALOG_FILE_NAME),
            OutputFormat::All => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildConfig {
    pub registry_dir: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            registry_dir: PathBuf::from(DEFAULT_REGISTRY_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            format: OutputFormat::default(),
        }
    }
}

impl BuildConfig {
    pub fn new(registry_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry_dir: registry_dir.into(),
            output_dir: output_dir.into(),
            format: OutputFormat::default(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn registry_dir(&self) -> &Path {
        &self.registry_dir
    }

    /// Destination files for the selected format, one per concrete format.
    pub fn output_paths(&self) -> Vec<(OutputFormat, PathBuf)> {
        self.format
            .expand()
            .iter()
            .filter_map(|format| {
                format
                    .file_name()
                    .map(|name| (*format, self.output_dir.join(name)))
            })
            .collect()
    }
}
