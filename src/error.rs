//! Error taxonomy shared by the loader, validator, builder and sink.
//!
//! Parse and shape failures stop at the first problem. Field-level validation
//! collects every violation for an entry into a [`ValidationReport`] so a single
//! run can print one line per problem.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("entry cannot have both 'image' and 'url' fields")]
    ShapeConflict,
    #[error("entry must have either 'image' or 'url' field")]
    ShapeMissing,
    #[error("entry document must be a YAML mapping")]
    NotAMapping,
    #[error("failed to parse YAML: {source}")]
    Parse {
        #[from]
        source: serde_yaml::Error,
    },
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("validation failed:\n{0}")]
    Validation(ValidationReport),
    #[error("catalog failed schema validation:\n{details}")]
    Schema { details: String },
    #[error("entry name '{name}' declared by {} is already used by {}", second.display(), first.display())]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<CatalogError>,
    },
    #[error("catalog JSON error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn at(self, path: impl Into<PathBuf>) -> Self {
        CatalogError::Load {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The validation report behind this error, looking through load context.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            CatalogError::Validation(report) => Some(report),
            CatalogError::Load { source, .. } => source.report(),
            _ => None,
        }
    }

    /// One human-readable line per problem, for CLI output.
    pub fn report_lines(&self) -> Vec<String> {
        match self {
            CatalogError::Load { path, source } => source
                .report_lines()
                .into_iter()
                .map(|line| format!("{}: {line}", path.display()))
                .collect(),
            CatalogError::Validation(report) => {
                report.violations().iter().map(ToString::to_string).collect()
            }
            CatalogError::Schema { details } => details.lines().map(str::to_string).collect(),
            other => vec![other.to_string()],
        }
    }
}

impl From<ValidationReport> for CatalogError {
    fn from(report: ValidationReport) -> Self {
        CatalogError::Validation(report)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ViolationKind {
    /// A required field is absent or empty.
    FieldMissing,
    /// A present field breaks an enumeration or cross-field rule.
    FieldInvalid(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
/// One broken constraint, attributed to an entry and the field at fault.
pub struct Violation {
    pub entry: String,
    pub field: String,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn missing(entry: &str, field: impl Into<String>) -> Self {
        Self {
            entry: entry.to_string(),
            field: field.into(),
            kind: ViolationKind::FieldMissing,
        }
    }

    pub fn invalid(entry: &str, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            entry: entry.to_string(),
            field: field.into(),
            kind: ViolationKind::FieldInvalid(reason.into()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.kind, ViolationKind::FieldMissing)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::FieldMissing => {
                write!(f, "entry '{}': {} is required", self.entry, self.field)
            }
            ViolationKind::FieldInvalid(reason) => {
                write!(f, "entry '{}': {}: {reason}", self.entry, self.field)
            }
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
/// Every violation found in one validation pass.
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.violations.extend(other.violations);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Ok when nothing was recorded; otherwise the report itself as the error.
    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, violation) in self.violations.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}
