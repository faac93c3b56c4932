//! Optional collaborators that refresh data the authors do not maintain by
//! hand: usage metrics and the advertised tool list.
//!
//! Neither collaborator is allowed to fail a build. Metrics errors are logged
//! and the previous values kept; tool probing only runs from the
//! `catalog-update-tools` binary.

use crate::entry::{Entry, Metrics};
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RepositorySlug {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepositorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// `owner/repo` from a GitHub-style repository URL: the last two path
/// segments once any `.git` suffix and trailing slash are removed.
pub fn parse_repository_slug(url: &str) -> Option<RepositorySlug> {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let mut parts = trimmed.rsplit('/');
    let repo = parts.next()?;
    let owner = parts.next()?;
    if owner.is_empty() || repo.is_empty() || owner.ends_with(':') {
        return None;
    }
    Some(RepositorySlug {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

/// What a metrics source gets to look at for one entry.
#[derive(Clone, Debug)]
pub struct MetricsQuery<'a> {
    pub name: &'a str,
    pub repository: Option<RepositorySlug>,
    pub image: Option<&'a str>,
    pub current: Option<&'a Metrics>,
}

impl<'a> MetricsQuery<'a> {
    pub fn for_entry(name: &'a str, entry: &'a Entry) -> Self {
        Self {
            name,
            repository: entry.repository_url().and_then(parse_repository_slug),
            image: entry.is_container().then(|| entry.locator()),
            current: entry.metrics(),
        }
    }
}

pub trait MetricsSource {
    /// Fresh metrics for the entry, or `None` when the source has nothing.
    fn fetch(&self, query: &MetricsQuery<'_>) -> Result<Option<Metrics>>;
}

/// Metrics captured ahead of time into a JSON object keyed by entry name.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct MetricsSnapshot {
    entries: BTreeMap<String, Metrics>,
}

impl MetricsSnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading metrics snapshot {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing metrics snapshot {}", path.display()))
    }
}

impl MetricsSource for MetricsSnapshot {
    fn fetch(&self, query: &MetricsQuery<'_>) -> Result<Option<Metrics>> {
        Ok(self.entries.get(query.name).cloned())
    }
}

pub trait ToolProbe {
    /// Tool names the running service advertises, sorted.
    fn probe(&self, name: &str, entry: &Entry) -> Result<Vec<String>>;
}

/// Probe backed by an already captured `mcp list` transcript.
pub struct CapturedListing {
    text: String,
}

impl CapturedListing {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ToolProbe for CapturedListing {
    fn probe(&self, name: &str, entry: &Entry) -> Result<Vec<String>> {
        if entry.is_remote() {
            bail!("entry '{name}' is remote; only container entries can be probed for tools");
        }
        parse_tool_listing(&self.text)
    }
}

#[derive(Deserialize)]
struct ListingDocument {
    #[serde(default)]
    tools: Vec<ListedTool>,
}

#[derive(Deserialize)]
struct ListedTool {
    name: String,
}

/// Tool names from a listing transcript. The JSON form may follow arbitrary
/// log noise; the text form needs a `TOOLS:` section with a `NAME` header row.
pub fn parse_tool_listing(output: &str) -> Result<Vec<String>> {
    if let Some(start) = output.find('{') {
        if let Ok(document) = serde_json::from_str::<ListingDocument>(&output[start..]) {
            let mut tools: Vec<String> = document.tools.into_iter().map(|tool| tool.name).collect();
            tools.sort();
            return Ok(tools);
        }
    }
    parse_tool_table(output)
}

fn parse_tool_table(output: &str) -> Result<Vec<String>> {
    let mut in_section = false;
    let mut past_header = false;
    let mut tools = Vec::new();
    for line in output.lines() {
        if line.starts_with("TOOLS:") {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if line.starts_with("NAME") {
            past_header = true;
            continue;
        }
        if past_header {
            if let Some(first) = line.split_whitespace().next() {
                tools.push(first.to_string());
            }
        }
    }
    if !in_section {
        return Err(anyhow!("no TOOLS section found in listing output"));
    }
    tools.sort();
    Ok(tools)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ToolReconciliation {
    Unchanged,
    Updated {
        added: Vec<String>,
        removed: Vec<String>,
        tools: Vec<String>,
    },
    /// The probe found nothing although tools are declared; keep them.
    KeptDeclared,
}

pub fn reconcile_tools(declared: &[String], probed: &[String]) -> ToolReconciliation {
    let declared: BTreeSet<&String> = declared.iter().collect();
    let probed: BTreeSet<&String> = probed.iter().collect();
    if probed.is_empty() && !declared.is_empty() {
        return ToolReconciliation::KeptDeclared;
    }
    if declared == probed {
        return ToolReconciliation::Unchanged;
    }
    ToolReconciliation::Updated {
        added: probed.difference(&declared).map(|t| t.to_string()).collect(),
        removed: declared.difference(&probed).map(|t| t.to_string()).collect(),
        tools: probed.into_iter().cloned().collect(),
    }
}
