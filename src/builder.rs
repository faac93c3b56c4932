//! Turns loaded entries into the catalog artifact.
//!
//! Normalization is idempotent: defaults are filled only where absent, and the
//! name is dropped because it is carried by the map key.

use crate::enrich::{MetricsQuery, MetricsSource};
use crate::entry::{ContainerEntry, Entry, Metrics, RemoteEntry, Status, Tier};
use crate::error::Result;
use crate::schema;
use crate::sink;
use crate::validation::validate_normalized;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub const CATALOG_VERSION: &str = "1.0.0";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub version: String,
    pub last_updated: String,
    pub servers: BTreeMap<String, ContainerEntry>,
    #[serde(default)]
    pub remote_servers: BTreeMap<String, RemoteEntry>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.servers.len() + self.remote_servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty() && self.remote_servers.is_empty()
    }
}

pub struct Builder<'a> {
    entries: &'a BTreeMap<String, Entry>,
    metrics: Option<&'a dyn MetricsSource>,
    version: String,
}

impl<'a> Builder<'a> {
    pub fn new(entries: &'a BTreeMap<String, Entry>) -> Self {
        Self {
            entries,
            metrics: None,
            version: CATALOG_VERSION.to_string(),
        }
    }

    pub fn with_metrics_source(mut self, source: &'a dyn MetricsSource) -> Self {
        self.metrics = Some(source);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn build(&self) -> Result<Catalog> {
        self.build_at(Utc::now())
    }

    /// Build with a fixed timestamp; two calls with the same inputs produce
    /// byte-identical output.
    pub fn build_at(&self, now: DateTime<Utc>) -> Result<Catalog> {
        let mut catalog = Catalog {
            version: self.version.clone(),
            last_updated: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            ..Catalog::default()
        };

        for (name, entry) in self.entries {
            let refreshed = self.refreshed_metrics(name, entry);
            match entry.clone() {
                Entry::Container(mut container) => {
                    if let Some(metrics) = refreshed {
                        container.metadata = Some(metrics);
                    }
                    catalog
                        .servers
                        .insert(name.clone(), normalize_container(container));
                }
                Entry::Remote(mut remote) => {
                    if let Some(metrics) = refreshed {
                        remote.metadata = Some(metrics);
                    }
                    catalog
                        .remote_servers
                        .insert(name.clone(), normalize_remote(remote));
                }
            }
        }

        validate_normalized(&catalog)?;
        schema::validate_document(&sink::to_document(&catalog)?)?;
        info!(
            servers = catalog.servers.len(),
            remote_servers = catalog.remote_servers.len(),
            "built catalog"
        );
        Ok(catalog)
    }

    fn refreshed_metrics(&self, name: &str, entry: &Entry) -> Option<Metrics> {
        let source = self.metrics?;
        match source.fetch(&MetricsQuery::for_entry(name, entry)) {
            Ok(Some(metrics)) => {
                debug!(entry = name, stars = metrics.stars, pulls = metrics.pulls, "refreshed metrics");
                Some(metrics)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(entry = name, "keeping previous metrics: {err:#}");
                None
            }
        }
    }
}

pub fn normalize_container(mut entry: ContainerEntry) -> ContainerEntry {
    entry.name = None;
    entry.tier.get_or_insert_with(Tier::default);
    entry.status.get_or_insert_with(Status::default);
    entry
}

pub fn normalize_remote(mut entry: RemoteEntry) -> RemoteEntry {
    entry.name = None;
    entry.tier.get_or_insert_with(Tier::default);
    entry.status.get_or_insert_with(Status::default);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Transport;
    use crate::error::CatalogError;
    use chrono::TimeZone;
    use std::cell::Cell;

    fn entries(specs: &[(&str, &str)]) -> BTreeMap<String, Entry> {
        specs
            .iter()
            .map(|(name, yaml)| {
                let mut entry = Entry::from_yaml_str(yaml).unwrap();
                entry.set_name(*name);
                (name.to_string(), entry)
            })
            .collect()
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn minimal_container_gets_defaults_and_loses_its_name() {
        let entries = entries(&[(
            "foo",
            "image: docker.io/x/y:latest\ndescription: test\ntransport: stdio\n",
        )]);
        let catalog = Builder::new(&entries).build_at(fixed_time()).unwrap();
        assert_eq!(catalog.version, CATALOG_VERSION);
        assert_eq!(catalog.last_updated, "2024-05-01T12:30:00Z");
        let foo = &catalog.servers["foo"];
        assert_eq!(foo.tier, Some(Tier::Community));
        assert_eq!(foo.status, Some(Status::Active));
        assert!(foo.name.is_none());
        assert!(catalog.remote_servers.is_empty());
    }

    #[test]
    fn remote_entries_land_in_their_own_section() {
        let entries = entries(&[(
            "foo",
            "url: https://api.example.com/mcp\ndescription: test\ntransport: sse\ntier: Official\n",
        )]);
        let catalog = Builder::new(&entries).build_at(fixed_time()).unwrap();
        assert!(catalog.servers.is_empty());
        let foo = &catalog.remote_servers["foo"];
        assert_eq!(foo.transport, Some(Transport::Sse));
        assert_eq!(foo.tier, Some(Tier::Official));
    }

    #[test]
    fn normalization_is_idempotent() {
        let entries = entries(&[("foo", "image: x/y:1\ndescription: d\ntransport: stdio\nstatus: Beta\n")]);
        let Entry::Container(container) = entries["foo"].clone() else {
            panic!("expected container");
        };
        let once = normalize_container(container);
        let twice = normalize_container(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.status, Some(Status::Beta));
    }

    #[test]
    fn output_is_sorted_and_deterministic() {
        let entries = entries(&[
            ("zeta", "image: z/z:1\ndescription: z\ntransport: stdio\n"),
            ("alpha", "image: a/a:1\ndescription: a\ntransport: stdio\n"),
            ("mid", "url: https://m.example.com\ndescription: m\ntransport: streamable-http\n"),
        ]);
        let first = sink::to_json_string(&Builder::new(&entries).build_at(fixed_time()).unwrap()).unwrap();
        let second = sink::to_json_string(&Builder::new(&entries).build_at(fixed_time()).unwrap()).unwrap();
        assert_eq!(first, second);
        assert!(first.find("\"alpha\"").unwrap() < first.find("\"zeta\"").unwrap());
    }

    #[test]
    fn normalized_pass_rejects_invalid_entries() {
        let entries = entries(&[("foo", "url: https://e.example.com\ndescription: d\ntransport: stdio\n")]);
        let err = Builder::new(&entries).build_at(fixed_time()).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    struct FixedMetrics {
        calls: Cell<usize>,
        fail: bool,
    }

    impl MetricsSource for FixedMetrics {
        fn fetch(&self, query: &MetricsQuery<'_>) -> anyhow::Result<Option<Metrics>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                anyhow::bail!("rate limited");
            }
            Ok(Some(Metrics {
                stars: query.name.len() as u64,
                pulls: 42,
                last_updated: Some("2024-05-01T00:00:00Z".into()),
            }))
        }
    }

    #[test]
    fn metrics_source_replaces_metadata() {
        let entries = entries(&[(
            "foo",
            "image: x/y:1\ndescription: d\ntransport: stdio\nmetadata:\n  stars: 1\n  pulls: 1\n",
        )]);
        let source = FixedMetrics { calls: Cell::new(0), fail: false };
        let catalog = Builder::new(&entries)
            .with_metrics_source(&source)
            .build_at(fixed_time())
            .unwrap();
        let metrics = catalog.servers["foo"].metadata.as_ref().unwrap();
        assert_eq!((metrics.stars, metrics.pulls), (3, 42));
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn failing_metrics_source_keeps_previous_values() {
        let entries = entries(&[(
            "foo",
            "image: x/y:1\ndescription: d\ntransport: stdio\nmetadata:\n  stars: 7\n  pulls: 8\n",
        )]);
        let source = FixedMetrics { calls: Cell::new(0), fail: true };
        let catalog = Builder::new(&entries)
            .with_metrics_source(&source)
            .with_version("2.0.0")
            .build_at(fixed_time())
            .unwrap();
        let metrics = catalog.servers["foo"].metadata.as_ref().unwrap();
        assert_eq!((metrics.stars, metrics.pulls), (7, 8));
        assert_eq!(catalog.version, "2.0.0");
    }
}
