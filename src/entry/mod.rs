//! Catalog entry model.
//!
//! A `spec.yaml` document describes either a container-backed service
//! (identified by `image`) or a remote one (identified by `url`). The variant
//! is decided once, at parse time, from key presence; everything downstream
//! matches on [`Entry`] and never re-inspects the raw document.

pub mod identity;
pub mod model;
mod scalar;

pub use identity::{Status, Tier, Transport};
pub use model::{
    ContainerEntry, EnvVar, Example, Header, Metrics, NetworkPermissions, OAuthConfig,
    OutboundNetwork, Permissions, Provenance, RemoteEntry,
};

use crate::error::{CatalogError, Result};
use serde_yaml::Value;

const IMAGE_KEY: &str = "image";
const URL_KEY: &str = "url";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryKind {
    Container,
    Remote,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Container => "Container",
            EntryKind::Remote => "Remote",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// One catalog item.
pub enum Entry {
    Container(ContainerEntry),
    Remote(RemoteEntry),
}

impl Entry {
    /// Decode a `spec.yaml` document, selecting the variant by key presence.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(source)?;
        Self::from_yaml_value(value)
    }

    pub fn from_yaml_value(value: Value) -> Result<Self> {
        let mapping = match &value {
            Value::Mapping(mapping) => mapping,
            Value::Null => return Err(CatalogError::ShapeMissing),
            _ => return Err(CatalogError::NotAMapping),
        };

        let has_image = mapping.contains_key(IMAGE_KEY);
        let has_url = mapping.contains_key(URL_KEY);
        match (has_image, has_url) {
            (true, true) => Err(CatalogError::ShapeConflict),
            (false, false) => Err(CatalogError::ShapeMissing),
            (true, false) => Ok(Entry::Container(serde_yaml::from_value(value)?)),
            (false, true) => Ok(Entry::Remote(serde_yaml::from_value(value)?)),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Container(_) => EntryKind::Container,
            Entry::Remote(_) => EntryKind::Remote,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Entry::Container(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Entry::Remote(_))
    }

    /// Explicit name, or the directory name written back by the loader.
    pub fn name(&self) -> Option<&str> {
        let name = match self {
            Entry::Container(entry) => entry.name.as_deref(),
            Entry::Remote(entry) => entry.name.as_deref(),
        };
        name.filter(|name| !name.is_empty())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = Some(name.into());
        match self {
            Entry::Container(entry) => entry.name = name,
            Entry::Remote(entry) => entry.name = name,
        }
    }

    /// The image reference or endpoint URL, whichever identifies this entry.
    pub fn locator(&self) -> &str {
        match self {
            Entry::Container(entry) => &entry.image,
            Entry::Remote(entry) => &entry.url,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Entry::Container(entry) => &entry.description,
            Entry::Remote(entry) => &entry.description,
        }
    }

    pub fn transport(&self) -> Option<&Transport> {
        match self {
            Entry::Container(entry) => entry.transport.as_ref(),
            Entry::Remote(entry) => entry.transport.as_ref(),
        }
    }

    pub fn tier(&self) -> Option<&Tier> {
        match self {
            Entry::Container(entry) => entry.tier.as_ref(),
            Entry::Remote(entry) => entry.tier.as_ref(),
        }
    }

    pub fn status(&self) -> Option<&Status> {
        match self {
            Entry::Container(entry) => entry.status.as_ref(),
            Entry::Remote(entry) => entry.status.as_ref(),
        }
    }

    pub fn tools(&self) -> &[String] {
        match self {
            Entry::Container(entry) => &entry.tools,
            Entry::Remote(entry) => &entry.tools,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Entry::Container(entry) => &entry.tags,
            Entry::Remote(entry) => &entry.tags,
        }
    }

    pub fn env_vars(&self) -> &[EnvVar] {
        match self {
            Entry::Container(entry) => &entry.env_vars,
            Entry::Remote(entry) => &entry.env_vars,
        }
    }

    pub fn repository_url(&self) -> Option<&str> {
        match self {
            Entry::Container(entry) => entry.repository_url.as_deref(),
            Entry::Remote(entry) => entry.repository_url.as_deref(),
        }
    }

    pub fn license(&self) -> Option<&str> {
        match self {
            Entry::Container(entry) => entry.license.as_deref(),
            Entry::Remote(entry) => entry.license.as_deref(),
        }
    }

    pub fn examples(&self) -> &[Example] {
        match self {
            Entry::Container(entry) => &entry.examples,
            Entry::Remote(entry) => &entry.examples,
        }
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        match self {
            Entry::Container(entry) => entry.metadata.as_ref(),
            Entry::Remote(entry) => entry.metadata.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_key_selects_container_variant() {
        let entry = Entry::from_yaml_str(
            "image: docker.io/x/y:latest\ndescription: test\ntransport: stdio\n",
        )
        .unwrap();
        assert_eq!(entry.kind(), EntryKind::Container);
        assert_eq!(entry.locator(), "docker.io/x/y:latest");
        assert_eq!(entry.transport(), Some(&Transport::Stdio));
        assert!(entry.name().is_none());
        assert!(entry.tools().is_empty());
    }

    #[test]
    fn url_key_selects_remote_variant() {
        let entry = Entry::from_yaml_str(
            "url: https://api.example.com/mcp\ndescription: test\ntransport: sse\nheaders:\n  - name: X-Api-Key\n    description: key\n    secret: true\n",
        )
        .unwrap();
        let Entry::Remote(remote) = &entry else {
            panic!("expected remote entry");
        };
        assert_eq!(remote.headers.len(), 1);
        assert!(remote.headers[0].secret);
        assert_eq!(entry.transport(), Some(&Transport::Sse));
    }

    #[test]
    fn both_keys_is_a_shape_conflict() {
        let err = Entry::from_yaml_str(
            "image: x/y:1\nurl: https://example.com\ndescription: d\ntransport: sse\n",
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::ShapeConflict));
    }

    #[test]
    fn neither_key_is_shape_missing() {
        let err = Entry::from_yaml_str("description: d\ntransport: stdio\n").unwrap_err();
        assert!(matches!(err, CatalogError::ShapeMissing));
        let err = Entry::from_yaml_str("").unwrap_err();
        assert!(matches!(err, CatalogError::ShapeMissing));
    }

    #[test]
    fn null_image_still_counts_as_present() {
        let entry = Entry::from_yaml_str("image: ~\ndescription: d\n").unwrap();
        assert!(entry.is_container());
        assert_eq!(entry.locator(), "");
    }

    #[test]
    fn non_mapping_and_malformed_documents_are_rejected() {
        assert!(matches!(
            Entry::from_yaml_str("- image\n- url\n").unwrap_err(),
            CatalogError::NotAMapping
        ));
        assert!(matches!(
            Entry::from_yaml_str("image: [unterminated\n").unwrap_err(),
            CatalogError::Parse { .. }
        ));
        assert!(matches!(
            Entry::from_yaml_str("image: x\ntools: {a: b}\n").unwrap_err(),
            CatalogError::Parse { .. }
        ));
    }

    #[test]
    fn unquoted_numbers_are_read_as_text() {
        let entry = Entry::from_yaml_str(
            "image: x/y:1\ndescription: d\ntransport: stdio\nargs: [--port, 8080]\ntags: [2024]\n\
             env_vars:\n  - name: PORT\n    description: p\n    default: 8080\n",
        )
        .unwrap();
        let Entry::Container(container) = &entry else {
            panic!("expected container entry");
        };
        assert_eq!(container.args, ["--port", "8080"]);
        assert_eq!(entry.tags(), ["2024"]);
        assert_eq!(entry.env_vars()[0].default.as_deref(), Some("8080"));
    }

    #[test]
    fn set_name_is_visible_through_accessor() {
        let mut entry = Entry::from_yaml_str("url: https://e.example\n").unwrap();
        assert!(entry.name().is_none());
        entry.set_name("remote-one");
        assert_eq!(entry.name(), Some("remote-one"));
    }
}
