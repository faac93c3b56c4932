//! Deserializable representation of a single `spec.yaml` document.
//!
//! The two entry kinds share most of their descriptive fields but are kept as
//! separate structs so each one serializes exactly the keys its catalog
//! section expects. Sequence fields accept an explicit YAML `null` as "empty"
//! and always serialize, which is what downstream consumers rely on to skip
//! null checks.

use crate::entry::identity::{Status, Tier, Transport};
use crate::entry::scalar;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Entry backed by a container image, launched locally.
pub struct ContainerEntry {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar::string")]
    pub image: String,
    #[serde(default, deserialize_with = "scalar::string")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
    #[serde(default, deserialize_with = "scalar::strings")]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metrics>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub repository_url: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub homepage: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub author: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub license: Option<String>,
    #[serde(default, deserialize_with = "scalar::strings")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub env_vars: Vec<EnvVar>,
    #[serde(default, deserialize_with = "scalar::strings")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    /// Authoring examples; shown by `list --verbose`, never emitted.
    #[serde(default, skip_serializing, deserialize_with = "null_as_default")]
    pub examples: Vec<Example>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Entry reached over the network at an endpoint URL.
pub struct RemoteEntry {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar::string")]
    pub url: String,
    #[serde(default, deserialize_with = "scalar::string")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
    #[serde(default, deserialize_with = "scalar::strings")]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metrics>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub repository_url: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub homepage: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub author: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub license: Option<String>,
    #[serde(default, deserialize_with = "scalar::strings")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub env_vars: Vec<EnvVar>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_config: Option<OAuthConfig>,
    #[serde(default, skip_serializing, deserialize_with = "null_as_default")]
    pub examples: Vec<Example>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Environment variable a container entry reads at startup.
pub struct EnvVar {
    #[serde(default, deserialize_with = "scalar::string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar::string")]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub secret: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub default: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// HTTP header a remote entry expects on every request.
pub struct Header {
    #[serde(default, deserialize_with = "scalar::string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar::string")]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub secret: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// OAuth/OIDC settings: either an issuer for discovery or explicit endpoints.
pub struct OAuthConfig {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub issuer: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub authorize_url: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub token_url: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub client_id: Option<String>,
    #[serde(default, deserialize_with = "scalar::strings")]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub use_pkce: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Sandbox declaration for a container entry.
pub struct Permissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkPermissions>,
    #[serde(default, deserialize_with = "scalar::strings")]
    pub read: Vec<String>,
    #[serde(default, deserialize_with = "scalar::strings")]
    pub write: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkPermissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound: Option<OutboundNetwork>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Outbound allow-list; `insecure_allow_all` is the explicit escape hatch.
pub struct OutboundNetwork {
    #[serde(default)]
    pub insecure_allow_all: bool,
    #[serde(default, deserialize_with = "scalar::strings")]
    pub allow_host: Vec<String>,
    // Wider than u16 so out-of-range ports reach validation instead of
    // failing the YAML decode.
    #[serde(default, deserialize_with = "null_as_default")]
    pub allow_port: Vec<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Usage metrics maintained by the enrichment tooling.
pub struct Metrics {
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub pulls: u64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub last_updated: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Signing metadata used by provenance verification.
pub struct Provenance {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub sigstore_url: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub repository_uri: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub repository_ref: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub signer_identity: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub runner_environment: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::opt_string"
    )]
    pub cert_issuer: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Example {
    #[serde(default, deserialize_with = "scalar::string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar::string")]
    pub description: String,
    #[serde(default, deserialize_with = "scalar::string")]
    pub sample: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn null_sequences_decode_as_empty() {
        let entry: ContainerEntry = serde_yaml::from_str(
            "image: x/y:1\ndescription: d\ntransport: stdio\ntools: null\ntags: ~\nargs:\n",
        )
        .unwrap();
        assert!(entry.tools.is_empty());
        assert!(entry.tags.is_empty());
        assert!(entry.args.is_empty());
    }

    #[test]
    fn empty_sequences_always_serialize() {
        let entry = ContainerEntry {
            image: "x/y:1".into(),
            description: "d".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&entry).unwrap();
        for key in ["tools", "tags", "env_vars", "args"] {
            assert_eq!(value.get(key), Some(&Value::Array(vec![])), "{key}");
        }
        assert!(value.get("permissions").is_none());
        assert!(value.get("examples").is_none());
    }

    #[test]
    fn permissions_keep_nested_lists_explicit() {
        let perms: Permissions =
            serde_yaml::from_str("network:\n  outbound:\n    allow_host: [example.com]\n")
                .unwrap();
        let value = serde_json::to_value(&perms).unwrap();
        assert_eq!(value.pointer("/read"), Some(&Value::Array(vec![])));
        assert_eq!(value.pointer("/write"), Some(&Value::Array(vec![])));
        assert_eq!(
            value.pointer("/network/outbound/allow_port"),
            Some(&Value::Array(vec![]))
        );
        assert_eq!(
            value.pointer("/network/outbound/insecure_allow_all"),
            Some(&Value::Bool(false))
        );
    }

    #[test]
    fn env_var_secret_flag_is_omitted_when_false() {
        let var: EnvVar =
            serde_yaml::from_str("name: TOKEN\ndescription: api token\nrequired: true\n").unwrap();
        let value = serde_json::to_value(&var).unwrap();
        assert_eq!(value.get("required"), Some(&Value::Bool(true)));
        assert!(value.get("secret").is_none());
        assert!(value.get("default").is_none());
    }

    #[test]
    fn plain_scalars_decode_into_string_fields() {
        let entry: ContainerEntry = serde_yaml::from_str(
            "image: x/y:1\ndescription: 42\ntransport: stdio\nargs: [--port, 8080]\ntags: [2024, true]\n\
             env_vars:\n  - name: PORT\n    description: listen port\n    default: 8080\n",
        )
        .unwrap();
        assert_eq!(entry.description, "42");
        assert_eq!(entry.args, ["--port", "8080"]);
        assert_eq!(entry.tags, ["2024", "true"]);
        assert_eq!(entry.env_vars[0].default.as_deref(), Some("8080"));
    }

    #[test]
    fn remote_fields_accept_numeric_scalars() {
        let entry: RemoteEntry = serde_yaml::from_str(
            "url: https://e.example.com\ndescription: d\n\
             headers:\n  - name: X-Version\n    description: 2\n\
             oauth_config:\n  client_id: 12345\n  scopes: [read, 1.5]\n",
        )
        .unwrap();
        assert_eq!(entry.headers[0].description, "2");
        let oauth = entry.oauth_config.unwrap();
        assert_eq!(oauth.client_id.as_deref(), Some("12345"));
        assert_eq!(oauth.scopes, ["read", "1.5"]);
    }
}
