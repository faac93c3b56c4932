//! Field-level and cross-field rules for catalog entries.
//!
//! Both passes are pure and exhaustive: every broken rule for every entry is
//! recorded so authors see the full list in one run. The per-entry pass runs
//! while loading; the normalized pass re-checks the built catalog after
//! defaults are filled in and additionally requires `tier` and `status`.
//!
//! Tool lists are optional. An entry without declared tools is valid.

use crate::builder::Catalog;
use crate::entry::{
    ContainerEntry, Entry, EnvVar, Header, OAuthConfig, Permissions, RemoteEntry, Status, Tier,
    Transport,
};
use crate::error::{ValidationReport, Violation};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Pass {
    Source,
    Normalized,
}

/// Validate one entry as authored. `name` is the catalog name it resolved to.
pub fn validate_entry(name: &str, entry: &Entry) -> Result<(), ValidationReport> {
    let mut report = ValidationReport::new();
    check_entry(name, entry, Pass::Source, &mut report);
    report.into_result()
}

/// Re-validate every entry of a built catalog.
pub fn validate_normalized(catalog: &Catalog) -> Result<(), ValidationReport> {
    let mut report = ValidationReport::new();
    for (name, entry) in &catalog.servers {
        check_name(name, &mut report);
        check_container(name, entry, Pass::Normalized, &mut report);
    }
    for (name, entry) in &catalog.remote_servers {
        check_name(name, &mut report);
        check_remote(name, entry, Pass::Normalized, &mut report);
    }
    report.into_result()
}

/// Catalog names are lowercase identifiers: `[a-z0-9._-]+`, starting with an
/// alphanumeric character.
pub fn is_valid_entry_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_lowercase() || first.is_ascii_digit())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
}

fn check_entry(name: &str, entry: &Entry, pass: Pass, report: &mut ValidationReport) {
    check_name(name, report);
    match entry {
        Entry::Container(container) => check_container(name, container, pass, report),
        Entry::Remote(remote) => check_remote(name, remote, pass, report),
    }
}

fn check_name(name: &str, report: &mut ValidationReport) {
    if !is_valid_entry_name(name) {
        report.push(Violation::invalid(
            name,
            "name",
            "must match ^[a-z0-9][a-z0-9._-]*$",
        ));
    }
}

fn check_container(name: &str, entry: &ContainerEntry, pass: Pass, report: &mut ValidationReport) {
    if entry.image.trim().is_empty() {
        report.push(Violation::missing(name, "image"));
    } else if entry.image.chars().any(char::is_whitespace) {
        report.push(Violation::invalid(
            name,
            "image",
            format!("image reference '{}' must not contain whitespace", entry.image),
        ));
    }

    let common = Common {
        description: &entry.description,
        transport: entry.transport.as_ref(),
        tier: entry.tier.as_ref(),
        status: entry.status.as_ref(),
        tools: &entry.tools,
        tags: &entry.tags,
        env_vars: &entry.env_vars,
    };
    common.check(name, pass, report);

    if let Some(permissions) = &entry.permissions {
        check_permissions(name, permissions, report);
    }
}

fn check_remote(name: &str, entry: &RemoteEntry, pass: Pass, report: &mut ValidationReport) {
    let url = entry.url.trim();
    if url.is_empty() {
        report.push(Violation::missing(name, "url"));
    } else if !is_http_url(url) {
        report.push(Violation::invalid(
            name,
            "url",
            format!("'{url}' must be an absolute http:// or https:// URL"),
        ));
    }

    if entry.transport == Some(Transport::Stdio) {
        report.push(Violation::invalid(
            name,
            "transport",
            "remote servers cannot use stdio transport (use sse or streamable-http)",
        ));
    }

    let common = Common {
        description: &entry.description,
        transport: entry.transport.as_ref(),
        tier: entry.tier.as_ref(),
        status: entry.status.as_ref(),
        tools: &entry.tools,
        tags: &entry.tags,
        env_vars: &entry.env_vars,
    };
    common.check(name, pass, report);

    check_headers(name, &entry.headers, report);
    if let Some(oauth) = &entry.oauth_config {
        check_oauth(name, oauth, report);
    }
}

/// Fields both entry kinds carry.
struct Common<'a> {
    description: &'a str,
    transport: Option<&'a Transport>,
    tier: Option<&'a Tier>,
    status: Option<&'a Status>,
    tools: &'a [String],
    tags: &'a [String],
    env_vars: &'a [EnvVar],
}

impl Common<'_> {
    fn check(&self, name: &str, pass: Pass, report: &mut ValidationReport) {
        if self.description.trim().is_empty() {
            report.push(Violation::missing(name, "description"));
        }

        match self.transport {
            None => report.push(Violation::missing(name, "transport")),
            Some(transport) if !transport.is_known() => report.push(unknown_value(
                name,
                "transport",
                transport.as_str(),
                Transport::KNOWN,
            )),
            Some(_) => {}
        }

        match self.tier {
            None if pass == Pass::Normalized => report.push(Violation::missing(name, "tier")),
            Some(tier) if !tier.is_known() => {
                report.push(unknown_value(name, "tier", tier.as_str(), Tier::KNOWN))
            }
            _ => {}
        }

        match self.status {
            None if pass == Pass::Normalized => report.push(Violation::missing(name, "status")),
            Some(status) if !status.is_known() => {
                report.push(unknown_value(name, "status", status.as_str(), Status::KNOWN))
            }
            _ => {}
        }

        check_string_list(name, "tools", self.tools, true, report);
        check_string_list(name, "tags", self.tags, false, report);
        check_env_vars(name, self.env_vars, report);
    }
}

fn check_string_list(
    name: &str,
    field: &str,
    values: &[String],
    unique: bool,
    report: &mut ValidationReport,
) {
    let mut seen = BTreeSet::new();
    for (idx, value) in values.iter().enumerate() {
        if value.trim().is_empty() {
            report.push(Violation::invalid(
                name,
                format!("{field}[{idx}]"),
                "must not be empty",
            ));
        } else if unique && !seen.insert(value.as_str()) {
            report.push(Violation::invalid(
                name,
                format!("{field}[{idx}]"),
                format!("duplicate value '{value}'"),
            ));
        }
    }
}

fn check_env_vars(name: &str, env_vars: &[EnvVar], report: &mut ValidationReport) {
    let mut seen = BTreeSet::new();
    for (idx, var) in env_vars.iter().enumerate() {
        if var.name.trim().is_empty() {
            report.push(Violation::missing(name, format!("env_vars[{idx}].name")));
        } else if !seen.insert(var.name.as_str()) {
            report.push(Violation::invalid(
                name,
                format!("env_vars[{idx}].name"),
                format!("duplicate environment variable '{}'", var.name),
            ));
        }
    }
}

fn check_headers(name: &str, headers: &[Header], report: &mut ValidationReport) {
    for (idx, header) in headers.iter().enumerate() {
        if header.name.trim().is_empty() {
            report.push(Violation::missing(name, format!("headers[{idx}].name")));
        }
    }
}

fn check_oauth(name: &str, oauth: &OAuthConfig, report: &mut ValidationReport) {
    let has = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
    check_string_list(name, "oauth_config.scopes", &oauth.scopes, false, report);
    let explicit = (has(&oauth.authorize_url), has(&oauth.token_url));
    if has(&oauth.issuer) {
        return;
    }
    match explicit {
        (true, true) => {}
        (true, false) => report.push(Violation::missing(name, "oauth_config.token_url")),
        (false, true) => report.push(Violation::missing(name, "oauth_config.authorize_url")),
        (false, false) => report.push(Violation::invalid(
            name,
            "oauth_config",
            "requires either issuer or both authorize_url and token_url",
        )),
    }
}

fn check_permissions(name: &str, permissions: &Permissions, report: &mut ValidationReport) {
    let Some(outbound) = permissions
        .network
        .as_ref()
        .and_then(|network| network.outbound.as_ref())
    else {
        return;
    };
    check_string_list(
        name,
        "permissions.network.outbound.allow_host",
        &outbound.allow_host,
        false,
        report,
    );
    for (idx, port) in outbound.allow_port.iter().enumerate() {
        if !(1..=65535).contains(port) {
            report.push(Violation::invalid(
                name,
                format!("permissions.network.outbound.allow_port[{idx}]"),
                format!("port {port} is outside 1-65535"),
            ));
        }
    }
}

fn unknown_value(name: &str, field: &str, value: &str, known: &[&str]) -> Violation {
    Violation::invalid(
        name,
        field,
        format!("invalid value '{value}' (expected one of {})", known.join(", ")),
    )
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/') && !url.chars().any(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViolationKind;

    fn parse(yaml: &str) -> Entry {
        Entry::from_yaml_str(yaml).expect("fixture parses")
    }

    fn fields(report: &ValidationReport) -> Vec<&str> {
        report.violations().iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn minimal_container_entry_is_valid() {
        let entry = parse("image: docker.io/x/y:latest\ndescription: test\ntransport: stdio\n");
        assert!(validate_entry("foo", &entry).is_ok());
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let entry = parse("image: ''\n");
        let report = validate_entry("foo", &entry).unwrap_err();
        assert_eq!(fields(&report), vec!["image", "description", "transport"]);
        assert!(report.violations().iter().all(Violation::is_missing));
        assert!(report.violations().iter().all(|v| v.entry == "foo"));
    }

    #[test]
    fn unknown_enumerations_are_invalid() {
        let entry = parse(
            "image: x/y:1\ndescription: d\ntransport: tcp\ntier: Partner\nstatus: Retired\n",
        );
        let report = validate_entry("foo", &entry).unwrap_err();
        assert_eq!(fields(&report), vec!["transport", "tier", "status"]);
        let ViolationKind::FieldInvalid(reason) = &report.violations()[1].kind else {
            panic!("expected invalid tier");
        };
        assert!(reason.contains("'Partner'"));
        assert!(reason.contains("Official, Community"));
    }

    #[test]
    fn container_accepts_every_known_transport() {
        for transport in Transport::KNOWN {
            let entry = parse(&format!(
                "image: x/y:1\ndescription: d\ntransport: {transport}\n"
            ));
            assert!(validate_entry("foo", &entry).is_ok(), "{transport}");
        }
    }

    #[test]
    fn remote_entries_reject_stdio() {
        let entry = parse("url: https://example.com/mcp\ndescription: d\ntransport: stdio\n");
        let report = validate_entry("foo", &entry).unwrap_err();
        assert_eq!(report.violations().len(), 1);
        assert!(report.to_string().contains("remote servers cannot use stdio"));
    }

    #[test]
    fn remote_url_must_be_http() {
        let entry = parse("url: ftp://example.com\ndescription: d\ntransport: sse\n");
        let report = validate_entry("foo", &entry).unwrap_err();
        assert_eq!(fields(&report), vec!["url"]);
        let entry = parse("url: https://\ndescription: d\ntransport: sse\n");
        assert!(validate_entry("foo", &entry).is_err());
    }

    #[test]
    fn oauth_needs_issuer_or_both_endpoints() {
        let base = "url: https://example.com/mcp\ndescription: d\ntransport: streamable-http\n";
        let with_issuer = parse(&format!("{base}oauth_config:\n  issuer: https://auth.example.com\n"));
        assert!(validate_entry("foo", &with_issuer).is_ok());

        let half = parse(&format!(
            "{base}oauth_config:\n  authorize_url: https://auth.example.com/authorize\n"
        ));
        let report = validate_entry("foo", &half).unwrap_err();
        assert_eq!(fields(&report), vec!["oauth_config.token_url"]);

        let empty = parse(&format!("{base}oauth_config:\n  client_id: abc\n"));
        let report = validate_entry("foo", &empty).unwrap_err();
        assert_eq!(fields(&report), vec!["oauth_config"]);
    }

    #[test]
    fn blank_oauth_scopes_are_reported_alongside_an_issuer() {
        let entry = parse(
            "url: https://example.com/mcp\ndescription: d\ntransport: sse\n\
             oauth_config:\n  issuer: https://auth.example.com\n  scopes: [openid, \"\", \" \"]\n",
        );
        let report = validate_entry("foo", &entry).unwrap_err();
        assert_eq!(
            fields(&report),
            vec!["oauth_config.scopes[1]", "oauth_config.scopes[2]"]
        );
    }

    #[test]
    fn nested_declarations_are_checked() {
        let entry = parse(
            r#"image: x/y:1
description: d
transport: stdio
tools: [search, "", search]
env_vars:
  - name: TOKEN
    description: t
  - name: TOKEN
    description: again
  - description: nameless
permissions:
  network:
    outbound:
      allow_host: [api.example.com]
      allow_port: [443, 0, 70000]
"#,
        );
        let report = validate_entry("foo", &entry).unwrap_err();
        assert_eq!(
            fields(&report),
            vec![
                "tools[1]",
                "tools[2]",
                "env_vars[1].name",
                "env_vars[2].name",
                "permissions.network.outbound.allow_port[1]",
                "permissions.network.outbound.allow_port[2]",
            ]
        );
    }

    #[test]
    fn entry_names_follow_catalog_convention() {
        assert!(is_valid_entry_name("github"));
        assert!(is_valid_entry_name("mcp-neo4j-cypher"));
        assert!(is_valid_entry_name("v2.api_server"));
        assert!(!is_valid_entry_name(""));
        assert!(!is_valid_entry_name("GitHub"));
        assert!(!is_valid_entry_name("-leading"));
        assert!(!is_valid_entry_name("has space"));

        let entry = parse("image: x/y:1\ndescription: d\ntransport: stdio\n");
        let report = validate_entry("Bad Name", &entry).unwrap_err();
        assert_eq!(fields(&report), vec!["name"]);
    }

    #[test]
    fn validation_is_deterministic() {
        let entry = parse("url: nope\ntransport: stdio\n");
        let first = validate_entry("foo", &entry).unwrap_err();
        let second = validate_entry("foo", &entry).unwrap_err();
        assert_eq!(first, second);
    }
}
