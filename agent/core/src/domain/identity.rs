// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::fmt;

use url::Url;

/// Delimiter separating the group prefix from the machine suffix in a
/// hostname, e.g. `lab3--pc07` belongs to group `lab3`.
pub const DEFAULT_GROUP_DELIMITER: &str = "--";

/// Per-process identity facts sent with every manager call.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    hostname: String,
    group: String,
    manager_endpoint: Url,
}

impl IdentityContext {
    pub fn new(hostname: impl Into<String>, group: impl Into<String>, manager_endpoint: Url) -> Self {
        Self {
            hostname: hostname.into(),
            group: group.into(),
            manager_endpoint,
        }
    }

    /// Build an identity whose group is derived from the hostname.
    pub fn with_derived_group(hostname: impl Into<String>, delimiter: &str, manager_endpoint: Url) -> Self {
        let hostname = hostname.into();
        let group = derive_group(&hostname, delimiter).to_string();
        Self::new(hostname, group, manager_endpoint)
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn manager_endpoint(&self) -> &Url {
        &self.manager_endpoint
    }

    /// Join a route (e.g. `register`) onto the manager base URL.
    pub fn route(&self, route: &str) -> String {
        format!(
            "{}/{}",
            self.manager_endpoint.as_str().trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    }
}

impl fmt::Display for IdentityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (group: {})", self.hostname, self.group)
    }
}

/// Group label for a hostname: the prefix before the first delimiter, or the
/// whole hostname when the delimiter is absent or empty.
pub fn derive_group<'a>(hostname: &'a str, delimiter: &str) -> &'a str {
    if delimiter.is_empty() {
        return hostname;
    }
    match hostname.split_once(delimiter) {
        Some((prefix, _)) => prefix,
        None => hostname,
    }
}

/// Hostname of the running machine as reported by the OS.
pub fn system_hostname() -> Option<String> {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Url {
        Url::parse("http://10.85.0.48:23456/api/manager").unwrap()
    }

    #[test]
    fn test_group_from_delimited_hostname() {
        assert_eq!(derive_group("lab3--pc07", "--"), "lab3");
        assert_eq!(derive_group("lab3--pc07--b", "--"), "lab3");
    }

    #[test]
    fn test_group_without_delimiter_is_hostname() {
        assert_eq!(derive_group("reception", "--"), "reception");
        assert_eq!(derive_group("lab3--pc07", ""), "lab3--pc07");
    }

    #[test]
    fn test_route_joins_without_double_slash() {
        let identity = IdentityContext::with_derived_group("lab3--pc07", "--", endpoint());
        assert_eq!(identity.group(), "lab3");
        assert_eq!(
            identity.route("/heartbeat"),
            "http://10.85.0.48:23456/api/manager/heartbeat"
        );

        let trailing = IdentityContext::new(
            "h",
            "g",
            Url::parse("http://manager.local/api/manager/").unwrap(),
        );
        assert_eq!(trailing.route("register"), "http://manager.local/api/manager/register");
    }
}
