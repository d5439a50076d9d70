//! Per-route access policy.
//!
//! A policy is assembled while routes are registered and flattened into the
//! route attributes under `_`-prefixed keys, so it survives being written to
//! the compiled route cache.
//!
//! # Evaluation (see `RouteMatch::verify`)
//! ```text
//! range denied?
//!     no  → granted unless the IP or host is blacklisted
//!     yes → rejected unless the IP or host is whitelisted
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::routing::definition::{
    RouteAttributes, BLACKLIST_HOSTS, BLACKLIST_IPS, PRIVATE_RANGES_DENIED, PUBLIC_RANGES_DENIED,
    RESERVED_RANGES_DENIED, WHITELIST_HOSTS, WHITELIST_IPS,
};

/// Allow/deny rules for a single route.
///
/// The default policy denies nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    deny_public: bool,
    deny_private: bool,
    deny_reserved: bool,
    ip_whitelist: Vec<String>,
    host_whitelist: Vec<String>,
    ip_blacklist: Vec<String>,
    host_blacklist: Vec<String>,
}

impl AccessPolicy {
    /// Every range allowed.
    pub fn for_public_service() -> Self {
        Self::default()
    }

    /// Public ranges denied, private and reserved ranges allowed.
    pub fn for_private_service() -> Self {
        Self::default().deny_public_ranges()
    }

    pub fn deny_public_ranges(mut self) -> Self {
        self.deny_public = true;
        self
    }

    pub fn allow_public_ranges(mut self) -> Self {
        self.deny_public = false;
        self
    }

    pub fn deny_private_ranges(mut self) -> Self {
        self.deny_private = true;
        self
    }

    pub fn allow_private_ranges(mut self) -> Self {
        self.deny_private = false;
        self
    }

    pub fn deny_reserved_ranges(mut self) -> Self {
        self.deny_reserved = true;
        self
    }

    pub fn allow_reserved_ranges(mut self) -> Self {
        self.deny_reserved = false;
        self
    }

    /// Deny every range. Only whitelisted clients get through.
    pub fn deny_all(self) -> Self {
        self.deny_public_ranges()
            .deny_private_ranges()
            .deny_reserved_ranges()
    }

    /// Allow every range. Blacklisted clients are still rejected.
    pub fn allow_all(self) -> Self {
        self.allow_public_ranges()
            .allow_private_ranges()
            .allow_reserved_ranges()
    }

    /// Whitelist an IP pattern (exact, CIDR, wildcard or range).
    pub fn allow_ip(mut self, pattern: impl Into<String>) -> Self {
        push_unique(&mut self.ip_whitelist, pattern.into());
        self
    }

    /// Blacklist an IP pattern.
    pub fn deny_ip(mut self, pattern: impl Into<String>) -> Self {
        push_unique(&mut self.ip_blacklist, pattern.into());
        self
    }

    /// Whitelist a domain and its subdomains.
    pub fn allow_host(mut self, domain: impl Into<String>) -> Self {
        push_unique(&mut self.host_whitelist, domain.into());
        self
    }

    /// Blacklist a domain and its subdomains.
    pub fn deny_host(mut self, domain: impl Into<String>) -> Self {
        push_unique(&mut self.host_blacklist, domain.into());
        self
    }

    pub fn public_ranges_denied(&self) -> bool {
        self.deny_public
    }

    pub fn private_ranges_denied(&self) -> bool {
        self.deny_private
    }

    pub fn reserved_ranges_denied(&self) -> bool {
        self.deny_reserved
    }

    pub fn ip_whitelist(&self) -> &[String] {
        &self.ip_whitelist
    }

    pub fn host_whitelist(&self) -> &[String] {
        &self.host_whitelist
    }

    pub fn ip_blacklist(&self) -> &[String] {
        &self.ip_blacklist
    }

    pub fn host_blacklist(&self) -> &[String] {
        &self.host_blacklist
    }

    /// Write the policy into route attributes as flat `_`-prefixed keys.
    pub fn flatten_into(&self, attributes: &mut RouteAttributes) {
        attributes.insert(PUBLIC_RANGES_DENIED.into(), Value::Bool(self.deny_public));
        attributes.insert(PRIVATE_RANGES_DENIED.into(), Value::Bool(self.deny_private));
        attributes.insert(RESERVED_RANGES_DENIED.into(), Value::Bool(self.deny_reserved));
        attributes.insert(WHITELIST_IPS.into(), string_array(&self.ip_whitelist));
        attributes.insert(WHITELIST_HOSTS.into(), string_array(&self.host_whitelist));
        attributes.insert(BLACKLIST_IPS.into(), string_array(&self.ip_blacklist));
        attributes.insert(BLACKLIST_HOSTS.into(), string_array(&self.host_blacklist));
    }
}

// Lists behave as ordered sets.
fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn string_array(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}
