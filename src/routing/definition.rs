//! Route definitions and their flattened attributes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::security::AccessPolicy;

/// Flat attribute map attached to a route.
///
/// Holds route defaults, the target service and method, and the flattened
/// access policy. Keys starting with `_` are reserved.
pub type RouteAttributes = Map<String, Value>;

pub const SERVICE: &str = "_service";
pub const METHOD: &str = "_method";
pub const ROUTE: &str = "_route";
pub const PUBLIC_RANGES_DENIED: &str = "_public_ranges_denied";
pub const PRIVATE_RANGES_DENIED: &str = "_private_ranges_denied";
pub const RESERVED_RANGES_DENIED: &str = "_reserved_ranges_denied";
pub const WHITELIST_IPS: &str = "_whitelist_ips";
pub const WHITELIST_HOSTS: &str = "_whitelist_hosts";
pub const BLACKLIST_IPS: &str = "_blacklist_ips";
pub const BLACKLIST_HOSTS: &str = "_blacklist_hosts";

/// HTTP verbs a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Whether a request with the given verb may use this route.
    ///
    /// `HEAD` is served by `GET` routes.
    pub fn accepts(&self, method: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(method)
            || (*self == HttpMethod::Get && method.eq_ignore_ascii_case("HEAD"))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request predicate checked after the path matched.
///
/// The named header must match `pattern`. A missing header is tested as an
/// empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCondition {
    pub header: String,
    pub pattern: String,
}

impl RouteCondition {
    pub fn header(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            header: name.into().to_ascii_lowercase(),
            pattern: pattern.into(),
        }
    }
}

/// Per-route options passed to the builder verbs.
#[derive(Debug, Clone)]
pub struct RouteOptions {
    pub(crate) name: String,
    pub(crate) defaults: BTreeMap<String, String>,
    pub(crate) requirements: BTreeMap<String, String>,
    pub(crate) condition: Option<RouteCondition>,
    pub(crate) policy: AccessPolicy,
}

impl RouteOptions {
    /// Options for a route called `name`, with a public access policy.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: BTreeMap::new(),
            requirements: BTreeMap::new(),
            condition: None,
            policy: AccessPolicy::for_public_service(),
        }
    }

    /// Default value for a placeholder (or an extra route parameter).
    pub fn default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn defaults<I, K, V>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.defaults
            .extend(defaults.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Regex a placeholder must match.
    pub fn requirement(mut self, key: impl Into<String>, regex: impl Into<String>) -> Self {
        self.requirements.insert(key.into(), regex.into());
        self
    }

    pub fn requirements<I, K, V>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.requirements
            .extend(requirements.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Only match requests satisfying `condition`, e.g.
    /// `RouteCondition::header("User-Agent", "(?i)firefox")`.
    pub fn condition(mut self, condition: RouteCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn access_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A registered route. Immutable once the table is built.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDefinition {
    pub name: String,
    pub method: HttpMethod,
    pub path: String,
    pub service_id: String,
    pub method_name: String,
    pub defaults: BTreeMap<String, String>,
    pub requirements: BTreeMap<String, String>,
    pub condition: Option<RouteCondition>,
    pub policy: AccessPolicy,
}

impl RouteDefinition {
    /// Attributes handed to the matcher: defaults, target and policy flags.
    pub fn attributes(&self) -> RouteAttributes {
        let mut attributes: RouteAttributes = self
            .defaults
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        attributes.insert(SERVICE.into(), Value::String(self.service_id.clone()));
        attributes.insert(METHOD.into(), Value::String(self.method_name.clone()));
        self.policy.flatten_into(&mut attributes);
        attributes
    }
}
