//! Per-request outcome of route matching.
//!
//! # Lifecycle
//! ```text
//! Unvalidated (from matcher attributes)
//!     → verify_client → ClientVerified | ClientRejected
//!     → service       → ServiceResolved | ValidationFailed
//! ```
//! A `RouteMatch` lives for exactly one request.

use serde_json::Value;
use std::collections::BTreeMap;
use std::net::IpAddr;

use crate::http::request::ServiceRequest;
use crate::net::{
    host_in_list, ip_in_list, is_private_range, is_public_range, is_reserved_range, RangeClass,
};
use crate::routing::definition::{
    RouteAttributes, BLACKLIST_HOSTS, BLACKLIST_IPS, METHOD, PRIVATE_RANGES_DENIED,
    PUBLIC_RANGES_DENIED, RESERVED_RANGES_DENIED, ROUTE, SERVICE, WHITELIST_HOSTS, WHITELIST_IPS,
};
use crate::routing::matcher::MatchedRoute;
use crate::security::AccessPolicy;
use crate::service::{
    ContractValidator, ServiceError, ServiceInstance, ServiceLocator, ServiceValidator,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMatch {
    service_id: String,
    method_name: String,
    route_name: String,
    route_params: BTreeMap<String, String>,
    ip_whitelist: Vec<String>,
    host_whitelist: Vec<String>,
    ip_blacklist: Vec<String>,
    host_blacklist: Vec<String>,
    deny_public: bool,
    deny_private: bool,
    deny_reserved: bool,
}

impl RouteMatch {
    pub fn new(service_id: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            method_name: method_name.into(),
            ..Self::default()
        }
    }

    /// Apply an access policy directly, without going through attributes.
    pub fn with_policy(mut self, policy: &AccessPolicy) -> Self {
        self.deny_public = policy.public_ranges_denied();
        self.deny_private = policy.private_ranges_denied();
        self.deny_reserved = policy.reserved_ranges_denied();
        self.ip_whitelist = policy.ip_whitelist().to_vec();
        self.host_whitelist = policy.host_whitelist().to_vec();
        self.ip_blacklist = policy.ip_blacklist().to_vec();
        self.host_blacklist = policy.host_blacklist().to_vec();
        self
    }

    /// Rebuild from matcher attributes.
    ///
    /// Reserved keys only overwrite their member when the value is non-empty.
    /// Keys without a leading `_` become route parameters; unknown reserved
    /// keys are ignored.
    pub fn from_attributes(attributes: &RouteAttributes) -> Self {
        let mut route_match = Self::default();

        for (key, value) in attributes {
            if !key.starts_with('_') {
                route_match.route_params.insert(key.clone(), scalar(value));
                continue;
            }
            if is_empty(value) {
                continue;
            }

            match key.as_str() {
                SERVICE => route_match.service_id = scalar(value),
                METHOD => route_match.method_name = scalar(value),
                ROUTE => route_match.route_name = scalar(value),
                PUBLIC_RANGES_DENIED => route_match.deny_public = truthy(value),
                PRIVATE_RANGES_DENIED => route_match.deny_private = truthy(value),
                RESERVED_RANGES_DENIED => route_match.deny_reserved = truthy(value),
                WHITELIST_IPS => route_match.ip_whitelist = strings(value),
                WHITELIST_HOSTS => route_match.host_whitelist = strings(value),
                BLACKLIST_IPS => route_match.ip_blacklist = strings(value),
                BLACKLIST_HOSTS => route_match.host_blacklist = strings(value),
                _ => {}
            }
        }

        route_match
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn route_name(&self) -> &str {
        &self.route_name
    }

    pub fn route_params(&self) -> &BTreeMap<String, String> {
        &self.route_params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.route_params.get(name).map(String::as_str)
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

    pub fn public_ranges_denied(&self) -> bool {
        self.deny_public
    }

    pub fn private_ranges_denied(&self) -> bool {
        self.deny_private
    }

    pub fn reserved_ranges_denied(&self) -> bool {
        self.deny_reserved
    }

    /// Check the request's client IP and host against the access policy.
    pub fn verify_client(&self, request: &ServiceRequest) -> bool {
        self.verify(&request.client_ip, &request.host)
    }

    /// A range denial can be rescued by the whitelist; a grant can be revoked
    /// by the blacklist.
    pub fn verify(&self, ip: &IpAddr, host: &str) -> bool {
        let range_denied = (self.deny_public && is_public_range(ip))
            || (self.deny_private && is_private_range(ip))
            || (self.deny_reserved && is_reserved_range(ip));

        let granted = if range_denied {
            ip_in_list(ip, &self.ip_whitelist) || host_in_list(host, &self.host_whitelist)
        } else {
            !(ip_in_list(ip, &self.ip_blacklist) || host_in_list(host, &self.host_blacklist))
        };

        tracing::debug!(
            route = %self.route_name,
            client_ip = %ip,
            range = RangeClass::of(ip).as_str(),
            host = %host,
            range_denied,
            granted,
            "Client verification"
        );
        granted
    }

    /// Validate the target with the default contract checks.
    pub fn validate(&self, locator: &ServiceLocator) -> Result<(), ServiceError> {
        self.validate_with(&ContractValidator, locator)
    }

    pub fn validate_with(
        &self,
        validator: &dyn ServiceValidator,
        locator: &ServiceLocator,
    ) -> Result<(), ServiceError> {
        validator.validate(&self.service_id, &self.method_name, locator)
    }

    /// Validate, then create the target service.
    pub fn service(
        &self,
        locator: &ServiceLocator,
    ) -> Result<Box<dyn ServiceInstance>, ServiceError> {
        self.service_with(&ContractValidator, locator)
    }

    pub fn service_with(
        &self,
        validator: &dyn ServiceValidator,
        locator: &ServiceLocator,
    ) -> Result<Box<dyn ServiceInstance>, ServiceError> {
        self.validate_with(validator, locator)?;
        locator.instantiate(&self.service_id)
    }
}

impl From<MatchedRoute> for RouteMatch {
    fn from(matched: MatchedRoute) -> Self {
        Self::from_attributes(&matched.attributes)
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(_) => false,
    }
}

fn truthy(value: &Value) -> bool {
    !is_empty(value)
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn strings(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(scalar).collect(),
        other => vec![scalar(other)],
    }
}
