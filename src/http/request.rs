//! Framework-neutral request handed to the dispatcher.
//!
//! # Responsibilities
//! - Capture method, path, query, headers and the buffered body
//! - Resolve the client IP (peer address or trusted `X-Forwarded-For`)
//! - Resolve the host (`Host` header without port, else URI authority)
//!
//! # Design Decisions
//! - `X-Forwarded-For` is only honored when the peer is a trusted proxy
//! - Forwarded entries are walked right to left, skipping trusted hops

use axum::body::Bytes;
use axum::http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue, Method};
use std::net::{IpAddr, Ipv4Addr};

use crate::net::ip_in_list;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// A buffered HTTP request.
#[derive(Debug, Clone)]
pub struct ServiceRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub client_ip: IpAddr,
    pub host: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ServiceRequest {
    /// Request from localhost. `target` may carry a query string.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };
        Self {
            method,
            path,
            query,
            client_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            host: "localhost".to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = ip;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Build from the parts of an incoming request.
    pub fn from_parts(
        parts: &Parts,
        peer: IpAddr,
        body: Bytes,
        trusted_proxies: &[String],
    ) -> Self {
        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            client_ip: resolve_client_ip(&parts.headers, peer, trusted_proxies),
            host: resolve_host(parts),
            headers: parts.headers.clone(),
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Value of a query string parameter (first occurrence, not decoded).
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.as_deref()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key == name).then_some(value)
        })
    }
}

fn resolve_client_ip(headers: &HeaderMap, peer: IpAddr, trusted_proxies: &[String]) -> IpAddr {
    if trusted_proxies.is_empty() || !ip_in_list(&peer, trusted_proxies) {
        return peer;
    }

    let forwarded: Vec<IpAddr> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|entry| entry.trim().parse().ok())
        .collect();

    forwarded
        .iter()
        .rev()
        .find(|ip| !ip_in_list(ip, trusted_proxies))
        .or_else(|| forwarded.first())
        .copied()
        .unwrap_or(peer)
}

fn resolve_host(parts: &Parts) -> String {
    let raw = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| parts.uri.host())
        .unwrap_or_default();
    strip_port(raw).to_ascii_lowercase()
}

fn strip_port(host: &str) -> &str {
    // Bracketed IPv6 literal, e.g. [::1]:8080
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}
