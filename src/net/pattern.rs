//! IP and host pattern matching.
//!
//! # IPv4 pattern formats (evaluated in this order)
//! 1. Exact address: `1.2.3.4`
//! 2. CIDR: `1.2.3.0/24`, short form `1.2.3/24`, dotted mask `1.2.0.0/255.255.0.0`
//! 3. Wildcard: `1.2.3.*`, `1.2.*.*` or `1.2.*` (trailing octets default to `*`)
//! 4. Start-end range: `1.2.3.0-1.2.3.255` (inclusive)
//!
//! IPv6 patterns support exact addresses and CIDR blocks.
//!
//! # Design Decisions
//! - Patterns are not validated up front; a malformed pattern never matches
//! - Octets are parsed leniently (`09` is read as `9`)
//! - Lists short-circuit on the first matching entry

use ipnet::Ipv6Net;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Check a single address against a pattern.
pub fn ip_matches(ip: &IpAddr, pattern: &str) -> bool {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return false;
    }

    match ip {
        IpAddr::V4(v4) => ipv4_matches(*v4, pattern),
        IpAddr::V6(v6) => ipv6_matches(v6, pattern),
    }
}

/// True if any pattern in the list matches.
pub fn ip_in_list<S: AsRef<str>>(ip: &IpAddr, patterns: &[S]) -> bool {
    patterns.iter().any(|p| ip_matches(ip, p.as_ref()))
}

/// True if `host` equals `domain` or is a subdomain of it.
///
/// `foo.example.com` matches `example.com`, `evilexample.com` does not.
pub fn host_matches(host: &str, domain: &str) -> bool {
    let host = normalize_host(host);
    let domain = normalize_host(domain);
    if host.is_empty() || domain.is_empty() {
        return false;
    }
    if host == domain {
        return true;
    }

    host.len() > domain.len() + 1
        && host.ends_with(&domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

/// True if the host matches any domain in the list.
pub fn host_in_list<S: AsRef<str>>(host: &str, domains: &[S]) -> bool {
    domains.iter().any(|d| host_matches(host, d.as_ref()))
}

fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn ipv4_matches(ip: Ipv4Addr, pattern: &str) -> bool {
    let ip = u32::from(ip);

    if let Some(exact) = parse_ipv4(pattern) {
        return exact == ip;
    }

    if let Some((network, mask)) = pattern.split_once('/') {
        return cidr_matches(ip, network, mask);
    }

    if pattern.contains('*') {
        return wildcard_range(pattern)
            .map(|(lower, upper)| (lower..=upper).contains(&ip))
            .unwrap_or(false);
    }

    if let Some((lower, upper)) = pattern.split_once('-') {
        return match (parse_ipv4(lower), parse_ipv4(upper)) {
            (Some(lower), Some(upper)) => (lower..=upper).contains(&ip),
            _ => false,
        };
    }

    false
}

fn cidr_matches(ip: u32, network: &str, mask: &str) -> bool {
    let mask = mask.trim();
    let netmask = if mask.contains('.') {
        match parse_ipv4(&mask.replace('*', "0")) {
            Some(m) => m,
            None => return false,
        }
    } else {
        match mask.parse::<u32>() {
            Ok(0) => 0,
            Ok(bits) if bits <= 32 => u32::MAX << (32 - bits),
            _ => return false,
        }
    };

    match parse_ipv4_padded(network) {
        Some(network) => (ip & netmask) == (network & netmask),
        None => false,
    }
}

/// Convert `a.b.*.*` into a numeric `(lower, upper)` pair.
fn wildcard_range(pattern: &str) -> Option<(u32, u32)> {
    let mut parts: Vec<&str> = pattern.split('.').collect();
    if parts.len() > 4 {
        return None;
    }
    if parts.len() < 4 && parts.last() == Some(&"*") {
        parts.resize(4, "*");
    }
    let expanded = parts.join(".");
    let lower = parse_ipv4(&expanded.replace('*', "0"))?;
    let upper = parse_ipv4(&expanded.replace('*', "255"))?;
    Some((lower, upper))
}

/// Parse a dotted quad, accepting leading zeros in octets.
fn parse_ipv4(s: &str) -> Option<u32> {
    let mut octets = [0u8; 4];
    let mut count = 0;
    for part in s.trim().split('.') {
        if count == 4 {
            return None;
        }
        octets[count] = part.trim().parse::<u8>().ok()?;
        count += 1;
    }
    (count == 4).then(|| u32::from(Ipv4Addr::from(octets)))
}

/// Like [`parse_ipv4`] but missing or empty octets become `0` (`1.2.3` → `1.2.3.0`).
fn parse_ipv4_padded(s: &str) -> Option<u32> {
    let mut parts: Vec<&str> = s.trim().split('.').collect();
    if parts.len() > 4 {
        return None;
    }
    parts.resize(4, "0");
    let normalized: Vec<&str> = parts
        .into_iter()
        .map(|p| if p.trim().is_empty() { "0" } else { p })
        .collect();
    parse_ipv4(&normalized.join("."))
}

fn ipv6_matches(ip: &Ipv6Addr, pattern: &str) -> bool {
    if let Ok(exact) = pattern.parse::<Ipv6Addr>() {
        return &exact == ip;
    }
    pattern
        .parse::<Ipv6Net>()
        .map(|net| net.contains(ip))
        .unwrap_or(false)
}
