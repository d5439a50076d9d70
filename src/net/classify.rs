//! IP range classification.
//!
//! # Ranges
//! - Private: `10.0.0.0/8`, `172.16.0.0/12`, `192.168.0.0/16`, `fc00::/7`
//! - Reserved: `0.0.0.0/8`, `127.0.0.0/8`, `169.254.0.0/16`, `240.0.0.0/4`,
//!   `::/128`, `::1/128`, `5f00::/8`, `fe80::/10`, `2001:db8::/32`,
//!   `2001:10::/28`, `3ff3::/16`
//! - Public: everything else
//!
//! IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are classified as IPv6 and
//! therefore count as public.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Range class of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeClass {
    Public,
    Private,
    Reserved,
}

impl RangeClass {
    pub fn of(ip: &IpAddr) -> Self {
        if is_reserved_range(ip) {
            RangeClass::Reserved
        } else if is_private_range(ip) {
            RangeClass::Private
        } else {
            RangeClass::Public
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeClass::Public => "public",
            RangeClass::Private => "private",
            RangeClass::Reserved => "reserved",
        }
    }
}

/// True if the address is routable and neither private nor reserved.
pub fn is_public_range(ip: &IpAddr) -> bool {
    !is_private_range(ip) && !is_reserved_range(ip)
}

/// True if the address is in an RFC1918 (or IPv6 unique local) block.
pub fn is_private_range(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private(),
        IpAddr::V6(v6) => (v6.segments()[0] & 0xfe00) == 0xfc00,
    }
}

/// True if the address is in a reserved block (loopback, link-local, ...).
pub fn is_reserved_range(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_reserved_v4(v4),
        IpAddr::V6(v6) => is_reserved_v6(v6),
    }
}

fn is_reserved_v4(ip: &Ipv4Addr) -> bool {
    let [a, b, _, _] = ip.octets();
    a == 0 || a == 127 || (a == 169 && b == 254) || a >= 240
}

fn is_reserved_v6(ip: &Ipv6Addr) -> bool {
    let s = ip.segments();
    ip.is_unspecified()
        || ip.is_loopback()
        || (s[0] & 0xff00) == 0x5f00
        || (s[0] & 0xffc0) == 0xfe80
        || (s[0] == 0x2001 && s[1] == 0x0db8)
        || (s[0] == 0x2001 && (0x0010..=0x001f).contains(&s[1]))
        || s[0] == 0x3ff3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_ipv4_classes() {
        assert!(is_public_range(&ip("93.184.216.34")));
        assert!(is_private_range(&ip("192.168.0.1")));
        assert!(is_private_range(&ip("10.1.2.3")));
        assert!(is_private_range(&ip("172.31.255.255")));
        assert!(!is_private_range(&ip("172.32.0.1")));
        assert!(is_reserved_range(&ip("127.0.0.1")));
        assert!(is_reserved_range(&ip("169.254.10.1")));
        assert!(is_reserved_range(&ip("0.1.2.3")));
        assert!(is_reserved_range(&ip("250.0.0.1")));
    }

    #[test]
    fn test_classes_are_exclusive() {
        for addr in ["8.8.8.8", "192.168.1.1", "127.0.0.1", "::1", "fd00::1", "2a00:1450::1"] {
            let addr = ip(addr);
            let hits = [is_public_range(&addr), is_private_range(&addr), is_reserved_range(&addr)]
                .iter()
                .filter(|b| **b)
                .count();
            assert_eq!(hits, 1, "{addr} must belong to exactly one class");
        }
    }

    #[test]
    fn test_ipv6_classes() {
        assert!(is_reserved_range(&ip("::1")));
        assert!(is_reserved_range(&ip("::")));
        assert!(is_reserved_range(&ip("fe80::1")));
        assert!(is_reserved_range(&ip("2001:db8::1")));
        assert!(is_private_range(&ip("fd12:3456::1")));
        assert!(is_public_range(&ip("2a00:1450:4001::1")));
        // Mapped addresses are not unwrapped.
        assert!(is_public_range(&ip("0:0:0:0:0:ffff:5596:4c33")));
    }

    #[test]
    fn test_range_class_of() {
        assert_eq!(RangeClass::of(&ip("8.8.8.8")), RangeClass::Public);
        assert_eq!(RangeClass::of(&ip("10.0.0.1")).as_str(), "private");
        assert_eq!(RangeClass::of(&ip("127.0.0.1")), RangeClass::Reserved);
    }
}
