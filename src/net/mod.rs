//! Network classification subsystem.
//!
//! # Data Flow
//! ```text
//! Client IP / Host header
//!     → classify.rs (public / private / reserved)
//!     → pattern.rs (exact, CIDR, wildcard, range, subdomain)
//!     → Consumed by RouteMatch::verify
//! ```
//!
//! # Design Decisions
//! - Pure functions, no allocation on the hot path beyond host normalization
//! - Malformed patterns never match and never error
//! - IPv4-mapped IPv6 addresses are not unwrapped

pub mod classify;
pub mod pattern;

pub use classify::{is_private_range, is_public_range, is_reserved_range, RangeClass};
pub use pattern::{host_in_list, host_matches, ip_in_list, ip_matches};
