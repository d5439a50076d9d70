//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration:
//!     → access_policy.rs (fluent allow/deny rules)
//!     → flattened into route attributes
//!
//! Incoming request:
//!     → RouteMatch rebuilds the rules from attributes
//!     → net::classify / net::pattern decide
//! ```
//!
//! # Design Decisions
//! - Default policy is fully public
//! - Whitelist only rescues a range denial, blacklist only revokes a grant
//! - Pattern syntax is not validated here

pub mod access_policy;

pub use access_policy::AccessPolicy;
