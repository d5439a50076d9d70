//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (at startup):
//!     builder.rs (verbs, table defaults, base URL)
//!     → definition.rs (RouteDefinition + flattened attributes)
//!     → path.rs (placeholder regex per route)
//!     → cache.rs (optional JSON artifact in production)
//!     → matcher.rs (immutable Matcher)
//!
//! Incoming request (method, percent-decoded path, headers):
//!     → Matcher::match_request → MatchedRoute | NotFound | MethodNotAllowed
//!     → route_match.rs (RouteMatch: params, policy, target)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: first registered match wins
//! - Artifact name keyed on route count, contents verified by fingerprint

use std::path::PathBuf;
use thiserror::Error;

pub mod builder;
pub mod cache;
pub mod definition;
pub mod matcher;
pub mod path;
pub mod route_match;

pub use builder::RouteTableBuilder;
pub use definition::{HttpMethod, RouteAttributes, RouteCondition, RouteDefinition, RouteOptions};
pub use matcher::{MatchError, MatchedRoute, Matcher};
pub use route_match::RouteMatch;

/// Errors raised while building the route table.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("invalid route pattern '{path}': {reason}")]
    InvalidPattern { path: String, reason: String },

    #[error("invalid requirement for '{variable}': {reason}")]
    InvalidRequirement { variable: String, reason: String },

    #[error("invalid condition on header '{header}': {reason}")]
    InvalidCondition { header: String, reason: String },

    #[error("route cache I/O error at {}: {source}", .path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("route cache format error: {0}")]
    CacheFormat(#[source] serde_json::Error),
}
