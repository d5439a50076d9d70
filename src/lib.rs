//! Boot: HTTP routing, access control and service dispatch.
//!
//! Routes map `(verb, path)` to a named service method. Each route carries an
//! access policy (IP ranges, IP and host allow/deny lists) checked before the
//! service is created and invoked. Every failure is mapped to a response.

// Core subsystems
pub mod http;
pub mod net;
pub mod routing;
pub mod service;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod utils;

pub mod app;

pub use app::{Application, ApplicationBuilder, BootError};
pub use config::BootConfig;
pub use http::{Dispatcher, HttpServer, ServiceRequest, ServiceResponse};
pub use lifecycle::Shutdown;
pub use routing::{RouteCondition, RouteMatch, RouteOptions, RouteTableBuilder};
pub use security::AccessPolicy;
pub use service::{MethodTable, Reply, Service, ServiceError, ServiceLocator};
