//! Service subsystem.
//!
//! # Data Flow
//! ```text
//! Bootstrap:
//!     ServiceLocator::register_service::<S>(id)
//!     → S::methods() builds the method table once
//!
//! Per request:
//!     RouteMatch::validate (validator.rs, ordered checks)
//!     → ServiceLocator::instantiate → S::create_service(locator)
//!     → pre_invoke → method → post_invoke
//!     → Reply::into_response (reply.rs)
//! ```
//!
//! # Design Decisions
//! - Methods are typed function pointers, looked up by name from the route
//! - Return values are a closed sum type, no runtime type inspection
//! - Errors carry their creation site for debug output

pub mod contract;
pub mod error;
pub mod locator;
pub mod reply;
pub mod validator;

pub use contract::{MethodTable, Service, ServiceInstance, ServiceMethod};
pub use error::ServiceError;
pub use locator::ServiceLocator;
pub use reply::Reply;
pub use validator::{ContractValidator, ServiceValidator};
