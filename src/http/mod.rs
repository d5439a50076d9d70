//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum, request ID, timeout, body limit)
//!     → request.rs (ServiceRequest: client IP, host, body)
//!     → dispatcher.rs (match, verify, invoke, map errors)
//!     → response.rs (ServiceResponse → axum Response)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::Dispatcher;
pub use request::ServiceRequest;
pub use response::ServiceResponse;
pub use server::HttpServer;
