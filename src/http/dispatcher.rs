//! Front controller.
//!
//! # Data Flow
//! ```text
//! ServiceRequest
//!     → Matcher::match_request (404 / 405)
//!     → RouteMatch::verify_client (403)
//!     → validate + create service + invoke (500 on failure, panics caught)
//!     → Reply::into_response
//!     → ServiceResponse
//! ```
//!
//! # Design Decisions
//! - Every failure becomes a response; nothing escapes `handle`
//! - Debug mode is fixed at construction
//! - Synchronous: the HTTP layer runs it on the blocking pool

use axum::http::{header, HeaderValue, StatusCode};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::http::request::ServiceRequest;
use crate::http::response::ServiceResponse;
use crate::observability::metrics;
use crate::routing::{MatchError, Matcher, RouteMatch};
use crate::service::{ContractValidator, ServiceError, ServiceLocator, ServiceValidator};

pub const NOT_FOUND_BODY: &str = "NOT FOUND";
pub const METHOD_NOT_ALLOWED_BODY: &str = "METHOD NOT ALLOWED";
pub const CLIENT_REJECTED_BODY: &str = "CLIENT REJECTED";
pub const LOGIC_ERROR_BODY: &str = "This service is not available because of technical problems. Please let us know so we can fix this problem as soon as possible.";
pub const UNKNOWN_ERROR_BODY: &str = "An unknown error occurred.";

/// Resolves, verifies and invokes services for requests.
pub struct Dispatcher {
    matcher: Arc<Matcher>,
    locator: Arc<ServiceLocator>,
    validator: Box<dyn ServiceValidator>,
    debug: bool,
}

impl Dispatcher {
    pub fn new(matcher: Matcher, locator: Arc<ServiceLocator>, debug: bool) -> Self {
        Self {
            matcher: Arc::new(matcher),
            locator,
            validator: Box::new(ContractValidator),
            debug,
        }
    }

    /// Replace the default contract checks.
    pub fn with_validator(mut self, validator: impl ServiceValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn locator(&self) -> &ServiceLocator {
        &self.locator
    }

    /// Turn a request into a response. Never fails.
    pub fn handle(&self, request: &ServiceRequest) -> ServiceResponse {
        let start = Instant::now();
        let (response, route) = self.dispatch(request);

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            route = %route,
            status = response.status.as_u16(),
            "Request dispatched"
        );
        metrics::record_dispatch(request.method.as_str(), response.status.as_u16(), &route, start);
        response
    }

    fn dispatch(&self, request: &ServiceRequest) -> (ServiceResponse, String) {
        let matched = match self.matcher.match_request(
            request.method.as_str(),
            &request.path,
            &request.headers,
        ) {
            Ok(matched) => matched,
            Err(MatchError::NotFound) => {
                tracing::debug!(method = %request.method, path = %request.path, "No route matched");
                return (self.status_response(StatusCode::NOT_FOUND, NOT_FOUND_BODY), "none".into());
            }
            Err(MatchError::MethodNotAllowed { allowed }) => {
                tracing::debug!(
                    method = %request.method,
                    path = %request.path,
                    allowed = %allowed.join(", "),
                    "Method not allowed"
                );
                let mut response =
                    self.status_response(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_BODY);
                if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
                    response.headers.insert(header::ALLOW, value);
                }
                return (response, "none".into());
            }
        };

        let route_match = RouteMatch::from(matched);
        let route = route_match.route_name().to_string();

        if !route_match.verify_client(request) {
            tracing::warn!(
                route = %route,
                client_ip = %request.client_ip,
                host = %request.host,
                "Client rejected"
            );
            metrics::record_client_rejected(&route);
            return (self.status_response(StatusCode::FORBIDDEN, CLIENT_REJECTED_BODY), route);
        }

        let response = match self.invoke(&route_match, request) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    route = %route,
                    service = %route_match.service_id(),
                    method = %route_match.method_name(),
                    error = %e,
                    location = %e.location(),
                    "Service dispatch failed"
                );
                self.error_response(&e)
            }
        };
        (response, route)
    }

    fn invoke(
        &self,
        route_match: &RouteMatch,
        request: &ServiceRequest,
    ) -> Result<ServiceResponse, ServiceError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let service = route_match.service_with(self.validator.as_ref(), &self.locator)?;
            service.invoke(route_match, request)
        }));

        let reply = match outcome {
            Ok(reply) => reply?,
            Err(payload) => return Err(ServiceError::runtime(panic_message(payload.as_ref()))),
        };
        reply.into_response()
    }

    /// Status-only response; the body is only filled in debug mode.
    fn status_response(&self, status: StatusCode, debug_body: &str) -> ServiceResponse {
        if self.debug {
            ServiceResponse::text(status, debug_body)
        } else {
            ServiceResponse::new(status)
        }
    }

    fn error_response(&self, error: &ServiceError) -> ServiceResponse {
        let body = match error {
            ServiceError::MethodNotFound { .. } => error.to_string(),
            _ if self.debug => debug_body(error),
            ServiceError::ClassNotFound { .. } => error.to_string(),
            ServiceError::Logic { .. } => LOGIC_ERROR_BODY.to_string(),
            _ => UNKNOWN_ERROR_BODY.to_string(),
        };
        ServiceResponse::text(StatusCode::INTERNAL_SERVER_ERROR, body)
    }
}

fn debug_body(error: &ServiceError) -> String {
    let location = error.location();
    format!(
        "Error: {} on line {} in file {}.",
        error,
        location.line(),
        location.file()
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "service panicked".to_string()
    }
}
