//! Service resolution and invocation errors.
//!
//! Every variant records the source location it was created at, which the
//! dispatcher prints in debug mode.

use std::panic::Location;
use thiserror::Error;

/// Errors raised while resolving or invoking a service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service identifier is unknown to the locator.
    #[error("The service '{service}' does not exist.")]
    ClassNotFound {
        service: String,
        location: &'static Location<'static>,
    },

    /// The service has no method with this name.
    #[error("The {method} method does not exist.")]
    MethodNotFound {
        service: String,
        method: String,
        location: &'static Location<'static>,
    },

    /// The target exists but cannot be used as a service.
    #[error("{reason}")]
    Logic {
        service: String,
        method: String,
        reason: String,
        location: &'static Location<'static>,
    },

    /// A handler produced a value that cannot become a response.
    #[error("Invalid response format: {message}")]
    InvalidResponseFormat {
        message: String,
        location: &'static Location<'static>,
    },

    /// Anything a handler fails with.
    #[error("{message}")]
    Runtime {
        message: String,
        location: &'static Location<'static>,
    },
}

impl ServiceError {
    #[track_caller]
    pub fn class_not_found(service: impl Into<String>) -> Self {
        Self::ClassNotFound {
            service: service.into(),
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub fn method_not_found(service: impl Into<String>, method: impl Into<String>) -> Self {
        Self::MethodNotFound {
            service: service.into(),
            method: method.into(),
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub fn logic(
        service: impl Into<String>,
        method: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Logic {
            service: service.into(),
            method: method.into(),
            reason: reason.into(),
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub fn invalid_response_format(message: impl Into<String>) -> Self {
        Self::InvalidResponseFormat {
            message: message.into(),
            location: Location::caller(),
        }
    }

    /// Generic failure from inside a service method.
    #[track_caller]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            location: Location::caller(),
        }
    }

    /// Where the error was created.
    pub fn location(&self) -> &'static Location<'static> {
        match self {
            Self::ClassNotFound { location, .. }
            | Self::MethodNotFound { location, .. }
            | Self::Logic { location, .. }
            | Self::InvalidResponseFormat { location, .. }
            | Self::Runtime { location, .. } => location,
        }
    }
}

impl From<std::io::Error> for ServiceError {
    #[track_caller]
    fn from(e: std::io::Error) -> Self {
        Self::runtime(e.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    #[track_caller]
    fn from(e: serde_json::Error) -> Self {
        Self::runtime(e.to_string())
    }
}
