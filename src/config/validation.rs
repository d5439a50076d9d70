//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Refuse debug output in production
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BootConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::BootConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("app.name must be a non-empty alphanumeric identifier, got '{0}'")]
    InvalidAppName(String),

    #[error("{field} is not a valid socket address: '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("app.debug cannot be enabled in the prod environment")]
    DebugInProduction,

    #[error("router.cache_dir cannot be empty")]
    EmptyCacheDir,
}

pub fn validate_config(config: &BootConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let name = &config.app.name;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        errors.push(ValidationError::InvalidAppName(name.clone()));
    }

    if config.app.environment.is_production() && config.app.debug == Some(true) {
        errors.push(ValidationError::DebugInProduction);
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::NotPositive("limits.request_timeout_secs"));
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::NotPositive("limits.max_body_size"));
    }

    if matches!(&config.router.cache_dir, Some(dir) if dir.as_os_str().is_empty()) {
        errors.push(ValidationError::EmptyCacheDir);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
