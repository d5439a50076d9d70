//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Every section
//! has defaults so a minimal file (or none at all) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BootConfig {
    /// Application identity and mode.
    pub app: AppConfig,

    /// Listener configuration (bind address, proxies).
    pub listener: ListenerConfig,

    /// Route table settings.
    pub router: RouterConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Test,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }

    /// Optimized mode: compiled artifacts, no debug output by default.
    pub fn is_production(&self) -> bool {
        *self == Environment::Prod
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name, part of the compiled route table name.
    pub name: String,

    pub environment: Environment,

    /// Leak error details into responses. Defaults to `environment != prod`.
    pub debug: Option<bool>,
}

impl AppConfig {
    pub fn debug(&self) -> bool {
        self.debug.unwrap_or(!self.environment.is_production())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "SimpleMicroService".to_string(),
            environment: Environment::Dev,
            debug: None,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// IP patterns of proxies whose `X-Forwarded-For` is trusted.
    pub trusted_proxies: Vec<String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            trusted_proxies: Vec::new(),
        }
    }
}

/// Route table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Prefix prepended to every route.
    pub base_url: String,

    /// Directory for the compiled route table (production only).
    pub cache_dir: Option<PathBuf>,

    /// Verify the artifact fingerprint before loading it.
    pub fingerprint_check: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            cache_dir: None,
            fingerprint_check: true,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Total request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum buffered request body in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            max_body_size: 2 * 1024 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BootConfig::default();
        assert_eq!(config.app.environment, Environment::Dev);
        assert!(config.app.debug());
        assert_eq!(config.limits.request_timeout_secs, 30);
        assert_eq!(config.limits.max_body_size, 2_097_152);
        assert!(config.router.fingerprint_check);
        assert!(config.router.cache_dir.is_none());
    }

    #[test]
    fn test_debug_follows_environment() {
        let mut app = AppConfig {
            environment: Environment::Prod,
            ..AppConfig::default()
        };
        assert!(!app.debug());

        app.debug = Some(true);
        assert!(app.debug());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: BootConfig = toml::from_str(
            r#"
            [app]
            name = "Employees"
            environment = "prod"

            [router]
            cache_dir = "var/cache"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.app.name, "Employees");
        assert!(config.app.environment.is_production());
        assert_eq!(config.router.cache_dir, Some(PathBuf::from("var/cache")));
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
