//! Application bootstrap.
//!
//! # Data Flow
//! ```text
//! BootConfig
//!     → ApplicationBuilder (components, services, routes)
//!     → build(): RouteTableBuilder::build → Matcher
//!                ServiceLocator frozen behind Arc
//!     → Application { Dispatcher, BootConfig }
//!     → handle(request) / serve(listener, shutdown)
//! ```

use std::any::Any;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::{BootConfig, ConfigError};
use crate::http::{Dispatcher, HttpServer, ServiceRequest, ServiceResponse};
use crate::routing::{RouteTableBuilder, RouterError};
use crate::service::{Service, ServiceLocator, ServiceValidator};

/// Errors raised while booting or serving.
#[derive(Debug, Error)]
pub enum BootError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("route table error: {0}")]
    Router(#[from] RouterError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Collects everything the application needs before it can serve.
pub struct ApplicationBuilder {
    config: BootConfig,
    locator: ServiceLocator,
    routes: RouteTableBuilder,
    validator: Option<Box<dyn ServiceValidator>>,
}

impl ApplicationBuilder {
    fn new(config: BootConfig) -> Self {
        let mut routes = RouteTableBuilder::new()
            .app_name(config.app.name.clone())
            .environment(config.app.environment)
            .base_url(&config.router.base_url)
            .fingerprint_check(config.router.fingerprint_check);
        if let Some(dir) = &config.router.cache_dir {
            routes = routes.cache_dir(dir);
        }

        let mut locator = ServiceLocator::new();
        locator
            .set_parameter("app.name", config.app.name.clone())
            .set_parameter("app.environment", config.app.environment.as_str())
            .set_parameter("app.debug", config.app.debug().to_string());

        Self {
            config,
            locator,
            routes,
            validator: None,
        }
    }

    /// Shared component available to service factories.
    pub fn component<T: Any + Send + Sync>(mut self, id: impl Into<String>, component: T) -> Self {
        self.locator.set(id, component);
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.locator.set_parameter(name, value);
        self
    }

    /// Routable service.
    pub fn service<S: Service>(mut self, id: impl Into<String>) -> Self {
        self.locator.register_service::<S>(id);
        self
    }

    /// Register routes on the preconfigured route table builder.
    pub fn routes(mut self, register: impl FnOnce(RouteTableBuilder) -> RouteTableBuilder) -> Self {
        self.routes = register(self.routes);
        self
    }

    pub fn validator(mut self, validator: impl ServiceValidator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn build(self) -> Result<Application, BootError> {
        let matcher = self.routes.build()?;
        tracing::info!(
            app = %self.config.app.name,
            environment = %self.config.app.environment,
            routes = matcher.len(),
            debug = self.config.app.debug(),
            "Application built"
        );

        let mut dispatcher =
            Dispatcher::new(matcher, Arc::new(self.locator), self.config.app.debug());
        if let Some(validator) = self.validator {
            dispatcher = dispatcher.with_validator(validator);
        }

        Ok(Application {
            dispatcher: Arc::new(dispatcher),
            config: self.config,
        })
    }
}

/// A booted application.
pub struct Application {
    dispatcher: Arc<Dispatcher>,
    config: BootConfig,
}

impl Application {
    pub fn builder(config: BootConfig) -> ApplicationBuilder {
        ApplicationBuilder::new(config)
    }

    pub fn config(&self) -> &BootConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Dispatch a single request synchronously.
    pub fn handle(&self, request: &ServiceRequest) -> ServiceResponse {
        self.dispatcher.handle(request)
    }

    /// Serve HTTP on `listener` until `shutdown` fires.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), BootError> {
        HttpServer::new(&self.config, self.dispatcher)
            .run(listener, shutdown)
            .await?;
        Ok(())
    }
}
