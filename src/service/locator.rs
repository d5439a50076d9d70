//! Service locator.
//!
//! Holds shared components, parameters and service factories. Written while
//! the application is bootstrapped, then shared read-only behind an `Arc`.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::service::contract::{Service, ServiceFactory, ServiceInstance, TypedFactory};
use crate::service::ServiceError;

#[derive(Default)]
pub struct ServiceLocator {
    components: HashMap<String, Arc<dyn Any + Send + Sync>>,
    services: HashMap<String, Arc<dyn ServiceFactory>>,
    parameters: HashMap<String, String>,
}

impl ServiceLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a shared component under `id`.
    pub fn set<T: Any + Send + Sync>(&mut self, id: impl Into<String>, component: T) -> &mut Self {
        self.components.insert(id.into(), Arc::new(component));
        self
    }

    /// Fetch a component, `None` if missing or of another type.
    pub fn get<T: Any + Send + Sync>(&self, id: &str) -> Option<Arc<T>> {
        self.components.get(id)?.clone().downcast::<T>().ok()
    }

    #[track_caller]
    pub fn require<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>, ServiceError> {
        match self.get(id) {
            Some(component) => Ok(component),
            None => Err(ServiceError::runtime(format!(
                "Component '{id}' is missing or has an unexpected type."
            ))),
        }
    }

    /// Whether `id` names a component or a service.
    pub fn has(&self, id: &str) -> bool {
        self.components.contains_key(id) || self.services.contains_key(id)
    }

    /// Register a routable service under `id`.
    pub fn register_service<S: Service>(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        let factory = TypedFactory::<S>::new();
        tracing::debug!(
            service = %id,
            methods = ?factory.method_names(),
            "Registering service"
        );
        self.services.insert(id, Arc::new(factory));
        self
    }

    pub fn is_service(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }

    /// `None` when `id` is not a service.
    pub fn service_has_method(&self, id: &str, method: &str) -> Option<bool> {
        self.services.get(id).map(|factory| factory.has_method(method))
    }

    /// Create a fresh instance of a registered service.
    #[track_caller]
    pub fn instantiate(&self, id: &str) -> Result<Box<dyn ServiceInstance>, ServiceError> {
        match self.services.get(id) {
            Some(factory) => factory.create(id, self),
            None => Err(ServiceError::class_not_found(id)),
        }
    }

    pub fn set_parameter(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }
}

impl fmt::Debug for ServiceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut components: Vec<_> = self.components.keys().collect();
        let mut services: Vec<_> = self.services.keys().collect();
        components.sort();
        services.sort();
        f.debug_struct("ServiceLocator")
            .field("components", &components)
            .field("services", &services)
            .field("parameters", &self.parameters)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::ServiceRequest;
    use crate::routing::RouteMatch;
    use crate::service::{MethodTable, Reply};

    struct Greeter {
        greeting: Arc<String>,
    }

    impl Greeter {
        fn hello(&self, _: &RouteMatch, _: &ServiceRequest) -> Result<Reply, ServiceError> {
            Ok(Reply::Text(self.greeting.to_string()))
        }
    }

    impl Service for Greeter {
        fn create_service(locator: &ServiceLocator) -> Result<Self, ServiceError> {
            Ok(Self {
                greeting: locator.require("greeting")?,
            })
        }

        fn methods(table: &mut MethodTable<Self>) {
            table.method("hello", Self::hello);
        }
    }

    #[test]
    fn test_components() {
        let mut locator = ServiceLocator::new();
        locator.set("greeting", "hi".to_string()).set("answer", 42u32);

        assert_eq!(*locator.get::<u32>("answer").unwrap(), 42);
        assert!(locator.get::<String>("answer").is_none());
        assert!(locator.require::<u32>("missing").is_err());
        assert!(locator.has("greeting"));
        assert!(!locator.is_service("greeting"));
    }

    #[test]
    fn test_services() {
        let mut locator = ServiceLocator::new();
        locator.set("greeting", "hi".to_string());
        locator.register_service::<Greeter>("greeter");

        assert!(locator.has("greeter"));
        assert_eq!(locator.service_has_method("greeter", "hello"), Some(true));
        assert_eq!(locator.service_has_method("greeter", "bye"), Some(false));
        assert_eq!(locator.service_has_method("greeting", "hello"), None);
        assert!(locator.instantiate("greeter").is_ok());
        assert!(matches!(
            locator.instantiate("nope"),
            Err(ServiceError::ClassNotFound { .. })
        ));
    }

    #[test]
    fn test_factory_error_propagates() {
        let mut locator = ServiceLocator::new();
        locator.register_service::<Greeter>("greeter");
        assert!(matches!(
            locator.instantiate("greeter"),
            Err(ServiceError::Runtime { .. })
        ));
    }

    #[test]
    fn test_parameters() {
        let mut locator = ServiceLocator::new();
        locator.set_parameter("app.name", "SimpleMicroService");
        assert_eq!(locator.parameter("app.name"), Some("SimpleMicroService"));
        assert_eq!(locator.parameter("missing"), None);
    }
}
