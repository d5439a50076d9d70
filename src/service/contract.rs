//! The contract every routable service fulfils.
//!
//! A service is a plain type with a factory (`create_service`) and a table of
//! named methods. The table is built once, when the service is registered on
//! the locator, so per-request dispatch is a map lookup on a typed function
//! pointer.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::http::request::ServiceRequest;
use crate::routing::RouteMatch;
use crate::service::{Reply, ServiceError, ServiceLocator};

/// Signature of a routable service method.
pub type ServiceMethod<S> = fn(&S, &RouteMatch, &ServiceRequest) -> Result<Reply, ServiceError>;

/// A request handler type.
pub trait Service: Sized + Send + Sync + 'static {
    /// Build an instance, pulling dependencies from the locator.
    fn create_service(locator: &ServiceLocator) -> Result<Self, ServiceError>;

    /// Register the methods routes may target.
    fn methods(table: &mut MethodTable<Self>);

    /// Runs before the target method. An error aborts the call.
    fn pre_invoke(&self, _method: &str, _request: &ServiceRequest) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Runs after the target method succeeded and may replace the reply.
    fn post_invoke(
        &self,
        _method: &str,
        _request: &ServiceRequest,
        reply: Reply,
    ) -> Result<Reply, ServiceError> {
        Ok(reply)
    }
}

/// Named methods of a service.
pub struct MethodTable<S> {
    methods: BTreeMap<String, ServiceMethod<S>>,
}

impl<S> MethodTable<S> {
    pub fn new() -> Self {
        Self {
            methods: BTreeMap::new(),
        }
    }

    pub fn method(&mut self, name: impl Into<String>, method: ServiceMethod<S>) -> &mut Self {
        self.methods.insert(name.into(), method);
        self
    }

    pub fn get(&self, name: &str) -> Option<ServiceMethod<S>> {
        self.methods.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

impl<S> Default for MethodTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// A live service ready to serve one request.
pub trait ServiceInstance {
    /// Run pre-hook, the method named by the route match, then post-hook.
    fn invoke(
        &self,
        route_match: &RouteMatch,
        request: &ServiceRequest,
    ) -> Result<Reply, ServiceError>;
}

/// Type-erased factory stored by the locator.
pub(crate) trait ServiceFactory: Send + Sync {
    fn has_method(&self, method: &str) -> bool;
    fn method_names(&self) -> Vec<&str>;
    fn create(
        &self,
        service_id: &str,
        locator: &ServiceLocator,
    ) -> Result<Box<dyn ServiceInstance>, ServiceError>;
}

pub(crate) struct TypedFactory<S> {
    methods: Arc<MethodTable<S>>,
}

impl<S: Service> TypedFactory<S> {
    pub(crate) fn new() -> Self {
        let mut table = MethodTable::new();
        S::methods(&mut table);
        Self {
            methods: Arc::new(table),
        }
    }
}

impl<S: Service> ServiceFactory for TypedFactory<S> {
    fn has_method(&self, method: &str) -> bool {
        self.methods.contains(method)
    }

    fn method_names(&self) -> Vec<&str> {
        self.methods.names().collect()
    }

    fn create(
        &self,
        service_id: &str,
        locator: &ServiceLocator,
    ) -> Result<Box<dyn ServiceInstance>, ServiceError> {
        let service = S::create_service(locator)?;
        Ok(Box::new(Bound {
            service_id: service_id.to_string(),
            service,
            methods: Arc::clone(&self.methods),
        }))
    }
}

struct Bound<S> {
    service_id: String,
    service: S,
    methods: Arc<MethodTable<S>>,
}

impl<S: Service> ServiceInstance for Bound<S> {
    fn invoke(
        &self,
        route_match: &RouteMatch,
        request: &ServiceRequest,
    ) -> Result<Reply, ServiceError> {
        let name = route_match.method_name();
        let method = self
            .methods
            .get(name)
            .ok_or_else(|| ServiceError::method_not_found(&self.service_id, name))?;

        self.service.pre_invoke(name, request)?;
        let reply = method(&self.service, route_match, request)?;
        self.service.post_invoke(name, request, reply)
    }
}
