//! Service validation before dispatch.

use crate::service::{ServiceError, ServiceLocator};

/// Checks that a route's target can be invoked.
///
/// The dispatcher uses [`ContractValidator`] unless another implementation is
/// supplied.
pub trait ServiceValidator: Send + Sync {
    fn validate(
        &self,
        service_id: &str,
        method: &str,
        locator: &ServiceLocator,
    ) -> Result<(), ServiceError>;
}

impl<V: ServiceValidator + ?Sized> ServiceValidator for Box<V> {
    fn validate(
        &self,
        service_id: &str,
        method: &str,
        locator: &ServiceLocator,
    ) -> Result<(), ServiceError> {
        (**self).validate(service_id, method, locator)
    }
}

/// Ordered checks: the identifier exists, it is a service, the method exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractValidator;

impl ServiceValidator for ContractValidator {
    fn validate(
        &self,
        service_id: &str,
        method: &str,
        locator: &ServiceLocator,
    ) -> Result<(), ServiceError> {
        if !locator.has(service_id) {
            return Err(ServiceError::class_not_found(service_id));
        }

        match locator.service_has_method(service_id, method) {
            None => Err(ServiceError::logic(
                service_id,
                method,
                format!("'{service_id}' does not implement the Service contract."),
            )),
            Some(false) => Err(ServiceError::method_not_found(service_id, method)),
            Some(true) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::ServiceRequest;
    use crate::routing::RouteMatch;
    use crate::service::{MethodTable, Reply, Service};

    struct Ping;

    impl Ping {
        fn ping(&self, _: &RouteMatch, _: &ServiceRequest) -> Result<Reply, ServiceError> {
            Ok(Reply::from("pong"))
        }
    }

    impl Service for Ping {
        fn create_service(_: &ServiceLocator) -> Result<Self, ServiceError> {
            Ok(Ping)
        }

        fn methods(table: &mut MethodTable<Self>) {
            table.method("ping", Self::ping);
        }
    }

    fn locator() -> ServiceLocator {
        let mut locator = ServiceLocator::new();
        locator.register_service::<Ping>("ping");
        locator.set("plain", 1u8);
        locator
    }

    #[test]
    fn test_checks_are_ordered() {
        let locator = locator();
        let validator = ContractValidator;

        assert!(validator.validate("ping", "ping", &locator).is_ok());
        assert!(matches!(
            validator.validate("missing", "ping", &locator),
            Err(ServiceError::ClassNotFound { .. })
        ));
        assert!(matches!(
            validator.validate("plain", "nope", &locator),
            Err(ServiceError::Logic { .. })
        ));
        assert!(matches!(
            validator.validate("ping", "nope", &locator),
            Err(ServiceError::MethodNotFound { .. })
        ));
    }
}
