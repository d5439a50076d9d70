//! Shared fixtures for integration tests.

#![allow(dead_code)]

use axum::http::Method;
use serde_json::json;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use boot::{
    Application, Dispatcher, MethodTable, Reply, RouteMatch, RouteTableBuilder, Service,
    ServiceError, ServiceLocator, ServiceRequest, Shutdown,
};

pub const PUBLIC_IP: &str = "93.184.216.34";
pub const PRIVATE_IP: &str = "192.168.1.10";
pub const RUNTIME_ERROR: &str = "Something went wrong";

/// Service covering every reply and failure shape.
pub struct FooService {
    greeting: Arc<String>,
}

impl FooService {
    fn bar(&self, _: &RouteMatch, _: &ServiceRequest) -> Result<Reply, ServiceError> {
        Ok(json!([{"id": 1, "name": "Foo"}]).into())
    }

    fn greet(&self, _: &RouteMatch, _: &ServiceRequest) -> Result<Reply, ServiceError> {
        Ok(self.greeting.as_str().into())
    }

    fn echo(&self, route: &RouteMatch, _: &ServiceRequest) -> Result<Reply, ServiceError> {
        let params: Vec<String> = route
            .route_params()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        Ok(format!("{}|{}|{}", route.route_name(), route.method_name(), params.join(",")).into())
    }

    fn empty(&self, _: &RouteMatch, _: &ServiceRequest) -> Result<Reply, ServiceError> {
        Ok(Reply::Empty)
    }

    fn fail(&self, _: &RouteMatch, _: &ServiceRequest) -> Result<Reply, ServiceError> {
        Err(ServiceError::runtime(RUNTIME_ERROR))
    }

    fn explode(&self, _: &RouteMatch, _: &ServiceRequest) -> Result<Reply, ServiceError> {
        panic!("handler exploded")
    }

    fn invalid(&self, _: &RouteMatch, _: &ServiceRequest) -> Result<Reply, ServiceError> {
        let mut map = HashMap::new();
        map.insert(vec![1u8, 2], "not a string key");
        Reply::json(&map)
    }
}

impl Service for FooService {
    fn create_service(locator: &ServiceLocator) -> Result<Self, ServiceError> {
        Ok(Self {
            greeting: locator.require("greeting")?,
        })
    }

    fn methods(table: &mut MethodTable<Self>) {
        table
            .method("bar", Self::bar)
            .method("greet", Self::greet)
            .method("echo", Self::echo)
            .method("empty", Self::empty)
            .method("fail", Self::fail)
            .method("explode", Self::explode)
            .method("invalid", Self::invalid)
            .method("guarded", Self::greet);
    }

    fn pre_invoke(&self, method: &str, request: &ServiceRequest) -> Result<(), ServiceError> {
        if method == "guarded" && request.header("x-deny").is_some() {
            return Err(ServiceError::runtime("guarded method refused"));
        }
        Ok(())
    }
}

/// A service whose factory always fails.
pub struct BrokenService;

impl BrokenService {
    fn run(&self, _: &RouteMatch, _: &ServiceRequest) -> Result<Reply, ServiceError> {
        Ok(Reply::Empty)
    }
}

impl Service for BrokenService {
    fn create_service(_: &ServiceLocator) -> Result<Self, ServiceError> {
        Err(ServiceError::runtime("database unreachable"))
    }

    fn methods(table: &mut MethodTable<Self>) {
        table.method("run", Self::run);
    }
}

/// Locator with `foo_service`, `broken_service` and a plain `greeting` component.
pub fn locator() -> ServiceLocator {
    let mut locator = ServiceLocator::new();
    locator
        .set("greeting", "hello".to_string())
        .register_service::<FooService>("foo_service")
        .register_service::<BrokenService>("broken_service");
    locator
}

pub fn dispatcher(routes: RouteTableBuilder, debug: bool) -> Dispatcher {
    Dispatcher::new(routes.build().unwrap(), Arc::new(locator()), debug)
}

pub fn request(method: Method, target: &str, client_ip: &str) -> ServiceRequest {
    let ip: IpAddr = client_ip.parse().unwrap();
    ServiceRequest::new(method, target).with_client_ip(ip)
}

pub fn get(target: &str) -> ServiceRequest {
    request(Method::GET, target, PUBLIC_IP)
}

/// Serve `app` on an ephemeral port.
pub async fn spawn_app(app: Application) -> (SocketAddr, Shutdown, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    let handle = tokio::spawn(async move {
        app.serve(listener, rx).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, shutdown, handle)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
