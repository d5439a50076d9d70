//! Dispatcher scenarios: matching, access control, service failures.

use axum::http::{header, HeaderValue, Method, StatusCode};
use serde_json::Value;

use boot::http::dispatcher::{LOGIC_ERROR_BODY, UNKNOWN_ERROR_BODY};
use boot::service::{ServiceLocator, ServiceValidator};
use boot::{AccessPolicy, RouteCondition, RouteOptions, RouteTableBuilder, ServiceError};

mod common;
use common::{dispatcher, get, request, PRIVATE_IP, PUBLIC_IP, RUNTIME_ERROR};

fn routes() -> RouteTableBuilder {
    RouteTableBuilder::new()
        .get(
            "employees/{countryCode}",
            "foo_service",
            "bar",
            RouteOptions::new("employees")
                .default("countryCode", "NL")
                .requirement("countryCode", "US|EN|FR|NL"),
        )
        .get(
            "private",
            "foo_service",
            "greet",
            RouteOptions::new("private").access_policy(AccessPolicy::for_private_service()),
        )
        .get(
            "whitelisted",
            "foo_service",
            "greet",
            RouteOptions::new("whitelisted")
                .access_policy(AccessPolicy::for_private_service().allow_ip(PUBLIC_IP)),
        )
        .get("fail", "foo_service", "fail", RouteOptions::new("fail"))
        .get("explode", "foo_service", "explode", RouteOptions::new("explode"))
        .get("invalid", "foo_service", "invalid", RouteOptions::new("invalid"))
        .get("empty", "foo_service", "empty", RouteOptions::new("empty"))
        .get("guarded", "foo_service", "guarded", RouteOptions::new("guarded"))
        .get("missing-service", "missing_service", "run", RouteOptions::new("missing_service"))
        .get("missing-method", "foo_service", "nope", RouteOptions::new("missing_method"))
        .get("not-a-service", "greeting", "run", RouteOptions::new("not_a_service"))
        .get("broken", "broken_service", "run", RouteOptions::new("broken"))
        .post("items", "foo_service", "empty", RouteOptions::new("items_create"))
}

#[test]
fn test_employees_json() {
    let dispatcher = dispatcher(routes(), false);
    let response = dispatcher.handle(&get("/employees/NL"));

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("application/json"));
    let body: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body, serde_json::json!([{"id": 1, "name": "Foo"}]));

    // Optional placeholder falls back to its default.
    assert_eq!(dispatcher.handle(&get("/employees")).status, StatusCode::OK);
    // Requirement not met.
    assert_eq!(dispatcher.handle(&get("/employees/DE")).status, StatusCode::NOT_FOUND);
}

#[test]
fn test_not_found() {
    let response = dispatcher(routes(), false).handle(&get("/unregistered"));
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.is_empty());

    let response = dispatcher(routes(), true).handle(&get("/unregistered"));
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body_str(), "NOT FOUND");
}

#[test]
fn test_method_not_allowed() {
    let response = dispatcher(routes(), false).handle(&get("/items"));
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers[header::ALLOW], "POST");
    assert!(response.body.is_empty());

    let response = dispatcher(routes(), true).handle(&get("/items"));
    assert_eq!(response.body_str(), "METHOD NOT ALLOWED");
}

#[test]
fn test_private_service_rejects_public_client() {
    let response = dispatcher(routes(), false).handle(&get("/private"));
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.body.is_empty());

    let response = dispatcher(routes(), true).handle(&get("/private"));
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body_str(), "CLIENT REJECTED");

    let response =
        dispatcher(routes(), false).handle(&request(Method::GET, "/private", PRIVATE_IP));
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body_str(), "hello");
}

#[test]
fn test_whitelisted_public_client_is_served() {
    let response = dispatcher(routes(), false).handle(&get("/whitelisted"));
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body_str(), "hello");
}

#[test]
fn test_host_blacklist_revokes_grant() {
    let routes = RouteTableBuilder::new().get(
        "open",
        "foo_service",
        "greet",
        RouteOptions::new("open")
            .access_policy(AccessPolicy::for_public_service().deny_host("example.com")),
    );
    let dispatcher = dispatcher(routes, false);

    let response = dispatcher.handle(&get("/open").with_host("api.example.com"));
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = dispatcher.handle(&get("/open").with_host("evilexample.com"));
    assert_eq!(response.status, StatusCode::OK);
}

#[test]
fn test_runtime_error() {
    let response = dispatcher(routes(), false).handle(&get("/fail"));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body_str(), UNKNOWN_ERROR_BODY);
    assert_eq!(response.content_type(), Some("text/plain; charset=utf-8"));

    let response = dispatcher(routes(), true).handle(&get("/fail"));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.body_str();
    assert!(body.starts_with(&format!("Error: {RUNTIME_ERROR} on line ")), "{body}");
    assert!(body.contains(" in file "), "{body}");
    assert!(body.contains("common"), "{body}");
    assert!(body.ends_with('.'), "{body}");
}

#[test]
fn test_panic_is_unknown_error() {
    let response = dispatcher(routes(), false).handle(&get("/explode"));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body_str(), UNKNOWN_ERROR_BODY);

    let response = dispatcher(routes(), true).handle(&get("/explode"));
    assert!(response.body_str().starts_with("Error: handler exploded on line "));
}

#[test]
fn test_invalid_response_format_is_unknown_error() {
    let response = dispatcher(routes(), false).handle(&get("/invalid"));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body_str(), UNKNOWN_ERROR_BODY);
}

#[test]
fn test_empty_reply() {
    let response = dispatcher(routes(), false).handle(&get("/empty"));
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());
}

#[test]
fn test_service_class_not_found() {
    let response = dispatcher(routes(), false).handle(&get("/missing-service"));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body_str(), "The service 'missing_service' does not exist.");

    let response = dispatcher(routes(), true).handle(&get("/missing-service"));
    assert!(response
        .body_str()
        .starts_with("Error: The service 'missing_service' does not exist. on line "));
}

#[test]
fn test_service_method_not_found() {
    for debug in [false, true] {
        let response = dispatcher(routes(), debug).handle(&get("/missing-method"));
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body_str(), "The nope method does not exist.");
    }
}

#[test]
fn test_service_logic_error() {
    let response = dispatcher(routes(), false).handle(&get("/not-a-service"));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body_str(), LOGIC_ERROR_BODY);

    let response = dispatcher(routes(), true).handle(&get("/not-a-service"));
    assert!(response.body_str().starts_with("Error: "));
}

#[test]
fn test_factory_failure_is_unknown_error() {
    let response = dispatcher(routes(), false).handle(&get("/broken"));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body_str(), UNKNOWN_ERROR_BODY);
}

#[test]
fn test_pre_invoke_can_abort() {
    let dispatcher = dispatcher(routes(), false);
    assert_eq!(dispatcher.handle(&get("/guarded")).status, StatusCode::OK);

    let denied = get("/guarded").with_header(
        header::HeaderName::from_static("x-deny"),
        HeaderValue::from_static("1"),
    );
    let response = dispatcher.handle(&denied);
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body_str(), UNKNOWN_ERROR_BODY);
}

#[test]
fn test_head_is_served_by_get_routes() {
    let response =
        dispatcher(routes(), false).handle(&request(Method::HEAD, "/employees", PUBLIC_IP));
    assert_eq!(response.status, StatusCode::OK);
}

#[test]
fn test_round_trip_every_route() {
    const N: usize = 12;
    let mut routes = RouteTableBuilder::new();
    for k in 0..N {
        routes = routes.get(
            &format!("r{k}/{{id}}"),
            "foo_service",
            "echo",
            RouteOptions::new(format!("route_{k}")),
        );
    }
    let dispatcher = dispatcher(routes, false);

    for k in 0..N {
        let response = dispatcher.handle(&get(&format!("/r{k}/item{k}")));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body_str(), format!("route_{k}|echo|id=item{k}"));
    }
}

#[test]
fn test_route_condition_on_user_agent() {
    let routes = RouteTableBuilder::new().get(
        "some-route",
        "foo_service",
        "greet",
        RouteOptions::new("some_route_name")
            .condition(RouteCondition::header("User-Agent", "(?i)firefox")),
    );
    let dispatcher = dispatcher(routes, false);

    let firefox = get("/some-route").with_header(
        header::USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; rv:128.0) Gecko/20100101 Firefox/128.0",
        ),
    );
    let response = dispatcher.handle(&firefox);
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body_str(), "hello");

    let curl = get("/some-route").with_header(
        header::USER_AGENT,
        HeaderValue::from_static("I don't need a browser. I prefer curl. Grab and grep baby!"),
    );
    let response = dispatcher.handle(&curl);
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.is_empty());
}

#[test]
fn test_encoded_path_reaches_service_decoded() {
    let routes = routes().get("echo/{name}", "foo_service", "echo", RouteOptions::new("echo"));
    let dispatcher = dispatcher(routes, false);

    let response = dispatcher.handle(&get("/employees/%4EL"));
    assert_eq!(response.status, StatusCode::OK);

    let response = dispatcher.handle(&get("/echo/foo%20bar"));
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body_str(), "echo|echo|name=foo bar");
}

#[test]
fn test_identical_requests_identical_responses() {
    let dispatcher = dispatcher(routes(), false);
    let first = dispatcher.handle(&get("/employees/FR"));
    let second = dispatcher.handle(&get("/employees/FR"));
    assert_eq!(first, second);
}

struct DenyEverything;

impl ServiceValidator for DenyEverything {
    fn validate(
        &self,
        service_id: &str,
        method: &str,
        _: &ServiceLocator,
    ) -> Result<(), ServiceError> {
        Err(ServiceError::logic(service_id, method, "maintenance"))
    }
}

#[test]
fn test_validator_is_replaceable() {
    let dispatcher = dispatcher(routes(), false).with_validator(DenyEverything);
    let response = dispatcher.handle(&get("/employees"));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body_str(), LOGIC_ERROR_BODY);
}
