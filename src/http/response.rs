//! Framework-neutral response produced by the dispatcher.
//!
//! # Responsibilities
//! - Carry status, headers and a buffered body
//! - Provide the text and JSON constructors used by normalization
//! - Convert into an axum response at the server edge

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ServiceResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// 200 with no body.
    pub fn empty() -> Self {
        Self::new(StatusCode::OK)
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))
            .with_body(body.into())
    }

    /// Serialized JSON document with `application/json`.
    pub fn json(status: StatusCode, body: Vec<u8>) -> Self {
        Self::new(status)
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
            .with_body(body)
    }

    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or_default()
    }
}

impl IntoResponse for ServiceResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_response() {
        let response = ServiceResponse::text(StatusCode::NOT_FOUND, "NOT FOUND");
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.content_type(), Some(TEXT_PLAIN));
        assert_eq!(response.body_str(), "NOT FOUND");
    }

    #[test]
    fn test_empty_response() {
        let response = ServiceResponse::empty();
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.is_empty());
        assert!(response.content_type().is_none());
    }

    #[test]
    fn test_into_axum_response() {
        let response = ServiceResponse::json(StatusCode::CREATED, b"[]".to_vec()).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], APPLICATION_JSON);
    }
}
