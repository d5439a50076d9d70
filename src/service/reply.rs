//! Return values of service methods.

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::http::response::ServiceResponse;
use crate::service::ServiceError;

/// What a service method hands back to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// 200 with an empty body.
    Empty,
    /// Sent unchanged.
    Raw(ServiceResponse),
    /// Serialized with `application/json`.
    Json(Value),
    /// Sent as `text/plain`.
    Text(String),
}

impl Reply {
    /// Serialize any value into a JSON reply.
    #[track_caller]
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ServiceError> {
        serde_json::to_value(value)
            .map(Reply::Json)
            .map_err(|e| ServiceError::invalid_response_format(e.to_string()))
    }

    /// Normalize into a response.
    pub fn into_response(self) -> Result<ServiceResponse, ServiceError> {
        match self {
            Reply::Empty => Ok(ServiceResponse::empty()),
            Reply::Raw(response) => Ok(response),
            Reply::Json(value) => {
                let body = serde_json::to_vec(&value)
                    .map_err(|e| ServiceError::invalid_response_format(e.to_string()))?;
                Ok(ServiceResponse::json(StatusCode::OK, body))
            }
            Reply::Text(text) if text.is_empty() => Ok(ServiceResponse::empty()),
            Reply::Text(text) => Ok(ServiceResponse::text(StatusCode::OK, text)),
        }
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::Empty
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Reply::Empty,
            value => Reply::Json(value),
        }
    }
}

impl From<ServiceResponse> for Reply {
    fn from(response: ServiceResponse) -> Self {
        Reply::Raw(response)
    }
}
