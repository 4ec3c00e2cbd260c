//! JSON-RPC 2.0 error responses.
//!
//! [`JsonRpcErrorCode`] covers the reserved protocol codes plus the
//! server-defined range used for HTTP-like failures. [`JsonRpcError`] is the
//! error a JSON-RPC endpoint raises; [`JsonRpcErrorFilter`] turns any
//! [`Thrown`] into the status and response body sent back to the caller.

use std::fmt;

use log::error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::{
    classify::classify,
    error::{INTERNAL_SERVER_ERROR, TransportError},
    thrown::{HttpException, NativeError, Thrown},
};

/// Protocol version carried by every message.
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum JsonRpcErrorCode {
    /// Invalid JSON was received.
    ParseError = -32700,
    /// The JSON is not a valid request object.
    InvalidRequest = -32600,
    /// The method does not exist.
    MethodNotFound = -32601,
    /// Invalid method parameters.
    InvalidParams = -32602,
    /// Internal JSON-RPC error.
    InternalError = -32603,
    /// HTTP 401.
    Unauthorized = -32001,
    /// HTTP 403.
    Forbidden = -32002,
    /// HTTP 404.
    NotFound = -32003,
    /// HTTP 429.
    TooManyRequests = -32004,
    /// HTTP 500 and other 5xx.
    ServerError = -32005,
    /// HTTP 502.
    BadGateway = -32006,
    /// HTTP 503.
    ServiceUnavailable = -32007,
    /// HTTP 504.
    GatewayTimeout = -32008,
}

impl JsonRpcErrorCode {
    const ALL: [Self; 13] = [
        Self::ParseError,
        Self::InvalidRequest,
        Self::MethodNotFound,
        Self::InvalidParams,
        Self::InternalError,
        Self::Unauthorized,
        Self::Forbidden,
        Self::NotFound,
        Self::TooManyRequests,
        Self::ServerError,
        Self::BadGateway,
        Self::ServiceUnavailable,
        Self::GatewayTimeout,
    ];

    /// Numeric wire code.
    #[must_use]
    pub const fn code(self) -> i32 { self as i32 }

    /// Look up a wire code.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.code() == code)
    }

    /// Constant-style name, e.g. `METHOD_NOT_FOUND`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParseError => "PARSE_ERROR",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::MethodNotFound => "METHOD_NOT_FOUND",
            Self::InvalidParams => "INVALID_PARAMS",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::ServerError => "SERVER_ERROR",
            Self::BadGateway => "BAD_GATEWAY",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::GatewayTimeout => "GATEWAY_TIMEOUT",
        }
    }

    /// Message used when none is supplied.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::TooManyRequests => "Too Many Requests",
            Self::ServerError => "Internal Server Error",
            Self::BadGateway => "Bad Gateway",
            Self::ServiceUnavailable => "Service Unavailable",
            Self::GatewayTimeout => "Gateway Timeout",
        }
    }

    /// Code for an HTTP status. Unlisted 5xx map to
    /// [`ServerError`](Self::ServerError), everything else to
    /// [`InternalError`](Self::InternalError).
    #[must_use]
    pub const fn from_http_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 => Self::TooManyRequests,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            500.. => Self::ServerError,
            _ => Self::InternalError,
        }
    }

    /// HTTP status a response with this code is sent with.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::ParseError | Self::InvalidRequest | Self::InvalidParams => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound | Self::MethodNotFound => 404,
            Self::TooManyRequests => 429,
            Self::BadGateway => 502,
            Self::ServiceUnavailable => 503,
            Self::GatewayTimeout => 504,
            Self::InternalError | Self::ServerError => INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.code()) }
}

impl Serialize for JsonRpcErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for JsonRpcErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i32::deserialize(deserializer)?;
        Self::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown JSON-RPC error code {code}")))
    }
}

/// The `error` member of a response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    /// Error code.
    pub code: JsonRpcErrorCode,
    /// Error message.
    pub message: String,
    /// Extra data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// An error response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Request id: a number, a string or null.
    pub id: Value,
    /// The error.
    pub error: JsonRpcErrorObject,
}

/// Error raised by JSON-RPC endpoints.
///
/// # Examples
///
/// ```
/// use errorframe::json_rpc::{JsonRpcError, JsonRpcErrorCode};
/// use serde_json::json;
///
/// let error = JsonRpcError::new(JsonRpcErrorCode::MethodNotFound);
/// assert_eq!(error.http_status(), 404);
/// assert_eq!(
///     error.body(),
///     json!({ "jsonrpc": "2.0", "error": { "code": -32601, "message": "Method not found" } })
/// );
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}")]
pub struct JsonRpcError {
    code: JsonRpcErrorCode,
    message: String,
    data: Option<Value>,
    http_status: u16,
}

impl JsonRpcError {
    /// Error with the code's default message and HTTP status.
    #[must_use]
    pub fn new(code: JsonRpcErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_owned(),
            data: None,
            http_status: code.http_status(),
        }
    }

    /// Replace the message. An empty message keeps the default.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if !message.is_empty() {
            self.message = message;
        }
        self
    }

    /// Attach extra data.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Override the HTTP status.
    #[must_use]
    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = status;
        self
    }

    /// Build from a transport error, mapping its status to a code.
    #[must_use]
    pub fn from_transport(error: &TransportError, request_id: Value) -> Self {
        Self::new(JsonRpcErrorCode::from_http_status(error.status_code()))
            .with_message(error.message())
            .with_data(json!({ "requestId": request_id }))
    }

    /// Build an internal error from a plain error.
    #[must_use]
    pub fn from_native(error: &NativeError, request_id: Value) -> Self {
        Self::new(JsonRpcErrorCode::InternalError)
            .with_message(error.message())
            .with_data(json!({ "requestId": request_id, "name": error.name() }))
    }

    /// Error code.
    #[must_use]
    pub fn code(&self) -> JsonRpcErrorCode { self.code }

    /// Error message.
    #[must_use]
    pub fn message(&self) -> &str { &self.message }

    /// Extra data.
    #[must_use]
    pub fn data(&self) -> Option<&Value> { self.data.as_ref() }

    /// HTTP status.
    #[must_use]
    pub fn http_status(&self) -> u16 { self.http_status }

    /// The `error` member of a response.
    #[must_use]
    pub fn error_object(&self) -> JsonRpcErrorObject {
        JsonRpcErrorObject {
            code: self.code,
            message: self.message.clone(),
            data: self.data.clone(),
        }
    }

    /// Body without an id: `{jsonrpc, error}`.
    #[must_use]
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("jsonrpc".into(), JSONRPC_VERSION.into());
        body.insert("error".into(), json!(self.error_object()));
        Value::Object(body)
    }

    /// Full response for the request `id`.
    #[must_use]
    pub fn response(&self, id: Value) -> JsonRpcErrorResponse {
        JsonRpcErrorResponse {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            error: self.error_object(),
        }
    }

    /// Recover an error raised earlier through `From<JsonRpcError> for
    /// Thrown`.
    #[must_use]
    pub fn from_http_exception(exception: &HttpException) -> Option<Self> {
        let response = exception.response();
        if response.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            return None;
        }
        let object: JsonRpcErrorObject = response
            .get("error")
            .and_then(|error| serde_json::from_value(error.clone()).ok())?;
        Some(Self {
            code: object.code,
            message: object.message,
            data: object.data,
            http_status: exception.status(),
        })
    }
}

impl From<JsonRpcError> for Thrown {
    fn from(error: JsonRpcError) -> Self {
        Thrown::Http(HttpException::new(error.http_status, error.body()))
    }
}

/// Renders failures of JSON-RPC endpoints.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRpcErrorFilter;

impl JsonRpcErrorFilter {
    /// Status and response body for `thrown` raised while serving the
    /// request `id`.
    ///
    /// A [`JsonRpcError`] is sent as raised. Other errors map their status,
    /// if any, to a code and report their type in `data.originalError`.
    /// Plain values become a bare internal error.
    #[must_use]
    pub fn render(&self, thrown: &Thrown, id: Value) -> (u16, JsonRpcErrorResponse) {
        let raised = match thrown {
            Thrown::Http(exception) => JsonRpcError::from_http_exception(exception),
            _ => None,
        };
        let (error, label) = if let Some(error) = raised {
            (error, "JSON-RPC error")
        } else if thrown.is_error() {
            (Self::from_error(thrown), "Error in JSON-RPC handler")
        } else {
            let code = JsonRpcErrorCode::InternalError;
            (
                JsonRpcError::new(code).with_data(json!({ "name": code.as_str() })),
                "Unknown error in JSON-RPC handler",
            )
        };
        let response = error.response(id);
        error!(
            "{label}: code={}, message={}, id={}, original={thrown}",
            error.code(),
            error.message(),
            response.id,
        );
        if let Some(stack) = thrown.stack() {
            error!("Stack trace: {stack}");
        }
        (error.http_status(), response)
    }

    fn from_error(thrown: &Thrown) -> JsonRpcError {
        let status = match thrown {
            Thrown::Broker(_) | Thrown::Native(_) | Thrown::Value(_) => None,
            _ => classify(thrown).status_code,
        };
        let code = status.map_or(JsonRpcErrorCode::InternalError, JsonRpcErrorCode::from_http_status);
        JsonRpcError::new(code)
            .with_message(thrown.to_string())
            .with_http_status(status.unwrap_or(INTERNAL_SERVER_ERROR))
            .with_data(json!({ "name": code.as_str(), "originalError": thrown.type_name() }))
    }
}

#[cfg(test)]
mod tests;
