//! The standard success envelope.
//!
//! Successful handler results are wrapped as
//! `{success: true, data, meta: {timestamp, path, requestId}}`. Wrapping is
//! idempotent: a value that already has both `success` and `data` passes
//! through unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::num::NonZeroU8;

use time::{
    OffsetDateTime,
    format_description::well_known::{
        Iso8601,
        iso8601::{Config, EncodedConfig, TimePrecision},
    },
};

use crate::request::RequestParts;

/// Metadata attached to every enveloped response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    /// RFC 3339 time the response was produced.
    pub timestamp: String,
    /// Request URL, or path when the URL is unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Request identifier, when one is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ResponseMeta {
    /// Metadata for a response to `request`, stamped now.
    #[must_use]
    pub fn for_request(request: &RequestParts) -> Self {
        Self {
            timestamp: timestamp(),
            path: Some(request.url_or_path().to_owned()),
            request_id: request.request_id().map(str::to_owned),
        }
    }
}

/// A successful response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardResponse<T> {
    /// Always true for enveloped results.
    pub success: bool,
    /// The handler result.
    pub data: T,
    /// Response metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

impl<T> StandardResponse<T> {
    /// Envelope `data` as a response to `request`.
    #[must_use]
    pub fn new(data: T, request: &RequestParts) -> Self {
        Self {
            success: true,
            data,
            meta: Some(ResponseMeta::for_request(request)),
        }
    }
}

/// Returns true if `value` already has the envelope's `success` and `data`
/// keys.
#[must_use]
pub fn is_enveloped(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.contains_key("success") && object.contains_key("data"))
}

/// Wrap a handler result in the standard envelope.
///
/// # Examples
///
/// ```
/// use errorframe::{request::RequestParts, response::wrap};
/// use serde_json::json;
///
/// let request = RequestParts::new("GET", "/users").with_header("x-request-id", "req-1");
/// let wrapped = wrap(json!([1, 2]), &request);
/// assert_eq!(wrapped["success"], json!(true));
/// assert_eq!(wrapped["data"], json!([1, 2]));
/// assert_eq!(wrapped["meta"]["requestId"], json!("req-1"));
/// assert_eq!(wrap(wrapped.clone(), &request), wrapped);
/// ```
#[must_use]
pub fn wrap(result: Value, request: &RequestParts) -> Value {
    if is_enveloped(&result) {
        return result;
    }
    let meta = ResponseMeta::for_request(request);
    let mut meta_fields = Map::new();
    meta_fields.insert("timestamp".to_owned(), Value::String(meta.timestamp));
    if let Some(path) = meta.path {
        meta_fields.insert("path".to_owned(), Value::String(path));
    }
    if let Some(request_id) = meta.request_id {
        meta_fields.insert("requestId".to_owned(), Value::String(request_id));
    }

    let mut envelope = Map::new();
    envelope.insert("success".to_owned(), Value::Bool(true));
    envelope.insert("data".to_owned(), result);
    envelope.insert("meta".to_owned(), Value::Object(meta_fields));
    Value::Object(envelope)
}

const MILLIS: EncodedConfig = Config::DEFAULT
    .set_time_precision(TimePrecision::Second {
        decimal_digits: NonZeroU8::new(3),
    })
    .encode();

/// The current UTC time in RFC 3339 form with millisecond precision.
#[must_use]
pub fn timestamp() -> String { format_timestamp(OffsetDateTime::now_utc()) }

/// Format `at` as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// ```
/// use errorframe::response::format_timestamp;
/// use time::{Duration, OffsetDateTime};
///
/// let at = OffsetDateTime::UNIX_EPOCH + Duration::milliseconds(1_250);
/// assert_eq!(format_timestamp(at), "1970-01-01T00:00:01.250Z");
/// ```
#[must_use]
pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.to_offset(time::UtcOffset::UTC)
        .format(&Iso8601::<MILLIS>)
        .unwrap_or_default()
}
