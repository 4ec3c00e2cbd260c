//! Field extraction helpers for loosely-shaped error payloads.

use serde_json::{Map, Value};

use crate::{error::MIN_ERROR_STATUS, thrown::Thrown};

/// Render any JSON value as log-safe text.
///
/// Strings are returned verbatim, `null` becomes `"null"`, numbers and
/// booleans use their usual form, and objects and arrays are rendered as
/// compact JSON.
///
/// ```
/// use errorframe::classify::stringify;
/// use serde_json::json;
///
/// assert_eq!(stringify(&json!("boom")), "boom");
/// assert_eq!(stringify(&json!(null)), "null");
/// assert_eq!(stringify(&json!({ "a": 1 })), r#"{"a":1}"#);
/// ```
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Normalize a message field that may be a string, an array of messages, or
/// a nested object.
///
/// Arrays are normalized element-wise and joined with `"; "`, skipping
/// empty entries. Objects yield their inner `message` (one level of nesting
/// is followed) or their JSON text.
///
/// ```
/// use errorframe::classify::normalize_message;
/// use serde_json::json;
///
/// assert_eq!(
///     normalize_message(&json!(["a is empty", null, "b is empty"])).as_deref(),
///     Some("a is empty; b is empty")
/// );
/// assert_eq!(normalize_message(&json!(null)), None);
/// ```
#[must_use]
pub fn normalize_message(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(normalize_message)
                .filter(|item| !item.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Value::Object(map) => match map.get("message") {
            Some(Value::String(inner)) => Some(inner.clone()),
            Some(Value::Object(inner)) => match inner.get("message") {
                Some(Value::String(text)) => Some(text.clone()),
                _ => Some(stringify(value)),
            },
            _ => Some(stringify(value)),
        },
        other => Some(stringify(other)),
    }
}

/// Find a transport-level error code such as `ECONNREFUSED` or
/// `USER_NOT_FOUND` on a thrown value.
///
/// Looked up, in order: `data.code`, `response.data.code`, `response.code`,
/// a top-level `code`, then `message.code`. Only string codes count.
#[must_use]
pub fn extract_code(thrown: &Thrown) -> Option<String> {
    let found = match thrown {
        Thrown::Native(native) => native.code(),
        Thrown::Http(exception) => code_in(None, Some(exception.response())),
        Thrown::Broker(exception) => code_in(None, Some(exception.payload())),
        Thrown::Value(Value::Object(map)) => code_in(Some(map), map.get("response")),
        _ => None,
    };
    found.map(str::to_owned)
}

fn code_in<'a>(
    object: Option<&'a Map<String, Value>>,
    response: Option<&'a Value>,
) -> Option<&'a str> {
    let candidates = [
        field(object, "data").and_then(|data| data.get("code")),
        response.and_then(|body| body.pointer("/data/code")),
        response.and_then(|body| body.get("code")),
        field(object, "code"),
        field(object, "message").and_then(|message| message.get("code")),
    ];
    candidates.into_iter().flatten().find_map(Value::as_str)
}

fn field<'a>(object: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a Value> {
    object.and_then(|map| map.get(key))
}

/// JavaScript-style truthiness, used where wire payloads rely on `a || b`
/// fallbacks.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The first truthy value among `candidates`.
pub(crate) fn first_truthy<'a>(
    candidates: impl IntoIterator<Item = Option<&'a Value>>,
) -> Option<&'a Value> {
    candidates.into_iter().flatten().find(|value| truthy(value))
}

/// Accept a status only when it is a number no smaller than 400.
///
/// Peers that encode every number as a float send `404.0`; whole floats are
/// accepted, fractional ones are not.
pub(crate) fn error_status(value: Option<&Value>) -> Option<u16> {
    value
        .and_then(|status| status.as_u64().or_else(|| whole_float(status)))
        .and_then(|status| u16::try_from(status).ok())
        .filter(|status| *status >= MIN_ERROR_STATUS)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the value is whole and within the u16 range"
)]
fn whole_float(value: &Value) -> Option<u64> {
    value
        .as_f64()
        .filter(|n| n.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(n))
        .map(|n| n as u64)
}

/// Returns the object if it looks like a deserialized queue error: it has
/// `message`, `statusCode` and a kind field together.
///
/// The kind travels as `kind`; older peers send it as `errorType`.
pub(crate) fn wire_queue_error(value: &Value) -> Option<&Map<String, Value>> {
    let object = value.as_object()?;
    let has_kind = object.contains_key("kind") || object.contains_key("errorType");
    (has_kind && object.contains_key("statusCode") && object.contains_key("message"))
        .then_some(object)
}

/// Returns the object if it matches the `{status: "error", message, data?}`
/// convention used by some RPC clients.
pub(crate) fn alt_wire_error(value: &Value) -> Option<&Map<String, Value>> {
    let object = value.as_object()?;
    (object.get("status").and_then(Value::as_str) == Some("error") && object.contains_key("message"))
        .then_some(object)
}
