//! Normalization of arbitrary thrown values into a message and status.
//!
//! [`classify`] inspects a [`Thrown`] and reports which wire shape it
//! matched alongside the extracted `message` and, when one could be
//! trusted, the `status_code`. The branches, in priority order:
//!
//! 1. The crate's own error types are read directly.
//! 2. Broker exceptions yield the message and status of their payload.
//! 3. Deserialized queue errors (`{message, kind, statusCode}`) yield their message, or `"RPC
//!    error occurred"` when it is missing, and their status when it is `>= 400`, else 500.
//! 4. The alternate `{status: "error", message, data?}` shape prefers `data.message` and reads
//!    `data.statusCode` under the same rule.
//! 5. HTTP exceptions use their response body; array messages are joined with `"; "`.
//! 6. Native errors use their message verbatim.
//! 7. Anything else uses a nested `error.message`, a top-level `message`, or the value's text, plus
//!    a nested or top-level `statusCode` when it is `>= 400`.
//!
//! Classification never fails.

mod extract;

use serde_json::{Map, Value};

pub use extract::{extract_code, normalize_message, stringify};
pub(crate) use extract::{alt_wire_error, error_status, first_truthy, wire_queue_error};

use crate::{
    error::INTERNAL_SERVER_ERROR,
    thrown::{HttpException, Thrown},
};

/// Message used when a wire-form error arrives without one.
pub const RPC_FALLBACK_MESSAGE: &str = "RPC error occurred";

/// The branch of the classifier that recognised a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireShape {
    /// One of the crate's own error types.
    Typed,
    /// A broker exception with an accessor payload.
    Broker,
    /// The deserialized wire form of a queue error.
    WireQueueError,
    /// The `{status: "error", message, data?}` wire form.
    AltWireError,
    /// A structured HTTP exception.
    HttpException,
    /// A plain error.
    Native,
    /// Plain data with no recognised error shape.
    Opaque,
}

impl WireShape {
    /// Returns the shape name as a static string for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Typed => "typed",
            Self::Broker => "broker",
            Self::WireQueueError => "wire_queue_error",
            Self::AltWireError => "alt_wire_error",
            Self::HttpException => "http_exception",
            Self::Native => "native",
            Self::Opaque => "opaque",
        }
    }
}

/// Result of [`classify`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classified {
    /// Client-facing message.
    pub message: String,
    /// Status recovered from the value, if it could be trusted.
    pub status_code: Option<u16>,
    /// Which branch matched.
    pub shape: WireShape,
}

impl Classified {
    fn new(message: impl Into<String>, status_code: Option<u16>, shape: WireShape) -> Self {
        Self {
            message: message.into(),
            status_code,
            shape,
        }
    }

    /// Prepend `"<prefix>: "` to the message when a prefix is supplied.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Option<&str>) -> Self {
        if let Some(prefix) = prefix {
            self.message = format!("{prefix}: {}", self.message);
        }
        self
    }

    /// The recovered status, or 500 when none was found.
    #[must_use]
    pub fn status_or_default(&self) -> u16 { self.status_code.unwrap_or(INTERNAL_SERVER_ERROR) }
}

/// Extract a message and status from any thrown value.
///
/// # Examples
///
/// ```
/// use errorframe::{Thrown, classify::classify};
/// use serde_json::json;
///
/// let wire = Thrown::from(json!({
///     "message": "user not found",
///     "kind": "NOT_FOUND",
///     "statusCode": 404
/// }));
/// let classified = classify(&wire);
/// assert_eq!(classified.message, "user not found");
/// assert_eq!(classified.status_code, Some(404));
/// ```
#[must_use]
pub fn classify(thrown: &Thrown) -> Classified {
    match thrown {
        Thrown::Transport(error) => {
            Classified::new(error.message(), Some(error.status_code()), WireShape::Typed)
        }
        Thrown::Queue(error) => {
            Classified::new(error.message(), Some(error.status_code()), WireShape::Typed)
        }
        Thrown::Socket(error) => {
            Classified::new(error.message(), Some(error.status_code()), WireShape::Typed)
        }
        Thrown::Broker(exception) => broker(exception.payload()),
        Thrown::Http(exception) => http_exception(exception),
        Thrown::Native(native) => Classified::new(native.message(), None, WireShape::Native),
        Thrown::Value(value) => plain(value),
    }
}

fn broker(payload: &Value) -> Classified {
    let (message, status) = match payload {
        Value::Object(map) => (
            first_truthy([map.get("message")]).map_or_else(|| stringify(payload), stringify),
            error_status(map.get("statusCode")),
        ),
        other => (stringify(other), None),
    };
    Classified::new(message, status, WireShape::Broker)
}

fn plain(value: &Value) -> Classified {
    let wire = wire_queue_error(value).or_else(|| value.get("message").and_then(wire_queue_error));
    if let Some(object) = wire {
        return wire_form(object);
    }
    if let Some(object) = alt_wire_error(value) {
        return alt_wire(object);
    }
    opaque(value)
}

fn wire_form(object: &Map<String, Value>) -> Classified {
    let message = first_truthy([object.get("message")])
        .map_or_else(|| RPC_FALLBACK_MESSAGE.to_owned(), stringify);
    let status = error_status(object.get("statusCode")).unwrap_or(INTERNAL_SERVER_ERROR);
    Classified::new(message, Some(status), WireShape::WireQueueError)
}

fn alt_wire(object: &Map<String, Value>) -> Classified {
    let data = object.get("data");
    let message = first_truthy([data.and_then(|d| d.get("message")), object.get("message")])
        .map_or_else(|| RPC_FALLBACK_MESSAGE.to_owned(), stringify);
    let status =
        error_status(data.and_then(|d| d.get("statusCode"))).unwrap_or(INTERNAL_SERVER_ERROR);
    Classified::new(message, Some(status), WireShape::AltWireError)
}

fn http_exception(exception: &HttpException) -> Classified {
    let response = exception.response();
    let body = response
        .as_object()
        .and_then(|map| map.get("message"))
        .filter(|message| !message.is_null())
        .unwrap_or(response);
    let message = match body {
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join("; "),
        other => stringify(other),
    };
    Classified::new(message, Some(exception.status()), WireShape::HttpException)
}

fn opaque(value: &Value) -> Classified {
    let Some(object) = value.as_object() else {
        return Classified::new(stringify(value), None, WireShape::Opaque);
    };
    let nested = object.get("error");
    let nested_object = nested.filter(|error| error.is_object());
    let from_error = match nested_object {
        Some(error) => error.get("message"),
        None => nested,
    };
    let message =
        first_truthy([from_error, object.get("message")]).map_or_else(|| stringify(value), stringify);
    let status = match nested_object {
        Some(error) => error.get("statusCode"),
        None => object.get("statusCode"),
    };
    Classified::new(message, error_status(status), WireShape::Opaque)
}

#[cfg(test)]
mod tests;
