//! Queue/RPC error type and its wire form.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{INTERNAL_SERVER_ERROR, QueueErrorKind, detect_queue_error_kind};
use crate::{
    classify::{RPC_FALLBACK_MESSAGE, classify, error_status, first_truthy, stringify},
    thrown::Thrown,
};

/// Serialized form of a [`QueueError`] as it travels through the broker.
///
/// The kind is written as `kind`; payloads from older peers that name it
/// `errorType` are accepted when reading.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueErrorPayload {
    /// The error message.
    pub message: String,
    /// Failure kind.
    #[serde(alias = "errorType")]
    pub kind: QueueErrorKind,
    /// HTTP status.
    pub status_code: u16,
}

/// An error raised while consuming a queue message or serving an RPC call.
///
/// Whether the message is retried depends only on [`QueueErrorKind`]; see
/// [`QueueError::is_transient`].
///
/// # Examples
///
/// ```
/// use errorframe::{NativeError, QueueError, QueueErrorKind, Thrown};
///
/// let error = QueueError::from_thrown(Thrown::from(NativeError::new("upstream timed out")));
/// assert_eq!(error.kind(), QueueErrorKind::RpcTimeout);
/// assert!(error.is_transient());
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}")]
pub struct QueueError {
    message: String,
    kind: QueueErrorKind,
    status_code: u16,
    #[source]
    cause: Option<Box<Thrown>>,
}

impl QueueError {
    /// Name reported in logs.
    pub const NAME: &'static str = "QueueError";

    /// Create an error with an explicit kind and status.
    #[must_use]
    pub fn new(message: impl Into<String>, kind: QueueErrorKind, status_code: u16) -> Self {
        Self {
            message: message.into(),
            kind,
            status_code,
            cause: None,
        }
    }

    /// Create an error whose status follows from its kind.
    #[must_use]
    pub fn from_kind(message: impl Into<String>, kind: QueueErrorKind) -> Self {
        Self::new(message, kind, kind.default_status())
    }

    /// Record the value this error was built from.
    #[must_use]
    pub fn with_cause(mut self, cause: Thrown) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str { &self.message }

    /// Failure kind.
    #[must_use]
    pub fn kind(&self) -> QueueErrorKind { self.kind }

    /// HTTP status.
    #[must_use]
    pub fn status_code(&self) -> u16 { self.status_code }

    /// The value this error was built from, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Thrown> { self.cause.as_deref() }

    /// Returns true if redelivering the message may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool { self.kind.is_transient() }

    /// Wire form of the error.
    #[must_use]
    pub fn payload(&self) -> QueueErrorPayload {
        QueueErrorPayload {
            message: self.message.clone(),
            kind: self.kind,
            status_code: self.status_code,
        }
    }

    /// Normalize any thrown value into a [`QueueError`].
    ///
    /// Queue errors pass through unchanged. Payloads that carry a structured
    /// kind keep it, along with their status when it is `>= 400`. Otherwise
    /// the kind is inferred from the message text with
    /// [`detect_queue_error_kind`], and unrecognised messages become
    /// [`QueueErrorKind::ServiceUnavailable`].
    #[must_use]
    pub fn from_thrown(thrown: Thrown) -> Self {
        if let Thrown::Queue(error) = thrown {
            return error;
        }
        if let Some(error) = structured(&thrown) {
            return error.with_cause(thrown);
        }
        let message = extract_message(&thrown);
        let kind = detect_queue_error_kind(&message);
        Self::from_kind(message, kind).with_cause(thrown)
    }
}

impl Default for QueueError {
    fn default() -> Self {
        Self::new(
            RPC_FALLBACK_MESSAGE,
            QueueErrorKind::default(),
            INTERNAL_SERVER_ERROR,
        )
    }
}

impl From<QueueErrorPayload> for QueueError {
    fn from(payload: QueueErrorPayload) -> Self {
        Self::new(payload.message, payload.kind, payload.status_code)
    }
}

/// Rebuild an error from a payload that names its kind, either directly or
/// inside its `message` field.
fn structured(thrown: &Thrown) -> Option<QueueError> {
    let value = match thrown {
        Thrown::Broker(exception) => exception.payload(),
        Thrown::Value(value) => value,
        _ => return None,
    };
    let (object, kind) = [Some(value), value.get("message")]
        .into_iter()
        .flatten()
        .find_map(|candidate| {
            let object = candidate.as_object()?;
            let kind = object
                .get("kind")
                .or_else(|| object.get("errorType"))?
                .as_str()?
                .parse::<QueueErrorKind>()
                .ok()?;
            Some((object, kind))
        })?;
    let message = first_truthy([object.get("message")])
        .map_or_else(|| RPC_FALLBACK_MESSAGE.to_owned(), stringify);
    let status = error_status(object.get("statusCode")).unwrap_or(kind.default_status());
    Some(QueueError::new(message, kind, status))
}

fn extract_message(thrown: &Thrown) -> String {
    match thrown {
        Thrown::Broker(exception) => match exception.payload() {
            Value::String(text) => text.clone(),
            payload => {
                first_truthy([payload.get("message")]).map_or_else(|| stringify(payload), stringify)
            }
        },
        Thrown::Value(value) => message_in(value),
        other => classify(other).message,
    }
}

fn message_in(value: &Value) -> String {
    let Some(object) = value.as_object() else {
        return stringify(value);
    };
    match (object.get("message"), object.get("error")) {
        (Some(Value::String(text)), _) => text.clone(),
        (_, Some(nested)) => message_in(nested),
        _ => stringify(value),
    }
}
