//! Values that reach the exception filters.
//!
//! A failing handler may produce one of the crate's own error types, a
//! structured HTTP exception, a broker exception wrapping a serialized
//! payload, a plain error, or raw JSON that came back over the wire.
//! [`Thrown`] captures each of these shapes as a variant so classification is
//! a single `match` rather than a chain of runtime type checks.

use std::{error::Error as StdError, fmt};

use serde_json::Value;

use crate::{
    classify::{classify, stringify},
    error::{QueueError, SocketError, TransportError},
    panic::PanicMessage,
};

/// A structured HTTP-style exception: a status code plus a JSON response
/// body.
///
/// # Examples
///
/// ```
/// use errorframe::HttpException;
/// use serde_json::json;
///
/// let exc = HttpException::new(400, json!({ "message": ["a is empty", "b is empty"] }));
/// assert_eq!(exc.status(), 400);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HttpException {
    status: u16,
    response: Value,
}

impl HttpException {
    /// Create an exception with the given status and response body.
    #[must_use]
    pub fn new(status: u16, response: impl Into<Value>) -> Self {
        Self {
            status,
            response: response.into(),
        }
    }

    /// HTTP status carried by the exception.
    #[must_use]
    pub fn status(&self) -> u16 { self.status }

    /// Response body carried by the exception.
    #[must_use]
    pub fn response(&self) -> &Value { &self.response }
}

/// An exception raised through the message broker.
///
/// The payload is whatever the remote side returned from its error accessor:
/// either a bare string or an object such as `{message, kind, statusCode}`.
#[derive(Clone, Debug, PartialEq)]
pub struct BrokerException {
    payload: Value,
}

impl BrokerException {
    /// Wrap a broker error payload.
    #[must_use]
    pub fn new(payload: impl Into<Value>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// The payload returned by the broker error accessor.
    #[must_use]
    pub fn payload(&self) -> &Value { &self.payload }
}

/// A plain error with no transport metadata attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeError {
    name: String,
    message: String,
    stack: Option<String>,
    code: Option<String>,
}

impl NativeError {
    /// Name used when none is supplied.
    pub const DEFAULT_NAME: &'static str = "Error";

    /// Create an error named [`NativeError::DEFAULT_NAME`].
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self { Self::named(Self::DEFAULT_NAME, message) }

    /// Create an error with an explicit type name, e.g. `TypeError`.
    #[must_use]
    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
            code: None,
        }
    }

    /// Capture any standard error. The source chain becomes the stack text.
    #[must_use]
    pub fn from_error(error: &(dyn StdError + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(inner) = source {
            chain.push(format!("caused by: {inner}"));
            source = inner.source();
        }
        let native = Self::new(error.to_string());
        if chain.is_empty() {
            native
        } else {
            native.with_stack(chain.join("\n"))
        }
    }

    /// Attach a stack trace.
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Attach a transport-level error code such as `ECONNREFUSED`.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Type name of the error.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Error message, used verbatim by the classifier.
    #[must_use]
    pub fn message(&self) -> &str { &self.message }

    /// Stack trace, if one was captured.
    #[must_use]
    pub fn stack(&self) -> Option<&str> { self.stack.as_deref() }

    /// Transport-level error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> { self.code.as_deref() }
}

/// Any value a handler can fail with.
#[derive(Clone, Debug, PartialEq)]
pub enum Thrown {
    /// An HTTP-facing error produced by this crate.
    Transport(TransportError),
    /// A queue/RPC error produced by this crate.
    Queue(QueueError),
    /// A WebSocket error produced by this crate.
    Socket(SocketError),
    /// An exception raised through the broker with a serialized payload.
    Broker(BrokerException),
    /// A structured HTTP exception.
    Http(HttpException),
    /// A plain error.
    Native(NativeError),
    /// Plain data: an object, array, primitive or null, usually the
    /// deserialized form of something sent over the wire.
    Value(Value),
}

impl Thrown {
    /// Type name used in log lines and error codes.
    ///
    /// Plain values report their JSON type (`object`, `string`, ...).
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Transport(_) => TransportError::NAME,
            Self::Queue(_) => QueueError::NAME,
            Self::Socket(_) => SocketError::NAME,
            Self::Broker(_) => "BrokerException",
            Self::Http(_) => "HttpException",
            Self::Native(native) => native.name(),
            Self::Value(value) => match value {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                Value::String(_) => "string",
                Value::Array(_) | Value::Object(_) => "object",
            },
        }
    }

    /// Stack trace carried by a native error.
    #[must_use]
    pub fn stack(&self) -> Option<&str> {
        match self {
            Self::Native(native) => native.stack(),
            _ => None,
        }
    }

    /// Returns true when the value is an error object rather than plain data.
    #[must_use]
    pub fn is_error(&self) -> bool { !matches!(self, Self::Value(_)) }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(error) => fmt::Display::fmt(error, f),
            Self::Queue(error) => fmt::Display::fmt(error, f),
            Self::Socket(error) => fmt::Display::fmt(error, f),
            Self::Native(native) => f.write_str(native.message()),
            Self::Value(value) => f.write_str(&stringify(value)),
            Self::Broker(_) | Self::Http(_) => f.write_str(&classify(self).message),
        }
    }
}

impl StdError for Thrown {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Transport(error) => error.source(),
            Self::Queue(error) => error.source(),
            Self::Socket(error) => error.source(),
            _ => None,
        }
    }
}

impl From<TransportError> for Thrown {
    fn from(error: TransportError) -> Self { Self::Transport(error) }
}

impl From<QueueError> for Thrown {
    fn from(error: QueueError) -> Self { Self::Queue(error) }
}

impl From<SocketError> for Thrown {
    fn from(error: SocketError) -> Self { Self::Socket(error) }
}

impl From<BrokerException> for Thrown {
    fn from(exception: BrokerException) -> Self { Self::Broker(exception) }
}

impl From<HttpException> for Thrown {
    fn from(exception: HttpException) -> Self { Self::Http(exception) }
}

impl From<NativeError> for Thrown {
    fn from(error: NativeError) -> Self { Self::Native(error) }
}

impl From<Value> for Thrown {
    fn from(value: Value) -> Self { Self::Value(value) }
}

impl From<PanicMessage> for Thrown {
    fn from(panic: PanicMessage) -> Self {
        Self::Native(NativeError::named(PanicMessage::NAME, panic.to_string()))
    }
}

impl From<std::io::Error> for Thrown {
    fn from(error: std::io::Error) -> Self {
        let code = format!("{:?}", error.kind());
        Self::Native(NativeError::from_error(&error).with_code(code))
    }
}
