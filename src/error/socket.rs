//! WebSocket error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::INTERNAL_SERVER_ERROR;
use crate::thrown::Thrown;

/// Fixed payload shape of a [`SocketError`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketErrorBody {
    /// Always [`SocketError::BODY_ERROR`].
    pub error: String,
    /// The error message.
    pub message: String,
}

/// An error raised while serving a WebSocket client. The status is always
/// 500.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}")]
pub struct SocketError {
    message: String,
    #[source]
    cause: Option<Box<Thrown>>,
}

impl SocketError {
    /// Name reported in logs.
    pub const NAME: &'static str = "SocketError";

    /// Value of the `error` field in [`SocketErrorBody`].
    pub const BODY_ERROR: &'static str = "WebSocketError";

    /// Create a socket error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
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

    /// Always 500.
    #[must_use]
    pub const fn status_code(&self) -> u16 { INTERNAL_SERVER_ERROR }

    /// The value this error was built from, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Thrown> { self.cause.as_deref() }

    /// Structured payload sent to clients.
    #[must_use]
    pub fn body(&self) -> SocketErrorBody {
        SocketErrorBody {
            error: Self::BODY_ERROR.to_owned(),
            message: self.message.clone(),
        }
    }

    /// Normalize any thrown value into a [`SocketError`].
    ///
    /// Socket errors pass through unchanged; everything else keeps its
    /// message text.
    #[must_use]
    pub fn from_thrown(thrown: Thrown) -> Self {
        match thrown {
            Thrown::Socket(error) => error,
            other => Self::new(other.to_string()).with_cause(other),
        }
    }
}
