//! HTTP-facing error type.

use thiserror::Error;

use super::{FORBIDDEN, INTERNAL_SERVER_ERROR, UNAUTHORIZED};
use crate::{classify::classify, thrown::Thrown};

/// An error surfaced to HTTP clients with a numeric status.
///
/// # Examples
///
/// ```
/// use errorframe::{NativeError, Thrown, TransportError};
///
/// let error = TransportError::from_thrown(
///     Thrown::from(NativeError::new("disk full")),
///     Some("Upload failed"),
/// );
/// assert_eq!(error.message(), "Upload failed: disk full");
/// assert_eq!(error.status_code(), 500);
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    status_code: u16,
    #[source]
    cause: Option<Box<Thrown>>,
}

impl TransportError {
    /// Name reported in HTTP error bodies and logs.
    pub const NAME: &'static str = "TransportError";

    /// Create an error with status 500.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: INTERNAL_SERVER_ERROR,
            cause: None,
        }
    }

    /// Create a 401 error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(message).with_status(UNAUTHORIZED)
    }

    /// Create a 403 error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self { Self::new(message).with_status(FORBIDDEN) }

    /// Override the status.
    #[must_use]
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    /// Record the value this error was built from.
    #[must_use]
    pub fn with_cause(mut self, cause: Thrown) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Client-facing message.
    #[must_use]
    pub fn message(&self) -> &str { &self.message }

    /// HTTP status.
    #[must_use]
    pub fn status_code(&self) -> u16 { self.status_code }

    /// The value this error was built from, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Thrown> { self.cause.as_deref() }

    /// Normalize any thrown value into a [`TransportError`].
    ///
    /// A value that already is a [`TransportError`] is returned unchanged,
    /// without applying `prefix`. Everything else goes through
    /// [`classify`]; the optional `prefix` is prepended as
    /// `"<prefix>: <message>"`.
    #[must_use]
    pub fn from_thrown(thrown: Thrown, prefix: Option<&str>) -> Self {
        if let Thrown::Transport(error) = thrown {
            return error;
        }
        let classified = classify(&thrown).with_prefix(prefix);
        Self::new(classified.message)
            .with_status(classified.status_code.unwrap_or(INTERNAL_SERVER_ERROR))
            .with_cause(thrown)
    }
}
