//! Queue error kinds and the free-text kind detector.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of queue/RPC failure kinds.
///
/// The first three kinds are transient and worth retrying; the rest are
/// permanent and go straight to the dead-letter exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueErrorKind {
    /// The remote call did not answer in time.
    RpcTimeout,
    /// A dependency is unavailable. Also the fallback for unclassifiable
    /// failures, so unknown errors get another chance.
    #[default]
    ServiceUnavailable,
    /// The RPC service itself is unavailable.
    RpcServiceUnavailable,
    /// Malformed input.
    BadRequest,
    /// Missing or invalid credentials.
    Unauthorized,
    /// Credentials lack the required permission.
    Forbidden,
    /// The addressed resource does not exist.
    NotFound,
    /// Payload failed validation.
    ValidationError,
    /// Payload failed validation on the RPC boundary.
    RpcValidationError,
    /// The caller is being rate limited.
    TooManyRequests,
}

impl QueueErrorKind {
    /// Every kind, transient kinds first.
    pub const ALL: [Self; 10] = [
        Self::RpcTimeout,
        Self::ServiceUnavailable,
        Self::RpcServiceUnavailable,
        Self::BadRequest,
        Self::Unauthorized,
        Self::Forbidden,
        Self::NotFound,
        Self::ValidationError,
        Self::RpcValidationError,
        Self::TooManyRequests,
    ];

    /// Returns true if a failure of this kind may succeed on redelivery.
    ///
    /// This depends on the kind only, never on message text.
    ///
    /// ```
    /// use errorframe::QueueErrorKind;
    ///
    /// assert!(QueueErrorKind::RpcTimeout.is_transient());
    /// assert!(!QueueErrorKind::RpcValidationError.is_transient());
    /// ```
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(
            self,
            Self::RpcTimeout | Self::ServiceUnavailable | Self::RpcServiceUnavailable
        )
    }

    /// HTTP status associated with the kind.
    #[must_use]
    pub const fn default_status(self) -> u16 {
        match self {
            Self::BadRequest | Self::ValidationError | Self::RpcValidationError => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::TooManyRequests => 429,
            Self::RpcTimeout | Self::ServiceUnavailable | Self::RpcServiceUnavailable => 500,
        }
    }

    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RpcTimeout => "RPC_TIMEOUT",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::RpcServiceUnavailable => "RPC_SERVICE_UNAVAILABLE",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::RpcValidationError => "RPC_VALIDATION_ERROR",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
        }
    }
}

impl fmt::Display for QueueErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Returned when parsing a string that names no [`QueueErrorKind`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown queue error kind: {0}")]
pub struct UnknownQueueErrorKind(pub String);

impl FromStr for QueueErrorKind {
    type Err = UnknownQueueErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownQueueErrorKind(s.to_owned()))
    }
}

/// Keyword groups checked in order; the first group with a match wins.
///
/// Order matters because keywords overlap: "rpc service unavailable" must be
/// tried before the broader "unavailable".
const KEYWORDS: &[(&[&str], QueueErrorKind)] = &[
    (
        &["timeout", "timed out", "rpc_timeout"],
        QueueErrorKind::RpcTimeout,
    ),
    (
        &["rpc service unavailable", "rpc_service_unavailable"],
        QueueErrorKind::RpcServiceUnavailable,
    ),
    (
        &["service unavailable", "service_unavailable", "unavailable"],
        QueueErrorKind::ServiceUnavailable,
    ),
    (
        &["429", "too many requests", "rate limit"],
        QueueErrorKind::TooManyRequests,
    ),
    (
        &["bad request", "bad_request", "invalid"],
        QueueErrorKind::BadRequest,
    ),
    (
        &["unauthorized", "authentication", "auth"],
        QueueErrorKind::Unauthorized,
    ),
    (
        &["forbidden", "access denied", "permission"],
        QueueErrorKind::Forbidden,
    ),
    (
        &["not found", "not_found", "404"],
        QueueErrorKind::NotFound,
    ),
];

/// Infer a [`QueueErrorKind`] from free-text message content.
///
/// Matching is case-insensitive. Messages that match nothing classify as
/// [`QueueErrorKind::ServiceUnavailable`], which is transient.
///
/// ```
/// use errorframe::{QueueErrorKind, detect_queue_error_kind};
///
/// assert_eq!(
///     detect_queue_error_kind("RPC service unavailable"),
///     QueueErrorKind::RpcServiceUnavailable
/// );
/// assert_eq!(
///     detect_queue_error_kind("something odd"),
///     QueueErrorKind::ServiceUnavailable
/// );
/// ```
#[must_use]
pub fn detect_queue_error_kind(message: &str) -> QueueErrorKind {
    let lower = message.to_lowercase();
    if let Some((_, kind)) = KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| lower.contains(keyword)))
    {
        return *kind;
    }
    if lower.contains("validation") {
        return if lower.contains("rpc") {
            QueueErrorKind::RpcValidationError
        } else {
            QueueErrorKind::ValidationError
        };
    }
    QueueErrorKind::default()
}
