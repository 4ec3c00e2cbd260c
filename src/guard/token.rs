//! Token guards for bearer-authenticated HTTP routes and WebSocket
//! handshakes.
//!
//! Both guards read a token and hand it to an optional [`TokenValidator`].
//! Without a validator any non-empty token is accepted.

use std::{fmt, sync::Arc};

use serde_json::Value;

use super::{Guard, RouteOptions};
use crate::{
    error::TransportError,
    request::RequestParts,
    thrown::{BrokerException, Thrown},
};

/// Message used when no token is presented.
pub const TOKEN_REQUIRED: &str = "Authentication token is required";

/// Message used when the validator rejects the token.
pub const TOKEN_INVALID: &str = "Invalid authentication token";

const BEARER_SCHEME: &str = "bearer";

/// Decides whether a presented token is valid.
///
/// Implemented for any `Fn(&str) -> bool`.
pub trait TokenValidator: Send + Sync {
    /// Whether `token` identifies a valid caller.
    fn validate(&self, token: &str) -> bool;
}

impl<F> TokenValidator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn validate(&self, token: &str) -> bool { self(token) }
}

#[derive(Clone, Default)]
struct Validation(Option<Arc<dyn TokenValidator>>);

impl Validation {
    fn check(&self, token: Option<&str>) -> Result<(), &'static str> {
        let token = token.filter(|token| !token.is_empty()).ok_or(TOKEN_REQUIRED)?;
        match &self.0 {
            Some(validator) if !validator.validate(token) => Err(TOKEN_INVALID),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.is_some() { "Some(..)" } else { "None" })
    }
}

/// Requires an `Authorization: Bearer <token>` header on non-public routes.
///
/// Both failures are 401 [`TransportError`]s.
///
/// ```
/// use errorframe::{
///     guard::{BearerTokenGuard, Guard, RouteOptions},
///     request::RequestParts,
/// };
///
/// let guard = BearerTokenGuard::default().with_validator(|token: &str| token == "t-1");
/// let route = RouteOptions::default();
///
/// let ok = RequestParts::new("GET", "/me").with_header("Authorization", "Bearer t-1");
/// assert!(guard.check(&ok, &route).is_ok());
///
/// let stale = RequestParts::new("GET", "/me").with_header("Authorization", "Bearer t-0");
/// assert_eq!(
///     guard.check(&stale, &route).unwrap_err().to_string(),
///     "Invalid authentication token"
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct BearerTokenGuard {
    validation: Validation,
}

impl BearerTokenGuard {
    /// Validate tokens with `validator`.
    #[must_use]
    pub fn with_validator(mut self, validator: impl TokenValidator + 'static) -> Self {
        self.validation = Validation(Some(Arc::new(validator)));
        self
    }

    /// The bearer token carried by `request`, if any.
    #[must_use]
    pub fn token(request: &RequestParts) -> Option<&str> {
        let (scheme, token) = request.header("authorization")?.split_once(' ')?;
        scheme
            .eq_ignore_ascii_case(BEARER_SCHEME)
            .then_some(token.trim())
    }
}

impl Guard for BearerTokenGuard {
    fn check(&self, request: &RequestParts, route: &RouteOptions) -> Result<(), Thrown> {
        if route.public {
            return Ok(());
        }
        self.validation
            .check(Self::token(request))
            .map_err(|message| TransportError::unauthorized(message).into())
    }
}

/// Token sources offered by a WebSocket client when it connects or sends an
/// event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SocketHandshake {
    /// Event payload; may carry a `token` field.
    pub data: Value,
    /// Handshake auth object; may carry a `token` field.
    pub auth: Value,
}

impl SocketHandshake {
    /// A handshake offering the given event payload and auth object.
    #[must_use]
    pub fn new(data: Value, auth: Value) -> Self { Self { data, auth } }

    /// The offered token: `data.token`, else `auth.token`.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        [&self.data, &self.auth]
            .into_iter()
            .filter_map(|source| source.get("token").and_then(Value::as_str))
            .find(|token| !token.is_empty())
    }
}

/// Authenticates WebSocket clients by the token they present.
///
/// Failures are socket exceptions, reported to the client with the
/// `WS_EXCEPTION` code.
///
/// ```
/// use errorframe::guard::{SocketAuthGuard, SocketHandshake};
/// use serde_json::json;
///
/// let guard = SocketAuthGuard::default();
/// let handshake = SocketHandshake::new(json!({}), json!({ "token": "t-1" }));
/// assert!(guard.check(&handshake).is_ok());
///
/// let anonymous = SocketHandshake::default();
/// assert_eq!(
///     guard.check(&anonymous).unwrap_err().to_string(),
///     "Authentication token is required"
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct SocketAuthGuard {
    validation: Validation,
}

impl SocketAuthGuard {
    /// Validate tokens with `validator`.
    #[must_use]
    pub fn with_validator(mut self, validator: impl TokenValidator + 'static) -> Self {
        self.validation = Validation(Some(Arc::new(validator)));
        self
    }

    /// Check the token offered in `handshake`.
    ///
    /// # Errors
    ///
    /// Returns a socket exception when no token is offered or the validator
    /// rejects it.
    pub fn check(&self, handshake: &SocketHandshake) -> Result<(), Thrown> {
        self.validation
            .check(handshake.token())
            .map_err(|message| BrokerException::new(message).into())
    }
}
