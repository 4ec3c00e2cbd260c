//! API key guard.

use std::collections::HashSet;

use super::{Guard, RouteOptions};
use crate::{error::TransportError, request::RequestParts, thrown::Thrown};

/// Header the key is read from by default.
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// Message used when the key header is missing.
pub const API_KEY_REQUIRED: &str = "API key is required";

/// Message used when the key is not in the allow-set.
pub const API_KEY_INVALID: &str = "Invalid API key";

/// Rejects requests to key-protected routes that carry no key or an unknown
/// one. Both failures are 401 [`TransportError`]s.
///
/// # Examples
///
/// ```
/// use errorframe::{
///     guard::{ApiKeyGuard, Guard, RouteOptions},
///     request::RequestParts,
/// };
///
/// let guard = ApiKeyGuard::default().valid_keys(["k1"]);
/// let route = RouteOptions::default().requires_api_key(true);
///
/// let ok = RequestParts::new("GET", "/reports").with_header("X-API-Key", "k1");
/// assert!(guard.check(&ok, &route).is_ok());
///
/// let missing = RequestParts::new("GET", "/reports");
/// let error = guard.check(&missing, &route).unwrap_err();
/// assert_eq!(error.to_string(), "API key is required");
/// ```
#[derive(Clone, Debug)]
pub struct ApiKeyGuard {
    header: String,
    valid_keys: Option<HashSet<String>>,
}

impl Default for ApiKeyGuard {
    fn default() -> Self {
        Self {
            header: DEFAULT_API_KEY_HEADER.to_owned(),
            valid_keys: None,
        }
    }
}

impl ApiKeyGuard {
    /// Read the key from `header` instead of `x-api-key`.
    #[must_use]
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Accept only the given keys. Without an allow-set any non-empty key
    /// passes.
    #[must_use]
    pub fn valid_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.valid_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }
}

impl Guard for ApiKeyGuard {
    fn check(&self, request: &RequestParts, route: &RouteOptions) -> Result<(), Thrown> {
        if route.public || !route.requires_api_key {
            return Ok(());
        }
        let Some(key) = request.header(&self.header) else {
            return Err(TransportError::unauthorized(API_KEY_REQUIRED).into());
        };
        if self
            .valid_keys
            .as_ref()
            .is_some_and(|keys| !keys.contains(key))
        {
            return Err(TransportError::unauthorized(API_KEY_INVALID).into());
        }
        Ok(())
    }
}
