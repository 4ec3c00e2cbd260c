//! Request metadata consumed by handlers, guards and middleware.
//!
//! [`RequestParts`] carries the routing metadata of an inbound HTTP request
//! without its body. Header names are stored lower-cased so lookups are
//! case-insensitive.

use std::collections::BTreeMap;

/// Placeholder used when a piece of request metadata is absent.
pub const UNKNOWN: &str = "unknown";

/// Header carrying the caller-supplied request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the proxy chain of client addresses.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Request metadata extracted outwith the request body.
///
/// # Examples
///
/// ```
/// use errorframe::request::RequestParts;
///
/// let parts = RequestParts::new("GET", "/users")
///     .with_header("X-Request-ID", "abc-123")
///     .with_header("X-Forwarded-For", "10.0.0.1, 10.0.0.2");
/// assert_eq!(parts.request_id(), Some("abc-123"));
/// assert_eq!(parts.client_ip(), "10.0.0.1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParts {
    method: String,
    /// Original URL including the query string, when the host framework
    /// supplies one.
    url: Option<String>,
    path: String,
    headers: BTreeMap<String, String>,
    /// Identifier assigned by the host framework.
    id: Option<String>,
    /// Peer address reported by the host framework.
    ip: Option<String>,
    /// Caller identity established by upstream authentication.
    user: Option<AuthenticatedUser>,
}

/// The caller identity attached to a request once it has been
/// authenticated.
///
/// ```
/// use errorframe::request::AuthenticatedUser;
///
/// let user = AuthenticatedUser::new("u-1").with_roles(["admin"]);
/// assert!(user.has_role("admin"));
/// assert!(!user.has_permission("orders:write"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthenticatedUser {
    id: String,
    roles: Vec<String>,
    permissions: Vec<String>,
}

impl AuthenticatedUser {
    /// A user with no roles or permissions.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Replace the user's roles.
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the user's permissions.
    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// User identifier.
    #[must_use]
    pub fn id(&self) -> &str { &self.id }

    /// Roles held by the user.
    #[must_use]
    pub fn roles(&self) -> &[String] { &self.roles }

    /// Permissions granted to the user.
    #[must_use]
    pub fn permissions(&self) -> &[String] { &self.permissions }

    /// Whether the user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool { self.roles.iter().any(|held| held == role) }

    /// Whether the user was granted `permission`.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|held| held == permission)
    }
}

impl RequestParts {
    /// Construct request parts for `method` and `path`.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Record the original URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Add a header. The name is lower-cased.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    /// Record the framework-assigned request identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Record the peer address.
    #[must_use]
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Attach the authenticated caller.
    #[must_use]
    pub fn with_user(mut self, user: AuthenticatedUser) -> Self {
        self.user = Some(user);
        self
    }

    /// Insert or replace a header. The name is lower-cased.
    pub fn insert_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &str { &self.method }

    /// Request path without the query string.
    #[must_use]
    pub fn path(&self) -> &str { &self.path }

    /// Original URL, if known.
    #[must_use]
    pub fn url(&self) -> Option<&str> { self.url.as_deref() }

    /// The URL when known, else the path.
    #[must_use]
    pub fn url_or_path(&self) -> &str { self.url.as_deref().unwrap_or(&self.path) }

    /// Look up a header by case-insensitive name. Empty values count as
    /// absent.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// All headers, keyed by lower-cased name.
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> { &self.headers }

    /// Framework-assigned request identifier.
    #[must_use]
    pub fn id(&self) -> Option<&str> { self.id.as_deref() }

    /// Peer address.
    #[must_use]
    pub fn ip(&self) -> Option<&str> { self.ip.as_deref() }

    /// The authenticated caller, if any.
    #[must_use]
    pub fn user(&self) -> Option<&AuthenticatedUser> { self.user.as_ref() }

    /// Request identifier: the `x-request-id` header, else the
    /// framework-assigned id.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header(REQUEST_ID_HEADER)
            .or_else(|| self.id().filter(|id| !id.is_empty()))
    }

    /// Client address: the first `x-forwarded-for` entry, else the peer
    /// address, else [`UNKNOWN`].
    #[must_use]
    pub fn client_ip(&self) -> &str {
        self.header(FORWARDED_FOR_HEADER)
            .and_then(|chain| chain.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .or_else(|| self.ip().filter(|ip| !ip.is_empty()))
            .unwrap_or(UNKNOWN)
    }

    /// The `user-agent` header, else [`UNKNOWN`].
    #[must_use]
    pub fn user_agent(&self) -> &str { self.header("user-agent").unwrap_or(UNKNOWN) }
}

#[cfg(test)]
mod tests;
