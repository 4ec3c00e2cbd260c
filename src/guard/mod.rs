//! Route guards configured per route rather than by handler annotations.
//!
//! Each route is registered with a [`RouteOptions`] value. A [`Guard`] reads
//! it together with the request metadata and either admits the request or
//! fails it with a [`Thrown`] value that the dispatcher turns into an error
//! response. [`GuardMiddleware`] runs a guard in front of a service.
//!
//! Identity guards ([`AuthenticatedGuard`], [`RolesGuard`],
//! [`PermissionsGuard`]) read the caller attached to the request by upstream
//! authentication. [`SocketAuthGuard`] checks WebSocket handshakes instead of
//! HTTP requests.

mod api_key;
mod auth;
mod rate_limit;
mod token;

use async_trait::async_trait;

pub use self::{
    api_key::{API_KEY_INVALID, API_KEY_REQUIRED, ApiKeyGuard, DEFAULT_API_KEY_HEADER},
    auth::{AuthenticatedGuard, PermissionsGuard, RolesGuard, USER_NOT_AUTHENTICATED},
    rate_limit::{
        RATE_LIMIT_MESSAGE,
        RateLimitConfig,
        RateLimitExceeded,
        RateLimitKey,
        RateLimiter,
        spawn_sweeper,
    },
    token::{
        BearerTokenGuard,
        SocketAuthGuard,
        SocketHandshake,
        TOKEN_INVALID,
        TOKEN_REQUIRED,
        TokenValidator,
    },
};
use crate::{
    middleware::{Next, Service, ServiceRequest, ServiceResponse, Transform},
    request::RequestParts,
    thrown::Thrown,
};

/// Per-route guard configuration.
///
/// ```
/// use errorframe::guard::RouteOptions;
///
/// let options = RouteOptions::default()
///     .requires_api_key(true)
///     .roles(["admin", "ops"]);
/// assert!(!options.public);
/// assert!(options.requires_api_key);
/// assert_eq!(options.roles, ["admin", "ops"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteOptions {
    /// The route is reachable without credentials.
    pub public: bool,
    /// The route requires an API key.
    pub requires_api_key: bool,
    /// Roles of which the caller must hold at least one.
    pub roles: Vec<String>,
    /// Permissions the caller must hold all of.
    pub permissions: Vec<String>,
}

impl RouteOptions {
    /// Mark the route as public.
    #[must_use]
    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Require an API key on the route.
    #[must_use]
    pub fn requires_api_key(mut self, required: bool) -> Self {
        self.requires_api_key = required;
        self
    }

    /// Restrict the route to callers holding any of `roles`.
    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the route to callers holding all of `permissions`.
    #[must_use]
    pub fn permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }
}

/// Admits or rejects a request before it reaches its handler.
pub trait Guard: Send + Sync {
    /// Check `request` against `route`.
    ///
    /// # Errors
    ///
    /// Returns the failure to surface to the client when the request is
    /// rejected.
    fn check(&self, request: &RequestParts, route: &RouteOptions) -> Result<(), Thrown>;
}

/// Runs a [`Guard`] in front of a service.
#[derive(Clone, Debug)]
pub struct GuardMiddleware<G> {
    guard: G,
    route: RouteOptions,
}

impl<G: Guard + Clone> GuardMiddleware<G> {
    /// Guard a route configured with `route`.
    pub fn new(guard: G, route: RouteOptions) -> Self { Self { guard, route } }
}

/// Service produced by [`GuardMiddleware`].
pub struct GuardService<G, S> {
    guard: G,
    route: RouteOptions,
    inner: S,
}

#[async_trait]
impl<G, S> Transform<S> for GuardMiddleware<G>
where
    G: Guard + Clone + 'static,
    S: Service<Error = Thrown> + 'static,
{
    type Output = GuardService<G, S>;

    async fn transform(&self, service: S) -> Self::Output {
        GuardService {
            guard: self.guard.clone(),
            route: self.route.clone(),
            inner: service,
        }
    }
}

#[async_trait]
impl<G, S> Service for GuardService<G, S>
where
    G: Guard + 'static,
    S: Service<Error = Thrown> + 'static,
{
    type Error = Thrown;

    async fn call(&self, req: ServiceRequest) -> Result<ServiceResponse, Self::Error> {
        self.guard.check(req.parts(), &self.route)?;
        Next::new(&self.inner).call(req).await
    }
}
