//! Request middleware: the envelope, request-id and logging layers.
//!
//! Middleware follows a `Service`/`Transform` pattern. A [`Transform`] wraps
//! an inner [`Service`] and returns a new service that may inspect or alter
//! the request before delegating to it through [`Next`], and the response
//! after.

use std::{collections::BTreeMap, future::Future};

use async_trait::async_trait;
use serde_json::Value;

use crate::{call_log::HttpCallLog, request::RequestParts, response::wrap, thrown::Thrown};

/// Response header carrying the request identifier.
pub const REQUEST_ID_RESPONSE_HEADER: &str = "X-Request-ID";

/// Incoming request wrapper passed through middleware.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceRequest {
    parts: RequestParts,
    body: Value,
}

impl ServiceRequest {
    /// Create a request from its metadata and JSON body.
    #[must_use]
    pub fn new(parts: RequestParts, body: Value) -> Self { Self { parts, body } }

    /// Request metadata.
    #[must_use]
    pub fn parts(&self) -> &RequestParts { &self.parts }

    /// Mutable access to the request metadata.
    pub fn parts_mut(&mut self) -> &mut RequestParts { &mut self.parts }

    /// Request body.
    #[must_use]
    pub fn body(&self) -> &Value { &self.body }

    /// Consume the request and return its metadata and body.
    #[must_use]
    pub fn into_parts(self) -> (RequestParts, Value) { (self.parts, self.body) }
}

/// Response produced by a handler or middleware.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceResponse {
    status: u16,
    headers: BTreeMap<String, String>,
    body: Value,
}

impl Default for ServiceResponse {
    fn default() -> Self { Self::new(Value::Null) }
}

impl ServiceResponse {
    /// Create a `200` response carrying `body`.
    #[must_use]
    pub fn new(body: Value) -> Self {
        Self {
            status: 200,
            headers: BTreeMap::new(),
            body,
        }
    }

    /// Override the status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// HTTP status.
    #[must_use]
    pub fn status(&self) -> u16 { self.status }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> { &self.headers }

    /// Look up a header by exact name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> { self.headers.get(name).map(String::as_str) }

    /// Set a header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Response body.
    #[must_use]
    pub fn body(&self) -> &Value { &self.body }

    /// Mutable access to the response body.
    pub fn body_mut(&mut self) -> &mut Value { &mut self.body }
}

/// Continuation used by middleware to call the next service in the chain.
pub struct Next<'a, S>
where
    S: Service + ?Sized,
{
    service: &'a S,
}

impl<'a, S> Next<'a, S>
where
    S: Service + ?Sized,
{
    /// Creates a new `Next` instance wrapping a reference to the given service.
    pub const fn new(service: &'a S) -> Self { Self { service } }

    /// Call the next service with the given request.
    ///
    /// # Errors
    ///
    /// Propagates any error produced by the wrapped service.
    pub async fn call(&self, req: ServiceRequest) -> Result<ServiceResponse, S::Error> {
        self.service.call(req).await
    }
}

/// Trait representing an asynchronous service.
#[async_trait]
pub trait Service: Send + Sync {
    /// Error type returned by the service.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Handle the incoming request and produce a response.
    async fn call(&self, req: ServiceRequest) -> Result<ServiceResponse, Self::Error>;
}

/// Factory for wrapping services with middleware.
#[async_trait]
pub trait Transform<S>: Send + Sync
where
    S: Service,
{
    /// Wrapped service produced by the middleware.
    type Output: Service;

    /// Create a new middleware service wrapping `service`.
    async fn transform(&self, service: S) -> Self::Output;
}

/// A [`Service`] backed by an async function.
pub struct FnService<F> {
    f: F,
}

/// Build a [`Service`] from an async function.
///
/// # Examples
///
/// ```
/// use errorframe::middleware::{ServiceRequest, ServiceResponse, service_fn};
///
/// let service = service_fn(|req: ServiceRequest| async move {
///     Ok(ServiceResponse::new(req.body().clone()))
/// });
/// # let _ = service;
/// ```
pub fn service_fn<F, Fut>(f: F) -> FnService<F>
where
    F: Fn(ServiceRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ServiceResponse, Thrown>> + Send + 'static,
{
    FnService { f }
}

#[async_trait]
impl<F, Fut> Service for FnService<F>
where
    F: Fn(ServiceRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ServiceResponse, Thrown>> + Send + 'static,
{
    type Error = Thrown;

    async fn call(&self, req: ServiceRequest) -> Result<ServiceResponse, Self::Error> {
        (self.f)(req).await
    }
}

/// Wraps successful response bodies in the standard envelope.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvelopeMiddleware;

/// Service produced by [`EnvelopeMiddleware`].
pub struct EnvelopeService<S> {
    inner: S,
}

#[async_trait]
impl<S> Transform<S> for EnvelopeMiddleware
where
    S: Service + 'static,
{
    type Output = EnvelopeService<S>;

    async fn transform(&self, service: S) -> Self::Output { EnvelopeService { inner: service } }
}

#[async_trait]
impl<S> Service for EnvelopeService<S>
where
    S: Service + 'static,
{
    type Error = S::Error;

    async fn call(&self, req: ServiceRequest) -> Result<ServiceResponse, Self::Error> {
        let parts = req.parts().clone();
        let mut response = Next::new(&self.inner).call(req).await?;
        let body = std::mem::take(response.body_mut());
        *response.body_mut() = wrap(body, &parts);
        Ok(response)
    }
}

/// Echoes the request identifier in the `X-Request-ID` response header.
///
/// The header is only set on success and only when an identifier is known.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestIdMiddleware;

/// Service produced by [`RequestIdMiddleware`].
pub struct RequestIdService<S> {
    inner: S,
}

#[async_trait]
impl<S> Transform<S> for RequestIdMiddleware
where
    S: Service + 'static,
{
    type Output = RequestIdService<S>;

    async fn transform(&self, service: S) -> Self::Output { RequestIdService { inner: service } }
}

#[async_trait]
impl<S> Service for RequestIdService<S>
where
    S: Service + 'static,
{
    type Error = S::Error;

    async fn call(&self, req: ServiceRequest) -> Result<ServiceResponse, Self::Error> {
        let request_id = req.parts().request_id().map(str::to_owned);
        let mut response = Next::new(&self.inner).call(req).await?;
        if let Some(id) = request_id {
            response.set_header(REQUEST_ID_RESPONSE_HEADER, id);
        }
        Ok(response)
    }
}

/// Logs each request on arrival and on completion or failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingMiddleware;

/// Service produced by [`LoggingMiddleware`].
pub struct LoggingService<S> {
    inner: S,
}

#[async_trait]
impl<S> Transform<S> for LoggingMiddleware
where
    S: Service<Error = Thrown> + 'static,
{
    type Output = LoggingService<S>;

    async fn transform(&self, service: S) -> Self::Output { LoggingService { inner: service } }
}

#[async_trait]
impl<S> Service for LoggingService<S>
where
    S: Service<Error = Thrown> + 'static,
{
    type Error = Thrown;

    async fn call(&self, req: ServiceRequest) -> Result<ServiceResponse, Self::Error> {
        let log = HttpCallLog::start(req.parts());
        let result = Next::new(&self.inner).call(req).await;
        match &result {
            Ok(response) => log.completed(response.status()),
            Err(thrown) => log.failed(thrown),
        }
        result
    }
}
