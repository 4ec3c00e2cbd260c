//! Execution contexts a failure can be raised under.
//!
//! The host runtime describes the call that failed through
//! [`ExecutionContext`]: its [`ContextKind`] and the accessors for that kind.
//! An accessor that returns `None` for the declared kind marks the context
//! as malformed, and the dispatcher re-throws the original value.

use std::fmt;

use crate::{
    filter::{HttpErrorBody, SocketErrorEvent},
    queue::{BrokerChannel, QueueMessage},
    request::RequestParts,
};

/// The transport a call arrived on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// An HTTP request.
    Http,
    /// A queue-consumed message or RPC call.
    Queue,
    /// A WebSocket event.
    Socket,
    /// A context this crate does not handle.
    Other(String),
}

impl ContextKind {
    /// Parse the host runtime's context name (`http`, `rpc` or `ws`).
    ///
    /// ```
    /// use errorframe::context::ContextKind;
    ///
    /// assert_eq!(ContextKind::parse("rpc"), ContextKind::Queue);
    /// assert_eq!(ContextKind::parse("graphql"), ContextKind::Other("graphql".into()));
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "http" => Self::Http,
            "rpc" => Self::Queue,
            "ws" => Self::Socket,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The host runtime's name for this context.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Other(name) => name,
            known => known.static_name().unwrap_or_default(),
        }
    }

    pub(crate) const fn static_name(&self) -> Option<&'static str> {
        match self {
            Self::Http => Some("http"),
            Self::Queue => Some("rpc"),
            Self::Socket => Some("ws"),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Sends an error response to an HTTP client.
pub trait HttpResponder {
    /// Send `body` with status `status`.
    fn send(&mut self, status: u16, body: &HttpErrorBody);
}

/// Emits events to a connected WebSocket client.
pub trait SocketClient {
    /// Emit `payload` under the event name `event`.
    fn emit(&mut self, event: &str, payload: &SocketErrorEvent);

    /// Connection identifier, if the transport assigns one.
    fn id(&self) -> Option<&str> { None }
}

/// HTTP accessors: the failing request and its response handle.
pub struct HttpContext<'a> {
    /// The request being served.
    pub request: &'a RequestParts,
    /// Where the error response is sent.
    pub response: &'a mut dyn HttpResponder,
}

/// Queue accessors: the channel, the delivered message and the consumer
/// pattern.
pub struct QueueContext<'a> {
    /// Channel used to ack, nack and publish.
    pub channel: &'a dyn BrokerChannel,
    /// The message whose processing failed.
    pub message: &'a QueueMessage,
    /// Pattern the consumer is bound to, if known.
    pub pattern: Option<&'a str>,
}

/// A failing call as seen by the dispatcher.
pub trait ExecutionContext {
    /// The transport the call arrived on.
    fn kind(&self) -> ContextKind;

    /// HTTP accessors, if this is a well-formed HTTP context.
    fn http(&mut self) -> Option<HttpContext<'_>> { None }

    /// Queue accessors, if this is a well-formed queue context.
    fn queue(&self) -> Option<QueueContext<'_>> { None }

    /// The WebSocket client, if this is a well-formed socket context.
    fn socket(&mut self) -> Option<&mut dyn SocketClient> { None }

    /// Pattern the WebSocket event was sent under, if known.
    fn socket_pattern(&self) -> Option<&str> { None }
}

/// An HTTP [`ExecutionContext`] over borrowed parts.
pub struct HttpExecution<'a, R> {
    request: &'a RequestParts,
    response: &'a mut R,
}

impl<'a, R: HttpResponder> HttpExecution<'a, R> {
    /// Wrap a request and its responder.
    pub fn new(request: &'a RequestParts, response: &'a mut R) -> Self { Self { request, response } }
}

impl<R: HttpResponder> ExecutionContext for HttpExecution<'_, R> {
    fn kind(&self) -> ContextKind { ContextKind::Http }

    fn http(&mut self) -> Option<HttpContext<'_>> {
        Some(HttpContext {
            request: self.request,
            response: &mut *self.response,
        })
    }
}

/// A queue [`ExecutionContext`] over borrowed parts.
pub struct QueueExecution<'a, C> {
    channel: &'a C,
    message: &'a QueueMessage,
    pattern: Option<&'a str>,
}

impl<'a, C: BrokerChannel> QueueExecution<'a, C> {
    /// Wrap a channel and the message delivered on it.
    pub fn new(channel: &'a C, message: &'a QueueMessage) -> Self {
        Self {
            channel,
            message,
            pattern: None,
        }
    }

    /// Record the consumer pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: &'a str) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

impl<C: BrokerChannel> ExecutionContext for QueueExecution<'_, C> {
    fn kind(&self) -> ContextKind { ContextKind::Queue }

    fn queue(&self) -> Option<QueueContext<'_>> {
        Some(QueueContext {
            channel: self.channel,
            message: self.message,
            pattern: self.pattern,
        })
    }
}

/// A WebSocket [`ExecutionContext`] over a borrowed client.
pub struct SocketExecution<'a, S> {
    client: &'a mut S,
    pattern: Option<&'a str>,
}

impl<'a, S: SocketClient> SocketExecution<'a, S> {
    /// Wrap a connected client.
    pub fn new(client: &'a mut S) -> Self {
        Self {
            client,
            pattern: None,
        }
    }

    /// Record the event pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: &'a str) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

impl<S: SocketClient> ExecutionContext for SocketExecution<'_, S> {
    fn kind(&self) -> ContextKind { ContextKind::Socket }

    fn socket(&mut self) -> Option<&mut dyn SocketClient> { Some(&mut *self.client) }

    fn socket_pattern(&self) -> Option<&str> { self.pattern }
}
