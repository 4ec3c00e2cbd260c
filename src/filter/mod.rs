//! Routing of caught failures to the handler for their execution context.
//!
//! [`ExceptionDispatcher::dispatch`] is the single entry point: HTTP
//! failures become an error response, queue failures go through the
//! redelivery controller, WebSocket failures become an `exception` event.
//! Anything else, and any context missing its accessors, is handed back
//! untouched as [`Rethrow::Unhandled`].

mod http;
mod queue;
mod socket;

use thiserror::Error;

pub use self::{
    http::{HttpErrorBody, HttpExceptionHandler},
    queue::{QueueExceptionHandler, UNKNOWN_PATTERN},
    socket::{EXCEPTION_EVENT, SocketErrorEvent, SocketExceptionHandler},
};
use crate::{
    context::{ContextKind, ExecutionContext},
    error::QueueError,
    metrics,
    queue::RedeliveryConfig,
    thrown::Thrown,
};

/// A failure handed back to the host runtime after dispatch.
#[derive(Debug, Error, PartialEq)]
pub enum Rethrow {
    /// The message was dead-lettered; surface this error to the caller.
    #[error(transparent)]
    DeadLettered(QueueError),
    /// The failure was not handled and is returned unchanged.
    #[error(transparent)]
    Unhandled(Thrown),
}

impl Rethrow {
    /// Convert back into a thrown value.
    #[must_use]
    pub fn into_thrown(self) -> Thrown {
        match self {
            Self::DeadLettered(error) => Thrown::Queue(error),
            Self::Unhandled(thrown) => thrown,
        }
    }
}

/// Routes a failure to the HTTP, queue or WebSocket handler.
///
/// # Examples
///
/// ```
/// use errorframe::{
///     NativeError,
///     Thrown,
///     context::{ContextKind, ExecutionContext},
///     filter::{ExceptionDispatcher, Rethrow},
/// };
///
/// struct Cron;
///
/// impl ExecutionContext for Cron {
///     fn kind(&self) -> ContextKind { ContextKind::Other("cron".into()) }
/// }
///
/// let thrown = Thrown::from(NativeError::new("job failed"));
/// let result = ExceptionDispatcher::default().dispatch(thrown.clone(), &mut Cron);
/// assert_eq!(result, Err(Rethrow::Unhandled(thrown)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ExceptionDispatcher {
    http: HttpExceptionHandler,
    queue: QueueExceptionHandler,
    socket: SocketExceptionHandler,
}

impl ExceptionDispatcher {
    /// Create a dispatcher whose queue handler uses `config`.
    #[must_use]
    pub fn new(config: RedeliveryConfig) -> Self {
        Self {
            queue: QueueExceptionHandler::new(config),
            ..Self::default()
        }
    }

    /// Replace the HTTP handler.
    #[must_use]
    pub fn with_http_handler(mut self, handler: HttpExceptionHandler) -> Self {
        self.http = handler;
        self
    }

    /// Handle `thrown` according to the kind of `context`.
    ///
    /// # Errors
    ///
    /// Returns [`Rethrow::DeadLettered`] when a queue message was
    /// dead-lettered, and [`Rethrow::Unhandled`] with the original value for
    /// unknown or malformed contexts.
    pub fn dispatch(
        &self,
        thrown: Thrown,
        context: &mut dyn ExecutionContext,
    ) -> Result<(), Rethrow> {
        let kind = context.kind();
        if let Some(name) = kind.static_name() {
            metrics::inc_errors_handled(name);
        }
        match kind {
            ContextKind::Http => self.http.handle(thrown, context),
            ContextKind::Queue => self.queue.handle(thrown, context),
            ContextKind::Socket => self.socket.handle(thrown, context),
            ContextKind::Other(_) => Err(Rethrow::Unhandled(thrown)),
        }
    }
}
