//! WebSocket context handler.

use log::error;
use serde::{Deserialize, Serialize};

use super::Rethrow;
use crate::{context::ExecutionContext, error::SocketError, response::timestamp, thrown::Thrown};

/// Event name error payloads are emitted under.
pub const EXCEPTION_EVENT: &str = "exception";

/// Error event sent to WebSocket clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketErrorEvent {
    /// Always `"error"`.
    pub status: String,
    /// Client-facing message.
    pub message: String,
    /// Error code derived from the failure's type.
    pub code: String,
    /// RFC 3339 time the error was handled.
    pub timestamp: String,
}

/// Turns failures into `exception` events.
#[derive(Clone, Debug, Default)]
pub struct SocketExceptionHandler;

impl SocketExceptionHandler {
    /// Error code reported for `thrown`.
    ///
    /// ```
    /// use errorframe::{NativeError, Thrown, filter::SocketExceptionHandler};
    ///
    /// let thrown = Thrown::from(NativeError::named("TypeError", "x is undefined"));
    /// assert_eq!(SocketExceptionHandler::code(&thrown), "TYPEERROR");
    /// ```
    #[must_use]
    pub fn code(thrown: &Thrown) -> String {
        match thrown {
            Thrown::Socket(_) => "SOCKET_ERROR".to_owned(),
            Thrown::Broker(_) => "WS_EXCEPTION".to_owned(),
            Thrown::Value(_) => "INTERNAL_ERROR".to_owned(),
            other => other.type_name().to_uppercase(),
        }
    }

    /// Build the event payload for `thrown`.
    #[must_use]
    pub fn event(&self, thrown: &Thrown) -> SocketErrorEvent {
        let error = SocketError::from_thrown(thrown.clone());
        SocketErrorEvent {
            status: "error".to_owned(),
            message: error.message().to_owned(),
            code: Self::code(thrown),
            timestamp: timestamp(),
        }
    }

    /// Emit an `exception` event for `thrown`.
    ///
    /// # Errors
    ///
    /// Returns [`Rethrow::Unhandled`] with `thrown` when `context` exposes no
    /// socket client.
    pub fn handle(
        &self,
        thrown: Thrown,
        context: &mut dyn ExecutionContext,
    ) -> Result<(), Rethrow> {
        let Some(client) = context.socket() else {
            return Err(Rethrow::Unhandled(thrown));
        };
        let event = self.event(&thrown);
        error!(
            "WebSocket {} - {} - {} [type: {}, original: {thrown}]",
            event.code,
            SocketError::NAME,
            event.message,
            thrown.type_name(),
        );
        if let Some(stack) = thrown.stack() {
            error!("Stack trace: {stack}");
        }
        client.emit(EXCEPTION_EVENT, &event);
        Ok(())
    }
}
