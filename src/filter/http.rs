//! HTTP context handler.

use log::{error, warn};
use serde::{Deserialize, Serialize};

use super::Rethrow;
use crate::{
    classify::extract_code,
    context::ExecutionContext,
    error::{TransportError, UNAUTHORIZED},
    response::timestamp,
    thrown::Thrown,
};

/// Error body sent to HTTP clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpErrorBody {
    /// HTTP status.
    pub status_code: u16,
    /// RFC 3339 time the error was handled.
    pub timestamp: String,
    /// Request URL, or path when the URL is unknown.
    pub path: String,
    /// Error name.
    pub error: String,
    /// Client-facing message.
    pub message: String,
    /// Transport-level error code, when the failure carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Stack trace of the original failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Turns failures into [`HttpErrorBody`] responses.
#[derive(Clone, Debug)]
pub struct HttpExceptionHandler {
    include_stack: bool,
}

impl Default for HttpExceptionHandler {
    fn default() -> Self {
        Self {
            include_stack: true,
        }
    }
}

impl HttpExceptionHandler {
    /// Set whether stack traces are echoed to clients.
    #[must_use]
    pub fn include_stack(mut self, enabled: bool) -> Self {
        self.include_stack = enabled;
        self
    }

    /// Build the response body for `thrown` raised while serving `path`.
    #[must_use]
    pub fn body(&self, thrown: &Thrown, path: &str) -> HttpErrorBody {
        let error = TransportError::from_thrown(thrown.clone(), None);
        HttpErrorBody {
            status_code: error.status_code(),
            timestamp: timestamp(),
            path: path.to_owned(),
            error: TransportError::NAME.to_owned(),
            message: error.message().to_owned(),
            code: extract_code(thrown),
            stack: thrown
                .stack()
                .filter(|_| self.include_stack)
                .map(str::to_owned),
        }
    }

    /// Send an error response for `thrown`.
    ///
    /// # Errors
    ///
    /// Returns [`Rethrow::Unhandled`] with `thrown` when `context` exposes no
    /// HTTP accessors.
    pub fn handle(
        &self,
        thrown: Thrown,
        context: &mut dyn ExecutionContext,
    ) -> Result<(), Rethrow> {
        let Some(http) = context.http() else {
            return Err(Rethrow::Unhandled(thrown));
        };
        let body = self.body(&thrown, http.request.url_or_path());

        let line = format!(
            "HTTP {} - {} - {} [type: {}, original: {thrown}]",
            body.status_code,
            body.error,
            body.message,
            thrown.type_name(),
        );
        if body.status_code == UNAUTHORIZED {
            warn!("{line}");
        } else {
            error!("{line}");
        }
        if let Some(stack) = thrown.stack() {
            error!("Stack trace: {stack}");
        }

        http.response.send(body.status_code, &body);
        Ok(())
    }
}
