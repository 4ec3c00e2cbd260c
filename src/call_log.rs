//! Call logging for every execution context.
//!
//! Each transport has its own line format: [`HttpCallLog`], [`RpcCallLog`]
//! and [`SocketCallLog`]. A log is started when the call arrives and
//! finished with the outcome, which records the elapsed time.
//! [`CallLogger::intercept`] picks the format from the context's
//! [`ContextKind`] and wraps a handler future with it. Calls in other or
//! malformed contexts run without logging.

use std::future::Future;

use log::{error, info};
use tokio::time::Instant;

use crate::{
    classify::classify,
    context::{ContextKind, ExecutionContext},
    error::SocketError,
    request::{RequestParts, UNKNOWN},
    thrown::Thrown,
};

/// Status reported for completed calls whose response status is not known.
pub const DEFAULT_SUCCESS_STATUS: u16 = 200;

/// Log lines for one HTTP request.
#[derive(Debug)]
pub struct HttpCallLog {
    method: String,
    url: String,
    started: Instant,
}

impl HttpCallLog {
    /// Log the arrival of `request`.
    #[must_use]
    pub fn start(request: &RequestParts) -> Self {
        let log = Self {
            method: request.method().to_owned(),
            url: request.url_or_path().to_owned(),
            started: Instant::now(),
        };
        info!(
            "[HTTP] Incoming request [{} {}] from {} ({})",
            log.method,
            log.url,
            request.client_ip(),
            request.user_agent(),
        );
        log
    }

    /// Log a response sent with `status`.
    pub fn completed(self, status: u16) {
        info!(
            "[HTTP] Request completed [{} {}] {status} {}ms",
            self.method,
            self.url,
            elapsed_ms(self.started),
        );
    }

    /// Log a failure with its classified status and message.
    pub fn failed(self, thrown: &Thrown) {
        let classified = classify(thrown);
        error!(
            "[HTTP] Request failed [{} {}] {} {}ms - {}",
            self.method,
            self.url,
            classified.status_or_default(),
            elapsed_ms(self.started),
            classified.message,
        );
    }
}

/// Log lines for one queue or RPC call.
#[derive(Debug)]
pub struct RpcCallLog {
    pattern: String,
    started: Instant,
}

impl RpcCallLog {
    /// Log the arrival of a call bound to `pattern`.
    #[must_use]
    pub fn start(pattern: Option<&str>) -> Self {
        let pattern = known(pattern);
        info!("[RPC] Incoming request [pattern: {pattern}]");
        Self {
            pattern,
            started: Instant::now(),
        }
    }

    /// Log a completed call.
    pub fn completed(self) {
        info!(
            "[RPC] Request completed [pattern: {}, duration: {}ms]",
            self.pattern,
            elapsed_ms(self.started),
        );
    }

    /// Log a failed call.
    pub fn failed(self, thrown: &Thrown) {
        error!(
            "[RPC] Request failed [pattern: {}, duration: {}ms, error: {thrown}]",
            self.pattern,
            elapsed_ms(self.started),
        );
    }
}

/// Log lines for one WebSocket event.
#[derive(Debug)]
pub struct SocketCallLog {
    pattern: String,
    client: String,
    started: Instant,
}

impl SocketCallLog {
    /// Log the arrival of an event bound to `pattern` from `client`.
    #[must_use]
    pub fn start(pattern: Option<&str>, client: Option<&str>) -> Self {
        let pattern = known(pattern);
        let client = known(client);
        info!("[WS] Incoming event [pattern: {pattern}] from client [{client}]");
        Self {
            pattern,
            client,
            started: Instant::now(),
        }
    }

    /// Log a handled event.
    pub fn completed(self) {
        info!(
            "[WS] Event completed [pattern: {}, client: {}, duration: {}ms]",
            self.pattern,
            self.client,
            elapsed_ms(self.started),
        );
    }

    /// Log a failed event with the message its client will see.
    pub fn failed(self, thrown: &Thrown) {
        let error = SocketError::from_thrown(thrown.clone());
        error!(
            "[WS] Event failed [pattern: {}, client: {}, duration: {}ms] - {}",
            self.pattern,
            self.client,
            elapsed_ms(self.started),
            error.message(),
        );
    }
}

enum CallLog {
    Http(HttpCallLog),
    Rpc(RpcCallLog),
    Socket(SocketCallLog),
}

impl CallLog {
    fn start(context: &mut dyn ExecutionContext) -> Option<Self> {
        match context.kind() {
            ContextKind::Http => context
                .http()
                .map(|http| Self::Http(HttpCallLog::start(http.request))),
            ContextKind::Queue => context
                .queue()
                .map(|queue| Self::Rpc(RpcCallLog::start(queue.pattern))),
            ContextKind::Socket => {
                let pattern = context.socket_pattern().map(str::to_owned);
                context.socket().map(|client| {
                    Self::Socket(SocketCallLog::start(pattern.as_deref(), client.id()))
                })
            }
            ContextKind::Other(_) => None,
        }
    }

    fn finish<T>(self, outcome: &Result<T, Thrown>) {
        match (self, outcome) {
            (Self::Http(log), Ok(_)) => log.completed(DEFAULT_SUCCESS_STATUS),
            (Self::Http(log), Err(thrown)) => log.failed(thrown),
            (Self::Rpc(log), Ok(_)) => log.completed(),
            (Self::Rpc(log), Err(thrown)) => log.failed(thrown),
            (Self::Socket(log), Ok(_)) => log.completed(),
            (Self::Socket(log), Err(thrown)) => log.failed(thrown),
        }
    }
}

/// Logs calls in whichever context they arrive.
///
/// # Examples
///
/// ```
/// use errorframe::{
///     QueueMessage,
///     Thrown,
///     call_log::CallLogger,
///     context::QueueExecution,
///     queue::{BrokerChannel, PublishOptions},
/// };
///
/// struct Channel;
///
/// impl BrokerChannel for Channel {
///     fn ack(&self, _: &QueueMessage) {}
///     fn nack(&self, _: &QueueMessage, _: bool, _: bool) {}
///     fn publish(&self, _: &str, _: &str, _: &bytes::Bytes, _: &PublishOptions) {}
/// }
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let message = QueueMessage::new("{}");
/// let mut context = QueueExecution::new(&Channel, &message).with_pattern("orders.create");
/// let result = CallLogger
///     .intercept(&mut context, async { Ok::<_, Thrown>(42) })
///     .await;
/// assert_eq!(result, Ok(42));
/// # });
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct CallLogger;

impl CallLogger {
    /// Run `call`, logging its arrival and outcome in the format of
    /// `context`'s kind. The outcome is returned unchanged.
    ///
    /// HTTP completions are reported with [`DEFAULT_SUCCESS_STATUS`]; use
    /// [`crate::middleware::LoggingMiddleware`] to log the real status.
    pub fn intercept<T, Fut>(
        &self,
        context: &mut dyn ExecutionContext,
        call: Fut,
    ) -> impl Future<Output = Result<T, Thrown>> + use<T, Fut>
    where
        Fut: Future<Output = Result<T, Thrown>>,
    {
        let log = CallLog::start(context);
        async move {
            let outcome = call.await;
            if let Some(log) = log {
                log.finish(&outcome);
            }
            outcome
        }
    }
}

fn known(value: Option<&str>) -> String {
    value
        .filter(|value| !value.is_empty())
        .unwrap_or(UNKNOWN)
        .to_owned()
}

fn elapsed_ms(started: Instant) -> u128 { started.elapsed().as_millis() }

#[cfg(test)]
mod tests;
