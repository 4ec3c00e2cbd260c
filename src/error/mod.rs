//! Typed error model shared by the exception filters.
//!
//! Each transport context has its own error type:
//!
//! - [`TransportError`]: HTTP-facing errors carrying a numeric status.
//! - [`QueueError`]: queue/RPC errors carrying a [`QueueErrorKind`] and a status. The kind alone
//!   decides whether a failed message is retried.
//! - [`SocketError`]: WebSocket errors that always resolve to a fixed `{error: "WebSocketError",
//!   message}` payload.
//!
//! All three are built from an arbitrary [`Thrown`](crate::Thrown) through a
//! `from_thrown` constructor, and all three keep the value they were built
//! from as their error source.

mod kind;
mod queue;
mod socket;
mod transport;

pub use kind::{QueueErrorKind, UnknownQueueErrorKind, detect_queue_error_kind};
pub use queue::{QueueError, QueueErrorPayload};
pub use socket::{SocketError, SocketErrorBody};
pub use transport::TransportError;

/// Status used when no valid status can be recovered from a failure.
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// Status reported for authentication failures.
pub const UNAUTHORIZED: u16 = 401;

/// Status reported for authorization failures.
pub const FORBIDDEN: u16 = 403;

/// Lowest status accepted from inbound payloads; anything below falls back
/// to [`INTERNAL_SERVER_ERROR`].
pub const MIN_ERROR_STATUS: u16 = 400;
