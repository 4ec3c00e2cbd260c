#![doc(html_root_url = "https://docs.rs/errorframe/latest")]
//! Public API for the `errorframe` library.
//!
//! This crate normalizes failures raised by request handlers, queue
//! consumers and WebSocket gateways into one error model, and decides what
//! each transport does with them: an HTTP error body, a broker
//! acknowledgement or dead-letter publish, or a socket event.
//!
//! ```
//! use errorframe::{QueueError, QueueErrorKind, Thrown, detect_queue_error_kind};
//! use serde_json::json;
//!
//! assert_eq!(
//!     detect_queue_error_kind("upstream request timeout"),
//!     QueueErrorKind::RpcTimeout
//! );
//!
//! let wire = Thrown::from(json!({ "message": "gone", "kind": "NOT_FOUND", "statusCode": 404 }));
//! let error = QueueError::from_thrown(wire);
//! assert_eq!(error.kind(), QueueErrorKind::NotFound);
//! assert!(!error.kind().is_transient());
//! ```

pub mod call_log;
pub mod circuit_breaker;
pub mod classify;
pub mod context;
pub mod env;
pub mod error;
pub mod file;
pub mod filter;
pub mod guard;
pub mod json_rpc;
pub mod metrics;
pub mod middleware;
pub mod panic;
pub mod prelude;
pub mod queue;
pub mod request;
pub mod response;
pub mod thrown;

pub use classify::{Classified, WireShape, classify};
pub use context::{ContextKind, ExecutionContext};
pub use error::{
    QueueError,
    QueueErrorKind,
    QueueErrorPayload,
    SocketError,
    TransportError,
    detect_queue_error_kind,
};
pub use filter::{ExceptionDispatcher, Rethrow};
pub use metrics::{CIRCUIT_TRANSITIONS, ERRORS_HANDLED, RATE_LIMIT_REJECTIONS, REDELIVERY_DECISIONS};
pub use queue::{BrokerChannel, QueueMessage, RedeliveryConfig, RedeliveryController};
pub use request::RequestParts;
pub use thrown::{BrokerException, HttpException, NativeError, Thrown};
