//! Optional convenience imports for wiring errorframe into a service.
//!
//! Only the types nearly every integration touches are re-exported. Prefer
//! importing specialised APIs directly from their owning modules.
//!
//! # Examples
//!
//! ```rust
//! use errorframe::prelude::*;
//!
//! let dispatcher = ExceptionDispatcher::new(RedeliveryConfig::default().max_retries(3));
//! let thrown = Thrown::from(TransportError::new("boom"));
//! # let _ = (dispatcher, thrown);
//! ```

pub use crate::{
    classify::{Classified, classify},
    context::{ContextKind, ExecutionContext, HttpResponder, SocketClient},
    error::{QueueError, QueueErrorKind, SocketError, TransportError},
    filter::{ExceptionDispatcher, Rethrow},
    queue::{BrokerChannel, QueueMessage, RedeliveryConfig},
    request::RequestParts,
    response::wrap,
    thrown::{NativeError, Thrown},
};
