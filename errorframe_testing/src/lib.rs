//! Test support for `errorframe`.
//!
//! Provides a serialised log capture fixture and recording implementations
//! of the transport traits, so integration tests can assert on exactly what
//! the dispatcher sent, acknowledged or published.
//!
//! ```rust
//! use errorframe::{
//!     ExceptionDispatcher, QueueMessage, Thrown, TransportError,
//!     context::QueueExecution,
//! };
//! use errorframe_testing::{ChannelCall, RecordingChannel};
//!
//! let channel = RecordingChannel::new();
//! let message = QueueMessage::new(&b"{}"[..]).with_routing_key("orders.create");
//! let mut ctx = QueueExecution::new(&channel, &message).with_pattern("orders.create");
//! let thrown = Thrown::from(TransportError::new("Validation error: name"));
//!
//! let _ = ExceptionDispatcher::default().dispatch(thrown, &mut ctx);
//! assert_eq!(channel.calls().last(), Some(&ChannelCall::Ack));
//! ```

pub mod logging;
pub mod recording;

pub use logging::{LoggerHandle, logger};
pub use recording::{ChannelCall, RecordingChannel, RecordingResponder, RecordingSocket};
