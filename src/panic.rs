//! Handler panics as thrown values.
//!
//! A handler that panics is caught and its payload pushed through the same
//! exception filters as any other failure. The payload becomes a native
//! error named [`PanicMessage::NAME`].

use std::{
    any::Any,
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
};

use crate::thrown::Thrown;

/// Message reported when the payload is neither a `String` nor a `&str`.
pub const OPAQUE_PANIC: &str = "handler panicked";

/// A caught panic payload.
///
/// ```
/// use errorframe::panic::{OPAQUE_PANIC, PanicMessage};
///
/// assert_eq!(PanicMessage::new(Box::new("boom")).to_string(), "boom");
/// assert_eq!(PanicMessage::new(Box::new(String::from("boom"))).as_str(), Some("boom"));
/// assert_eq!(PanicMessage::new(Box::new(5_u32)).to_string(), OPAQUE_PANIC);
/// ```
#[derive(Debug)]
#[must_use]
pub struct PanicMessage(Box<dyn Any + Send>);

impl PanicMessage {
    /// Error name given to panics converted into [`Thrown`].
    pub const NAME: &'static str = "Panic";

    /// Wrap a payload returned by [`std::panic::catch_unwind`].
    pub fn new(payload: Box<dyn Any + Send>) -> Self { Self(payload) }

    /// The panic message, when the payload is textual.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| self.0.downcast_ref::<&'static str>().copied())
    }
}

impl fmt::Display for PanicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or(OPAQUE_PANIC))
    }
}

/// Run `handler`, turning a panic into a [`Thrown`].
///
/// # Errors
///
/// Returns the panic as a native error named `Panic`.
pub fn catch_panic<R>(handler: impl FnOnce() -> R) -> Result<R, Thrown> {
    catch_unwind(AssertUnwindSafe(handler)).map_err(|payload| PanicMessage::new(payload).into())
}
