//! Queue context handler.

use super::Rethrow;
use crate::{
    context::ExecutionContext,
    error::QueueError,
    queue::{RedeliveryConfig, RedeliveryController},
    thrown::Thrown,
};

/// Pattern reported when the consumer did not supply one.
pub const UNKNOWN_PATTERN: &str = "unknown";

/// Normalizes a failure into a [`QueueError`] and applies the redelivery
/// decision to the delivered message.
#[derive(Clone, Debug, Default)]
pub struct QueueExceptionHandler {
    controller: RedeliveryController,
}

impl QueueExceptionHandler {
    /// Create a handler with the given redelivery configuration.
    #[must_use]
    pub fn new(config: RedeliveryConfig) -> Self {
        Self {
            controller: RedeliveryController::new(config),
        }
    }

    /// Handle a failure raised while consuming a message.
    ///
    /// # Errors
    ///
    /// Returns [`Rethrow::Unhandled`] with `thrown` when `context` exposes no
    /// queue accessors, and [`Rethrow::DeadLettered`] when the message was
    /// dead-lettered.
    pub fn handle(
        &self,
        thrown: Thrown,
        context: &mut dyn ExecutionContext,
    ) -> Result<(), Rethrow> {
        let Some(queue) = context.queue() else {
            return Err(Rethrow::Unhandled(thrown));
        };
        let pattern = queue
            .pattern
            .filter(|pattern| !pattern.is_empty())
            .unwrap_or(UNKNOWN_PATTERN);
        let stack = thrown.stack().map(str::to_owned);
        let error = QueueError::from_thrown(thrown);
        self.controller
            .handle(
                queue.channel,
                queue.message,
                pattern,
                error,
                stack.as_deref(),
            )
            .map_err(Rethrow::DeadLettered)
    }
}
