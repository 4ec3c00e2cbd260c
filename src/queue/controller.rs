//! Applies redelivery decisions to a broker channel.

use log::{error, warn};

use super::{
    BrokerChannel,
    PublishOptions,
    QueueMessage,
    RedeliveryConfig,
    RedeliveryDecision,
    decide,
};
use crate::{error::QueueError, metrics};

/// Drives the retry/dead-letter decision for one failed message.
///
/// # Examples
///
/// ```
/// use errorframe::queue::{RedeliveryConfig, RedeliveryController};
///
/// let controller = RedeliveryController::new(RedeliveryConfig::default());
/// assert_eq!(controller.config().dead_letter_exchange, "events_exchange.dlx");
/// ```
#[derive(Clone, Debug, Default)]
pub struct RedeliveryController {
    config: RedeliveryConfig,
}

impl RedeliveryController {
    /// Create a controller with the given configuration.
    #[must_use]
    pub fn new(config: RedeliveryConfig) -> Self { Self { config } }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &RedeliveryConfig { &self.config }

    /// Handle a failed delivery of `message`.
    ///
    /// Transient failures under the retry budget are nacked without requeue
    /// and `Ok(())` is returned. Otherwise the message is published to the
    /// dead-letter exchange under its routing key (or `pattern` when it has
    /// none), acknowledged, and `error` is returned for the caller to
    /// surface.
    ///
    /// `stack` is included in the failure log line when present.
    ///
    /// # Errors
    ///
    /// Returns `error` unchanged when the message was dead-lettered.
    pub fn handle(
        &self,
        channel: &dyn BrokerChannel,
        message: &QueueMessage,
        pattern: &str,
        error: QueueError,
        stack: Option<&str>,
    ) -> Result<(), QueueError> {
        let retries = message.retry_count();
        let transient = error.is_transient();
        error!(
            "RPC [{pattern}] {} - {} - {} - {} [attempt: {}, type: {}]. Stack: {}",
            error.status_code(),
            QueueError::NAME,
            error.kind(),
            error.message(),
            retries.saturating_add(1),
            if transient { "transient" } else { "permanent" },
            stack.unwrap_or_default(),
        );

        let decision = decide(transient, retries, self.config.max_retries);
        metrics::inc_redelivery(decision.as_str());
        match decision {
            RedeliveryDecision::Retry { attempt } => {
                channel.nack(message, false, false);
                warn!("Transient error - message requeued for retry #{attempt} [pattern: {pattern}]");
                Ok(())
            }
            RedeliveryDecision::DeadLetter { .. } => {
                self.dead_letter(channel, message, pattern, &error);
                Err(error)
            }
        }
    }

    fn dead_letter(
        &self,
        channel: &dyn BrokerChannel,
        message: &QueueMessage,
        pattern: &str,
        error: &QueueError,
    ) {
        let routing_key = message
            .routing_key()
            .filter(|key| !key.is_empty())
            .unwrap_or(pattern);
        let options = PublishOptions {
            headers: message.headers().clone(),
        };
        channel.publish(
            &self.config.dead_letter_exchange,
            routing_key,
            message.payload(),
            &options,
        );
        channel.ack(message);
        warn!(
            "Message sent to DLX [pattern: {pattern}, error: {}]",
            error.message()
        );
    }
}
