//! Queue message model and the redelivery controller.
//!
//! A consumer that fails to process a message hands the failure to
//! [`RedeliveryController::handle`], which either recycles the message
//! through the broker's retry queue or publishes it to the dead-letter
//! exchange. Exactly one of ack or nack is issued per message, and every
//! dead-letter publish is paired with an ack.

mod config;
mod controller;
mod policy;

use bytes::Bytes;
use serde_json::{Map, Value, json};

pub use config::{DEFAULT_DEAD_LETTER_EXCHANGE, DEFAULT_MAX_RETRIES, RedeliveryConfig};
pub use controller::RedeliveryController;
pub use policy::{DeadLetterReason, RedeliveryDecision, decide};

/// Header in which the broker records prior deliveries of a message.
pub const DEATH_HEADER: &str = "x-death";

/// A message delivered by the broker.
///
/// The controller only reads the routing key, payload and headers; it never
/// mutates the message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueueMessage {
    routing_key: Option<String>,
    payload: Bytes,
    headers: Map<String, Value>,
}

impl QueueMessage {
    /// Create a message carrying `payload`.
    #[must_use]
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            ..Self::default()
        }
    }

    /// Set the routing key the message was delivered with.
    #[must_use]
    pub fn with_routing_key(mut self, routing_key: impl Into<String>) -> Self {
        self.routing_key = Some(routing_key.into());
        self
    }

    /// Set a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: Value) -> Self {
        self.headers.insert(name.into(), value);
        self
    }

    /// Record `count` prior deliveries in the death header, as the broker
    /// does when a message returns from the retry queue.
    #[must_use]
    pub fn with_death_count(self, count: u64) -> Self {
        self.with_header(DEATH_HEADER, json!([{ "count": count }]))
    }

    /// Routing key, if the broker supplied one.
    #[must_use]
    pub fn routing_key(&self) -> Option<&str> { self.routing_key.as_deref() }

    /// Message body.
    #[must_use]
    pub fn payload(&self) -> &Bytes { &self.payload }

    /// Message headers.
    #[must_use]
    pub fn headers(&self) -> &Map<String, Value> { &self.headers }

    /// Number of prior deliveries: `x-death[0].count`, or 0.
    ///
    /// ```
    /// use errorframe::queue::QueueMessage;
    ///
    /// assert_eq!(QueueMessage::new("{}").retry_count(), 0);
    /// assert_eq!(QueueMessage::new("{}").with_death_count(2).retry_count(), 2);
    /// ```
    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.headers
            .get(DEATH_HEADER)
            .and_then(|deaths| deaths.get(0))
            .and_then(|death| death.get("count"))
            .and_then(Value::as_u64)
            .map_or(0, |count| u32::try_from(count).unwrap_or(u32::MAX))
    }
}

/// Options passed with a publish.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PublishOptions {
    /// Headers attached to the published message.
    pub headers: Map<String, Value>,
}

/// The broker channel the controller acknowledges and publishes through.
///
/// Calls are fire-and-continue; the channel's own delivery guarantees are
/// outside this crate.
#[cfg_attr(test, mockall::automock)]
pub trait BrokerChannel {
    /// Acknowledge `message`, removing it from its queue.
    fn ack(&self, message: &QueueMessage);

    /// Negatively acknowledge `message`.
    fn nack(&self, message: &QueueMessage, multiple: bool, requeue: bool);

    /// Publish `payload` to `exchange` under `routing_key`.
    fn publish(&self, exchange: &str, routing_key: &str, payload: &Bytes, options: &PublishOptions);
}
