//! In-memory doubles for the transports errorframe writes to.

use std::sync::Mutex;

use bytes::Bytes;
use errorframe::{
    context::{HttpResponder, SocketClient},
    filter::{HttpErrorBody, SocketErrorEvent},
    queue::{BrokerChannel, PublishOptions, QueueMessage},
};
use serde_json::{Map, Value};

/// One call made on a [`RecordingChannel`].
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelCall {
    /// `ack(message)`.
    Ack,
    /// `nack(message, multiple, requeue)`.
    Nack {
        /// Whether earlier deliveries were included.
        multiple: bool,
        /// Whether the broker should requeue.
        requeue: bool,
    },
    /// `publish(exchange, routing_key, payload, options)`.
    Publish {
        /// Target exchange.
        exchange: String,
        /// Routing key used.
        routing_key: String,
        /// Published bytes.
        payload: Bytes,
        /// Published headers.
        headers: Map<String, Value>,
    },
}

/// A [`BrokerChannel`] that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    calls: Mutex<Vec<ChannelCall>>,
}

impl RecordingChannel {
    /// Create an empty channel.
    pub fn new() -> Self { Self::default() }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<ChannelCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: ChannelCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl BrokerChannel for RecordingChannel {
    fn ack(&self, _message: &QueueMessage) { self.record(ChannelCall::Ack); }

    fn nack(&self, _message: &QueueMessage, multiple: bool, requeue: bool) {
        self.record(ChannelCall::Nack { multiple, requeue });
    }

    fn publish(&self, exchange: &str, routing_key: &str, payload: &Bytes, options: &PublishOptions) {
        self.record(ChannelCall::Publish {
            exchange: exchange.to_owned(),
            routing_key: routing_key.to_owned(),
            payload: payload.clone(),
            headers: options.headers.clone(),
        });
    }
}

/// An [`HttpResponder`] that keeps every response it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingResponder {
    /// Responses as `(status, body)`.
    pub sent: Vec<(u16, HttpErrorBody)>,
}

impl HttpResponder for RecordingResponder {
    fn send(&mut self, status: u16, body: &HttpErrorBody) { self.sent.push((status, body.clone())); }
}

/// A [`SocketClient`] that keeps every event it is asked to emit.
#[derive(Debug, Default)]
pub struct RecordingSocket {
    /// Connection identifier reported to loggers.
    pub id: Option<String>,
    /// Events as `(name, payload)`.
    pub emitted: Vec<(String, SocketErrorEvent)>,
}

impl RecordingSocket {
    /// A socket reporting `id` as its connection identifier.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }
}

impl SocketClient for RecordingSocket {
    fn emit(&mut self, event: &str, payload: &SocketErrorEvent) {
        self.emitted.push((event.to_owned(), payload.clone()));
    }

    fn id(&self) -> Option<&str> { self.id.as_deref() }
}
