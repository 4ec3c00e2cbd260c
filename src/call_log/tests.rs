//! Tests for per-context call logging.

use std::time::Duration;

use errorframe_testing::{LoggerHandle, logger};
use log::Level;
use rstest::rstest;
use serde_json::json;

use super::*;
use crate::{
    context::{HttpExecution, HttpResponder, QueueExecution, SocketClient, SocketExecution},
    filter::{HttpErrorBody, SocketErrorEvent},
    queue::{MockBrokerChannel, QueueMessage},
    thrown::NativeError,
};

struct NullResponder;

impl HttpResponder for NullResponder {
    fn send(&mut self, _status: u16, _body: &HttpErrorBody) {}
}

struct Client(Option<&'static str>);

impl SocketClient for Client {
    fn emit(&mut self, _event: &str, _payload: &SocketErrorEvent) {}

    fn id(&self) -> Option<&str> { self.0 }
}

struct Cron;

impl ExecutionContext for Cron {
    fn kind(&self) -> ContextKind { ContextKind::Other("cron".into()) }
}

/// Captured lines written by the `prefix` transport's logger.
fn lines(log: &mut LoggerHandle, prefix: &str) -> Vec<(Level, String)> {
    log.drain()
        .into_iter()
        .filter(|(_, line)| line.starts_with(prefix))
        .collect()
}

async fn slow<T>(outcome: Result<T, Thrown>) -> Result<T, Thrown> {
    tokio::time::sleep(Duration::from_millis(25)).await;
    outcome
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn rpc_calls_log_pattern_and_duration() {
    let mut log = logger();
    let channel = MockBrokerChannel::new();
    let message = QueueMessage::new("{}");
    let mut context = QueueExecution::new(&channel, &message).with_pattern("orders.create");

    let outcome = CallLogger.intercept(&mut context, slow(Ok::<_, Thrown>("done"))).await;
    assert_eq!(outcome, Ok("done"));

    assert_eq!(
        lines(&mut log, "[RPC]"),
        vec![
            (Level::Info, "[RPC] Incoming request [pattern: orders.create]".to_owned()),
            (
                Level::Info,
                "[RPC] Request completed [pattern: orders.create, duration: 25ms]".to_owned()
            ),
        ]
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn rpc_failures_are_logged_and_returned_unchanged() {
    let mut log = logger();
    let channel = MockBrokerChannel::new();
    let message = QueueMessage::new("{}");
    let mut context = QueueExecution::new(&channel, &message);
    let thrown = Thrown::from(NativeError::new("billing offline"));

    let outcome = CallLogger
        .intercept(&mut context, slow::<()>(Err(thrown.clone())))
        .await;
    assert_eq!(outcome, Err(thrown));

    let records = lines(&mut log, "[RPC]");
    assert_eq!(
        records.last(),
        Some(&(
            Level::Error,
            "[RPC] Request failed [pattern: unknown, duration: 25ms, error: billing offline]"
                .to_owned()
        ))
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn socket_events_log_pattern_and_client() {
    let mut log = logger();
    let mut client = Client(Some("c-42"));
    let mut context = SocketExecution::new(&mut client).with_pattern("chat.send");

    CallLogger
        .intercept(&mut context, slow(Ok::<_, Thrown>(())))
        .await
        .expect("event succeeds");

    assert_eq!(
        lines(&mut log, "[WS]"),
        vec![
            (
                Level::Info,
                "[WS] Incoming event [pattern: chat.send] from client [c-42]".to_owned()
            ),
            (
                Level::Info,
                "[WS] Event completed [pattern: chat.send, client: c-42, duration: 25ms]".to_owned()
            ),
        ]
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn socket_failures_log_client_facing_message() {
    let mut log = logger();
    let mut client = Client(None);
    let mut context = SocketExecution::new(&mut client);
    let thrown = Thrown::from(json!({ "reason": 1 }));

    let outcome = CallLogger.intercept(&mut context, async { Err::<(), _>(thrown) }).await;
    assert!(outcome.is_err());

    let records = lines(&mut log, "[WS]");
    assert_eq!(
        records.first().map(|(_, line)| line.as_str()),
        Some("[WS] Incoming event [pattern: unknown] from client [unknown]")
    );
    assert_eq!(
        records.last(),
        Some(&(
            Level::Error,
            r#"[WS] Event failed [pattern: unknown, client: unknown, duration: 0ms] - {"reason":1}"#
                .to_owned()
        ))
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn http_calls_log_default_status() {
    let mut log = logger();
    let request = RequestParts::new("GET", "/users/7").with_ip("10.0.0.4");
    let mut responder = NullResponder;
    let mut context = HttpExecution::new(&request, &mut responder);

    CallLogger
        .intercept(&mut context, slow(Ok::<_, Thrown>(())))
        .await
        .expect("request succeeds");

    assert_eq!(
        lines(&mut log, "[HTTP]"),
        vec![
            (
                Level::Info,
                "[HTTP] Incoming request [GET /users/7] from 10.0.0.4 (unknown)".to_owned()
            ),
            (Level::Info, "[HTTP] Request completed [GET /users/7] 200 25ms".to_owned()),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn other_contexts_are_not_logged() {
    let mut log = logger();
    let outcome = CallLogger.intercept(&mut Cron, async { Ok::<_, Thrown>(1) }).await;
    assert_eq!(outcome, Ok(1));
    assert!(lines(&mut log, "[").is_empty());
}
