//! Call logging in front of the dispatcher, using the recording doubles.

use bytes::Bytes;
use errorframe::{
    ExceptionDispatcher,
    QueueMessage,
    Rethrow,
    Thrown,
    TransportError,
    call_log::CallLogger,
    context::{QueueExecution, SocketExecution},
    filter::EXCEPTION_EVENT,
    guard::{SocketAuthGuard, SocketHandshake, TOKEN_INVALID},
};
use errorframe_testing::{ChannelCall, LoggerHandle, RecordingChannel, RecordingSocket, logger};
use log::Level;
use rstest::rstest;
use serde_json::json;

fn lines(log: &mut LoggerHandle, prefix: &str) -> Vec<(Level, String)> {
    log.drain()
        .into_iter()
        .filter(|(_, line)| line.starts_with(prefix))
        .collect()
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn rejected_socket_handshake_is_logged_then_emitted() {
    let mut log = logger();
    let mut socket = RecordingSocket::with_id("c-7");
    let mut ctx = SocketExecution::new(&mut socket).with_pattern("chat.join");
    let guard = SocketAuthGuard::default().with_validator(|token: &str| token == "t-1");
    let handshake = SocketHandshake::new(json!({ "room": 3 }), json!({ "token": "t-0" }));

    let outcome = CallLogger
        .intercept(&mut ctx, async { guard.check(&handshake) })
        .await;
    let Err(thrown) = outcome else {
        panic!("forged token must be rejected");
    };
    assert_eq!(ExceptionDispatcher::default().dispatch(thrown, &mut ctx), Ok(()));

    assert_eq!(
        lines(&mut log, "[WS]"),
        vec![
            (
                Level::Info,
                "[WS] Incoming event [pattern: chat.join] from client [c-7]".to_owned()
            ),
            (
                Level::Error,
                format!(
                    "[WS] Event failed [pattern: chat.join, client: c-7, duration: 0ms] - \
                     {TOKEN_INVALID}"
                )
            ),
        ]
    );
    let [(event, payload)] = socket.emitted.as_slice() else {
        panic!("expected one event");
    };
    assert_eq!(event, EXCEPTION_EVENT);
    assert_eq!(payload.code, "WS_EXCEPTION");
    assert_eq!(payload.message, TOKEN_INVALID);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn failed_rpc_is_logged_before_dead_lettering() {
    let mut log = logger();
    let channel = RecordingChannel::new();
    let message = QueueMessage::new(Bytes::from_static(b"{}")).with_routing_key("orders.create");
    let mut ctx = QueueExecution::new(&channel, &message).with_pattern("orders.create");

    let outcome = CallLogger
        .intercept(&mut ctx, async {
            Err::<(), _>(Thrown::from(TransportError::new("Validation error: qty")))
        })
        .await;
    let Err(thrown) = outcome else {
        panic!("handler must fail");
    };
    let result = ExceptionDispatcher::default().dispatch(thrown, &mut ctx);

    assert!(matches!(result, Err(Rethrow::DeadLettered(_))), "{result:?}");
    assert_eq!(channel.calls().last(), Some(&ChannelCall::Ack));
    let records = lines(&mut log, "[RPC]");
    assert_eq!(
        records.last(),
        Some(&(
            Level::Error,
            "[RPC] Request failed [pattern: orders.create, duration: 0ms, error: Validation \
             error: qty]"
                .to_owned()
        ))
    );
}
