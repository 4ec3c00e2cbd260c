//! Tests for Display implementations on error types.

use errorframe::{
    NativeError,
    QueueError,
    QueueErrorKind,
    SocketError,
    Thrown,
    TransportError,
    circuit_breaker::CircuitBreakerError,
    env::MissingEnvVars,
    error::UnknownQueueErrorKind,
    file::FileValidationError,
    guard::RateLimitExceeded,
    json_rpc::{JsonRpcError, JsonRpcErrorCode},
};
use serde_json::json;

#[test]
fn typed_errors_display_their_message() {
    assert_eq!(TransportError::new("boom").to_string(), "boom");
    assert_eq!(
        QueueError::from_kind("late", QueueErrorKind::RpcTimeout).to_string(),
        "late"
    );
    assert_eq!(SocketError::new("closed").to_string(), "closed");
}

#[test]
fn thrown_displays_classified_message() {
    assert_eq!(Thrown::from(NativeError::new("plain")).to_string(), "plain");
    assert_eq!(Thrown::from(json!({ "a": 1 })).to_string(), r#"{"a":1}"#);
    assert_eq!(Thrown::from(json!(null)).to_string(), "null");
}

#[test]
fn toolkit_error_messages() {
    assert_eq!(
        UnknownQueueErrorKind("NOPE".into()).to_string(),
        "unknown queue error kind: NOPE"
    );
    assert_eq!(
        MissingEnvVars {
            keys: vec!["A".into(), "B".into()],
        }
        .to_string(),
        "Missing env vars: A, B"
    );
    assert_eq!(
        FileValidationError::Invalid(vec!["x".into(), "y".into()]).to_string(),
        "File validation failed: x; y"
    );
    assert_eq!(
        RateLimitExceeded { retry_after: 3 }.to_string(),
        "Too many requests, please try again later"
    );
    assert_eq!(
        CircuitBreakerError::<std::io::Error>::Open { key: "db".into() }.to_string(),
        "Circuit breaker db is OPEN. Request rejected."
    );
    assert_eq!(
        JsonRpcError::new(JsonRpcErrorCode::ParseError).to_string(),
        "Parse error"
    );
}

#[test]
fn inner_circuit_errors_are_transparent() {
    let inner = std::io::Error::new(std::io::ErrorKind::TimedOut, "took too long");
    let error = CircuitBreakerError::Inner(inner);
    assert_eq!(error.to_string(), "took too long");
}
