//! Tests for the classifier.

use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::{
    error::{QueueError, QueueErrorKind, SocketError, TransportError},
    thrown::{BrokerException, NativeError},
};

fn classify_value(value: Value) -> Classified { classify(&Thrown::from(value)) }

#[test]
fn typed_errors_are_read_directly() {
    let transport = classify(&Thrown::from(TransportError::new("denied").with_status(403)));
    assert_eq!(transport.message, "denied");
    assert_eq!(transport.status_code, Some(403));
    assert_eq!(transport.shape, WireShape::Typed);

    let queue = classify(&Thrown::from(QueueError::from_kind(
        "gone",
        QueueErrorKind::NotFound,
    )));
    assert_eq!(queue.status_code, Some(404));

    let socket = classify(&Thrown::from(SocketError::new("closed")));
    assert_eq!(socket.message, "closed");
    assert_eq!(socket.status_code, Some(500));
}

#[test]
fn broker_string_payload_has_no_status() {
    let classified = classify(&Thrown::from(BrokerException::new("queue is down")));
    assert_eq!(classified.message, "queue is down");
    assert_eq!(classified.status_code, None);
    assert_eq!(classified.shape, WireShape::Broker);
    assert_eq!(classified.status_or_default(), 500);
}

#[test]
fn broker_object_payload_yields_message_and_status() {
    let payload = json!({ "message": "no such order", "kind": "NOT_FOUND", "statusCode": 404 });
    let classified = classify(&Thrown::from(BrokerException::new(payload)));
    assert_eq!(classified.message, "no such order");
    assert_eq!(classified.status_code, Some(404));
}

#[test]
fn wire_queue_error_round_trips() {
    let original = QueueError::from_kind("user not found", QueueErrorKind::NotFound);
    let wire = serde_json::to_value(original.payload()).expect("payload should serialize");

    let classified = classify_value(wire);
    assert_eq!(classified.message, original.message());
    assert_eq!(classified.status_code, Some(404));
    assert_eq!(classified.shape, WireShape::WireQueueError);
}

#[rstest]
#[case(json!(200))]
#[case(json!(399))]
#[case(json!("404"))]
#[case(json!(null))]
#[case(json!(404.5))]
#[case(json!(399.0))]
#[case(json!(1.0e9))]
fn wire_queue_error_distrusts_invalid_status(#[case] status: Value) {
    let classified = classify_value(json!({
        "message": "odd",
        "kind": "BAD_REQUEST",
        "statusCode": status
    }));
    assert_eq!(classified.status_code, Some(500));
}

#[rstest]
#[case(json!(404.0), 404)]
#[case(json!(503.0), 503)]
fn whole_float_status_is_accepted(#[case] status: Value, #[case] expected: u16) {
    let classified = classify_value(json!({
        "message": "from a float peer",
        "kind": "NOT_FOUND",
        "statusCode": status
    }));
    assert_eq!(classified.status_code, Some(expected));

    let opaque = classify_value(json!({ "message": "plain", "statusCode": status }));
    assert_eq!(opaque.status_code, Some(expected));
}

#[test]
fn wire_queue_error_without_message_uses_fallback() {
    let classified = classify_value(json!({
        "message": null,
        "errorType": "RPC_TIMEOUT",
        "statusCode": 504
    }));
    assert_eq!(classified.message, RPC_FALLBACK_MESSAGE);
    assert_eq!(classified.status_code, Some(504));
}

#[test]
fn wire_queue_error_nested_in_message_field() {
    let classified = classify_value(json!({
        "message": { "message": "too slow", "kind": "RPC_TIMEOUT", "statusCode": 408 }
    }));
    assert_eq!(classified.message, "too slow");
    assert_eq!(classified.status_code, Some(408));
    assert_eq!(classified.shape, WireShape::WireQueueError);
}

#[test]
fn alt_wire_error_prefers_data_message() {
    let classified = classify_value(json!({
        "status": "error",
        "message": "Internal server error",
        "data": { "message": "Email already taken", "statusCode": 409 }
    }));
    assert_eq!(classified.message, "Email already taken");
    assert_eq!(classified.status_code, Some(409));
    assert_eq!(classified.shape, WireShape::AltWireError);
}

#[test]
fn alt_wire_error_without_data() {
    let classified = classify_value(json!({ "status": "error", "message": "broken" }));
    assert_eq!(classified.message, "broken");
    assert_eq!(classified.status_code, Some(500));
}

#[test]
fn http_exception_joins_message_arrays() {
    let exception = HttpException::new(
        400,
        json!({ "message": ["name must not be empty", "age must be positive"] }),
    );
    let classified = classify(&Thrown::from(exception));
    assert_eq!(
        classified.message,
        "name must not be empty; age must be positive"
    );
    assert_eq!(classified.status_code, Some(400));
    assert_eq!(classified.shape, WireShape::HttpException);
}

#[test]
fn http_exception_with_string_body() {
    let classified = classify(&Thrown::from(HttpException::new(403, "Forbidden")));
    assert_eq!(classified.message, "Forbidden");
    assert_eq!(classified.status_code, Some(403));
}

#[test]
fn native_error_message_is_verbatim() {
    let classified = classify(&Thrown::from(NativeError::new("  spaced out  ")));
    assert_eq!(classified.message, "  spaced out  ");
    assert_eq!(classified.status_code, None);
    assert_eq!(classified.shape, WireShape::Native);
}

#[rstest]
#[case(json!({ "error": { "message": "nested", "statusCode": 422 } }), "nested", Some(422))]
#[case(json!({ "error": "flat", "statusCode": 404 }), "flat", Some(404))]
#[case(json!({ "message": "top", "statusCode": 200 }), "top", None)]
#[case(json!({ "unrelated": true }), r#"{"unrelated":true}"#, None)]
#[case(json!(["a", 1]), r#"["a",1]"#, None)]
#[case(json!("just text"), "just text", None)]
#[case(json!(null), "null", None)]
#[case(json!(false), "false", None)]
fn opaque_values(
    #[case] value: Value,
    #[case] message: &str,
    #[case] status: Option<u16>,
) {
    let classified = classify_value(value);
    assert_eq!(classified.message, message);
    assert_eq!(classified.status_code, status);
    assert_eq!(classified.shape, WireShape::Opaque);
}

#[test]
fn prefix_is_prepended() {
    let classified =
        classify(&Thrown::from(NativeError::new("boom"))).with_prefix(Some("Import failed"));
    assert_eq!(classified.message, "Import failed: boom");

    let unchanged = classify(&Thrown::from(NativeError::new("boom"))).with_prefix(None);
    assert_eq!(unchanged.message, "boom");
}

#[rstest]
#[case(json!({ "data": { "code": "FROM_DATA" }, "code": "TOP" }), Some("FROM_DATA"))]
#[case(json!({ "response": { "data": { "code": "DEEP" } }, "code": "TOP" }), Some("DEEP"))]
#[case(json!({ "response": { "code": "RESP" } }), Some("RESP"))]
#[case(json!({ "code": "ECONNREFUSED" }), Some("ECONNREFUSED"))]
#[case(json!({ "message": { "code": "USER_NOT_FOUND" } }), Some("USER_NOT_FOUND"))]
#[case(json!({ "code": 42 }), None)]
#[case(json!("no code"), None)]
fn finds_codes_on_plain_values(#[case] value: Value, #[case] expected: Option<&str>) {
    assert_eq!(extract_code(&Thrown::from(value)).as_deref(), expected);
}

#[test]
fn finds_codes_on_errors() {
    let native = NativeError::new("refused").with_code("ECONNREFUSED");
    assert_eq!(
        extract_code(&Thrown::from(native)).as_deref(),
        Some("ECONNREFUSED")
    );

    let http = HttpException::new(409, json!({ "code": "DUPLICATE", "message": "exists" }));
    assert_eq!(extract_code(&Thrown::from(http)).as_deref(), Some("DUPLICATE"));

    let broker = BrokerException::new(json!({ "data": { "code": "RPC_CODE" } }));
    assert_eq!(extract_code(&Thrown::from(broker)).as_deref(), Some("RPC_CODE"));

    let typed = TransportError::new("typed");
    assert_eq!(extract_code(&Thrown::from(typed)), None);
}

#[rstest]
#[case(json!("plain"), Some("plain"))]
#[case(json!(["one", "", "two"]), Some("one; two"))]
#[case(json!({ "message": "inner" }), Some("inner"))]
#[case(json!({ "message": { "message": "deeper" } }), Some("deeper"))]
#[case(json!({ "other": 1 }), Some(r#"{"other":1}"#))]
#[case(json!(7), Some("7"))]
#[case(json!(null), None)]
fn normalizes_messages(#[case] value: Value, #[case] expected: Option<&str>) {
    assert_eq!(normalize_message(&value).as_deref(), expected);
}

#[rstest]
#[case(json!(0), false)]
#[case(json!(""), false)]
#[case(json!(null), false)]
#[case(json!(false), false)]
#[case(json!(1), true)]
#[case(json!("x"), true)]
#[case(json!([]), true)]
#[case(json!({}), true)]
fn truthiness_matches_wire_conventions(#[case] value: Value, #[case] expected: bool) {
    assert_eq!(extract::truthy(&value), expected);
}
