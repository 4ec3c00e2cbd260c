//! Tests for JSON-RPC error mapping.

use rstest::rstest;
use serde_json::json;

use super::*;
use crate::error::{QueueError, QueueErrorKind};

#[rstest]
#[case(401, JsonRpcErrorCode::Unauthorized)]
#[case(403, JsonRpcErrorCode::Forbidden)]
#[case(404, JsonRpcErrorCode::NotFound)]
#[case(429, JsonRpcErrorCode::TooManyRequests)]
#[case(500, JsonRpcErrorCode::ServerError)]
#[case(502, JsonRpcErrorCode::BadGateway)]
#[case(503, JsonRpcErrorCode::ServiceUnavailable)]
#[case(504, JsonRpcErrorCode::GatewayTimeout)]
#[case(507, JsonRpcErrorCode::ServerError)]
#[case(400, JsonRpcErrorCode::InternalError)]
#[case(418, JsonRpcErrorCode::InternalError)]
#[case(200, JsonRpcErrorCode::InternalError)]
fn http_status_to_code(#[case] status: u16, #[case] code: JsonRpcErrorCode) {
    assert_eq!(JsonRpcErrorCode::from_http_status(status), code);
}

#[rstest]
#[case(JsonRpcErrorCode::ParseError, 400)]
#[case(JsonRpcErrorCode::InvalidRequest, 400)]
#[case(JsonRpcErrorCode::InvalidParams, 400)]
#[case(JsonRpcErrorCode::MethodNotFound, 404)]
#[case(JsonRpcErrorCode::InternalError, 500)]
#[case(JsonRpcErrorCode::ServerError, 500)]
#[case(JsonRpcErrorCode::ServiceUnavailable, 503)]
fn code_to_http_status(#[case] code: JsonRpcErrorCode, #[case] status: u16) {
    assert_eq!(code.http_status(), status);
}

#[rstest]
fn codes_serialize_as_integers() {
    assert_eq!(json!(JsonRpcErrorCode::ParseError), json!(-32700));
    let code: JsonRpcErrorCode = serde_json::from_value(json!(-32004)).expect("known code");
    assert_eq!(code, JsonRpcErrorCode::TooManyRequests);
    assert!(serde_json::from_value::<JsonRpcErrorCode>(json!(-1)).is_err());
}

#[rstest]
fn empty_message_keeps_default() {
    let error = JsonRpcError::new(JsonRpcErrorCode::InvalidParams).with_message("");
    assert_eq!(error.message(), "Invalid params");
}

#[rstest]
fn from_transport_maps_status_and_records_request_id() {
    let transport = TransportError::new("no such user").with_status(404);
    let error = JsonRpcError::from_transport(&transport, json!(7));
    assert_eq!(error.code(), JsonRpcErrorCode::NotFound);
    assert_eq!(error.http_status(), 404);
    assert_eq!(
        error.body(),
        json!({
            "jsonrpc": "2.0",
            "error": { "code": -32003, "message": "no such user", "data": { "requestId": 7 } }
        })
    );
}

#[rstest]
fn from_native_is_internal() {
    let native = NativeError::named("TypeError", "x is undefined");
    let error = JsonRpcError::from_native(&native, Value::Null);
    assert_eq!(error.code(), JsonRpcErrorCode::InternalError);
    assert_eq!(error.data(), Some(&json!({ "requestId": null, "name": "TypeError" })));
}

#[rstest]
fn raised_error_is_rendered_as_is() {
    let raised = JsonRpcError::new(JsonRpcErrorCode::MethodNotFound)
        .with_message("tools/run is not registered")
        .with_data(json!({ "method": "tools/run" }));
    let (status, response) = JsonRpcErrorFilter.render(&Thrown::from(raised), json!("req-1"));
    assert_eq!(status, 404);
    assert_eq!(
        json!(response),
        json!({
            "jsonrpc": "2.0",
            "id": "req-1",
            "error": {
                "code": -32601,
                "message": "tools/run is not registered",
                "data": { "method": "tools/run" }
            }
        })
    );
}

#[rstest]
fn typed_error_status_picks_code() {
    let thrown = Thrown::from(QueueError::from_kind("slow down", QueueErrorKind::TooManyRequests));
    let (status, response) = JsonRpcErrorFilter.render(&thrown, json!(1));
    assert_eq!(status, 429);
    assert_eq!(response.error.code, JsonRpcErrorCode::TooManyRequests);
    assert_eq!(response.error.message, "slow down");
    assert_eq!(
        response.error.data,
        Some(json!({ "name": "TOO_MANY_REQUESTS", "originalError": "QueueError" }))
    );
}

#[rstest]
fn native_error_is_internal() {
    let thrown = Thrown::from(NativeError::named("RangeError", "index out of range"));
    let (status, response) = JsonRpcErrorFilter.render(&thrown, Value::Null);
    assert_eq!(status, 500);
    assert_eq!(response.error.code, JsonRpcErrorCode::InternalError);
    assert_eq!(response.error.message, "index out of range");
    assert_eq!(
        response.error.data,
        Some(json!({ "name": "INTERNAL_ERROR", "originalError": "RangeError" }))
    );
}

#[rstest]
fn plain_value_gets_default_message() {
    let (status, response) = JsonRpcErrorFilter.render(&Thrown::from(json!("boom")), json!(3));
    assert_eq!(status, 500);
    assert_eq!(response.error.message, "Internal error");
    assert_eq!(response.error.data, Some(json!({ "name": "INTERNAL_ERROR" })));
}

#[rstest]
fn non_rpc_http_exception_is_not_recovered() {
    let exception = HttpException::new(400, json!({ "message": "bad" }));
    assert_eq!(JsonRpcError::from_http_exception(&exception), None);
    let (status, response) = JsonRpcErrorFilter.render(&Thrown::Http(exception), json!(1));
    assert_eq!(status, 400);
    assert_eq!(response.error.code, JsonRpcErrorCode::InternalError);
    assert_eq!(response.error.message, "bad");
}
