//! Diagnostic binary for `errorframe`.
//!
//! Classifies a JSON value as a failed handler would see it, or wraps a JSON
//! result in the response envelope, and prints the outcome as JSON.

mod cli;

use clap::Parser;
use errorframe::{
    QueueError,
    RequestParts,
    SocketError,
    Thrown,
    TransportError,
    classify,
    filter::SocketExceptionHandler,
    queue::{RedeliveryDecision, decide},
    response::wrap,
};
use serde_json::{Value, json};

use crate::cli::{Cli, Command, ContextArg};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "running command");
    let output = match cli.command {
        Command::Classify {
            context,
            retries,
            max_retries,
            prefix,
            json,
        } => classify_report(
            context,
            retries,
            max_retries,
            prefix.as_deref(),
            serde_json::from_str(&json)?,
        ),
        Command::Envelope {
            json,
            path,
            request_id,
        } => {
            let mut request = RequestParts::new("GET", path);
            if let Some(id) = request_id {
                request = request.with_id(id);
            }
            wrap(serde_json::from_str(&json)?, &request)
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn classify_report(
    context: ContextArg,
    retries: u32,
    max_retries: u32,
    prefix: Option<&str>,
    value: Value,
) -> Value {
    let thrown = Thrown::from(value);
    let classified = classify(&thrown);

    let queue = QueueError::from_thrown(thrown.clone());
    let decision = match decide(queue.is_transient(), retries, max_retries) {
        RedeliveryDecision::Retry { attempt } => json!({ "action": "retry", "attempt": attempt }),
        RedeliveryDecision::DeadLetter { reason } => {
            json!({ "action": "dead_letter", "reason": reason.as_str() })
        }
    };

    let response = match context {
        ContextArg::Http => {
            let error = TransportError::from_thrown(thrown, prefix);
            json!({
                "statusCode": error.status_code(),
                "error": TransportError::NAME,
                "message": error.message(),
            })
        }
        ContextArg::Rpc => json!(queue.payload()),
        ContextArg::Ws => {
            let code = SocketExceptionHandler::code(&thrown);
            json!({ "code": code, "body": SocketError::from_thrown(thrown).body() })
        }
    };

    json!({
        "context": context.as_str(),
        "shape": classified.shape.as_str(),
        "message": classified.message,
        "statusCode": classified.status_code,
        "queue": {
            "kind": queue.kind().as_str(),
            "transient": queue.is_transient(),
            "decision": decision,
        },
        "response": response,
    })
}
