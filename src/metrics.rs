//! Metric helpers for `errorframe`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. Without the
//! `metrics` feature every helper is a no-op.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking errors handled per execution context.
pub const ERRORS_HANDLED: &str = "errorframe_errors_handled_total";
/// Name of the counter tracking redelivery decisions.
pub const REDELIVERY_DECISIONS: &str = "errorframe_redelivery_decisions_total";
/// Name of the counter tracking requests rejected by the rate limiter.
pub const RATE_LIMIT_REJECTIONS: &str = "errorframe_rate_limit_rejections_total";
/// Name of the counter tracking circuit breaker state transitions.
pub const CIRCUIT_TRANSITIONS: &str = "errorframe_circuit_transitions_total";

/// Record an error handled in the given context (`http`, `rpc` or `ws`).
pub fn inc_errors_handled(context: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(ERRORS_HANDLED, "context" => context).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = context;
}

/// Record a redelivery decision (`retry` or `dead_letter`).
pub fn inc_redelivery(decision: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(REDELIVERY_DECISIONS, "decision" => decision).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = decision;
}

/// Record a rate-limited request.
pub fn inc_rate_limited() {
    #[cfg(feature = "metrics")]
    counter!(RATE_LIMIT_REJECTIONS).increment(1);
}

/// Record a circuit breaker moving into `state`.
pub fn inc_circuit_transition(state: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(CIRCUIT_TRANSITIONS, "state" => state).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = state;
}
