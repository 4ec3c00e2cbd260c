#![cfg(feature = "metrics")]
//! Tests for `errorframe` metrics helpers and the components that record
//! them.
//!
//! Counters are captured with `metrics_util::debugging::DebuggingRecorder`.

use std::time::Duration;

use bytes::Bytes;
use errorframe::{
    ExceptionDispatcher,
    QueueError,
    QueueErrorKind,
    QueueMessage,
    Thrown,
    circuit_breaker::{CircuitBreaker, CircuitBreakerConfig},
    context::QueueExecution,
    guard::{RateLimitConfig, RateLimitKey, RateLimiter},
    metrics::{
        CIRCUIT_TRANSITIONS,
        ERRORS_HANDLED,
        RATE_LIMIT_REJECTIONS,
        REDELIVERY_DECISIONS,
        inc_errors_handled,
    },
};
use errorframe_testing::RecordingChannel;
use metrics::{SharedString, Unit};
use metrics_util::{
    CompositeKey,
    debugging::{DebugValue, DebuggingRecorder, Snapshotter},
};
use rstest::rstest;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

type Snapshot = Vec<(CompositeKey, Option<Unit>, Option<SharedString>, DebugValue)>;

/// Take one snapshot; reading a snapshot drains the recorded counters.
fn snapshot(snapshotter: &Snapshotter) -> Snapshot { snapshotter.snapshot().into_vec() }

fn counter(metrics: &Snapshot, name: &str, label: Option<(&str, &str)>) -> u64 {
    metrics
        .iter()
        .filter(|(key, _, _, _)| {
            key.key().name() == name
                && label.is_none_or(|(k, v)| {
                    key.key().labels().any(|l| l.key() == k && l.value() == v)
                })
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(count) => *count,
            _ => 0,
        })
        .sum()
}

#[rstest]
#[case("http")]
#[case("ws")]
fn handled_errors_are_labelled_by_context(#[case] context: &'static str) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || inc_errors_handled(context));
    let metrics = snapshot(&snapshotter);
    assert_eq!(counter(&metrics, ERRORS_HANDLED, Some(("context", context))), 1);
}

#[test]
fn queue_dispatch_records_context_and_decision() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let channel = RecordingChannel::new();
    let message = QueueMessage::new(Bytes::from_static(b"{}")).with_death_count(0);

    metrics::with_local_recorder(&recorder, || {
        let transient = Thrown::from(QueueError::from_kind("timeout", QueueErrorKind::RpcTimeout));
        let permanent = Thrown::from(QueueError::from_kind("nope", QueueErrorKind::NotFound));
        let dispatcher = ExceptionDispatcher::default();
        for thrown in [transient, permanent] {
            let mut ctx = QueueExecution::new(&channel, &message).with_pattern("jobs.run");
            let _ = dispatcher.dispatch(thrown, &mut ctx);
        }
    });

    let metrics = snapshot(&snapshotter);
    assert_eq!(counter(&metrics, ERRORS_HANDLED, Some(("context", "rpc"))), 2);
    assert_eq!(counter(&metrics, REDELIVERY_DECISIONS, Some(("decision", "retry"))), 1);
    assert_eq!(
        counter(&metrics, REDELIVERY_DECISIONS, Some(("decision", "dead_letter"))),
        1
    );
}

#[test]
fn rate_limit_rejections_are_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let limiter = RateLimiter::new(RateLimitConfig::default().max_requests(1));
    let key = RateLimitKey {
        identity: "10.0.0.9".into(),
        resource: "/".into(),
    };

    metrics::with_local_recorder(&recorder, || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime");
        runtime.block_on(async {
            assert!(limiter.acquire(key.clone(), 1).is_ok());
            assert!(limiter.acquire(key.clone(), 1).is_err());
            assert!(limiter.acquire(key.clone(), 1).is_err());
        });
    });

    assert_eq!(counter(&snapshot(&snapshotter), RATE_LIMIT_REJECTIONS, None), 2);
}

#[test]
fn circuit_transitions_are_labelled_by_state() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let breaker = CircuitBreaker::new(
        CircuitBreakerConfig::default()
            .failure_threshold(1)
            .success_threshold(1)
            .reset_timeout(Duration::ZERO),
    );

    metrics::with_local_recorder(&recorder, || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime");
        runtime.block_on(async {
            let _ = breaker.execute("svc", || async { Err::<(), _>(std::fmt::Error) }).await;
            let _ = breaker.execute("svc", || async { Ok::<_, std::fmt::Error>(()) }).await;
        });
    });

    let metrics = snapshot(&snapshotter);
    for state in ["OPEN", "HALF_OPEN", "CLOSED"] {
        assert_eq!(
            counter(&metrics, CIRCUIT_TRANSITIONS, Some(("state", state))),
            1,
            "state {state}"
        );
    }
}
