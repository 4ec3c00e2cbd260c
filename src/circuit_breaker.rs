//! Per-key circuit breaker.
//!
//! Each key moves through `Closed -> Open -> HalfOpen -> Closed`. A closed
//! circuit opens after `failure_threshold` consecutive failures and rejects
//! calls until `reset_timeout` has passed since the last failure. The next
//! call then runs half-open: `success_threshold` successes close the
//! circuit, any failure opens it again.

use std::{future::Future, time::Duration};

use dashmap::DashMap;
use log::{error, info, warn};
use thiserror::Error;
use tokio::time::Instant;

use crate::metrics;

/// State of one circuit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through.
    #[default]
    Closed,
    /// Calls are rejected.
    Open,
    /// Calls pass through on probation.
    HalfOpen,
}

impl CircuitState {
    /// Returns the state name as a static string for logging and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::Open => "OPEN",
            Self::HalfOpen => "HALF_OPEN",
        }
    }
}

/// Configuration for [`CircuitBreaker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open a closed circuit.
    ///
    /// Default: 5.
    pub failure_threshold: u32,

    /// Successes that close a half-open circuit.
    ///
    /// Default: 2.
    pub success_threshold: u32,

    /// Time after the last failure before an open circuit admits a trial call.
    ///
    /// Default: 60 seconds.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            reset_timeout: Duration::from_secs(60),
        }
    }
}

impl CircuitBreakerConfig {
    /// Set the failure threshold.
    #[must_use]
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Set the success threshold.
    #[must_use]
    pub fn success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    /// Set the reset timeout.
    #[must_use]
    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = timeout;
        self
    }
}

/// Error returned by [`CircuitBreaker::execute`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CircuitBreakerError<E> {
    /// The circuit is open and the call was not attempted.
    #[error("Circuit breaker {key} is OPEN. Request rejected.")]
    Open {
        /// The circuit's key.
        key: String,
    },
    /// The call ran and failed.
    #[error(transparent)]
    Inner(E),
}

#[derive(Clone, Copy, Debug, Default)]
struct Circuit {
    state: CircuitState,
    failures: u32,
    successes: u32,
    last_failure: Option<Instant>,
}

/// Circuit breakers keyed by name.
///
/// # Examples
///
/// ```
/// use errorframe::circuit_breaker::{CircuitBreaker, CircuitState};
///
/// # tokio_test_block_on(async {
/// let breaker = CircuitBreaker::default();
/// let value = breaker
///     .execute("billing", || async { Ok::<_, std::io::Error>(7) })
///     .await
///     .unwrap();
/// assert_eq!(value, 7);
/// assert_eq!(breaker.state("billing"), CircuitState::Closed);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    circuits: DashMap<String, Circuit>,
}

impl CircuitBreaker {
    /// Create a breaker with the given configuration.
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            circuits: DashMap::new(),
        }
    }

    /// Current state of the circuit for `key`.
    #[must_use]
    pub fn state(&self, key: &str) -> CircuitState {
        self.circuits
            .get(key)
            .map_or(CircuitState::Closed, |circuit| circuit.state)
    }

    /// Forget everything recorded for `key`.
    pub fn reset(&self, key: &str) {
        self.circuits.remove(key);
        info!("Circuit breaker {key} reset");
    }

    /// Run `call` under the circuit for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CircuitBreakerError::Open`] without running `call` while the
    /// circuit is open, or [`CircuitBreakerError::Inner`] when `call` fails.
    pub async fn execute<T, E, F, Fut>(
        &self,
        key: &str,
        call: F,
    ) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.admit(key)?;
        match call().await {
            Ok(value) => {
                self.record_success(key);
                Ok(value)
            }
            Err(error) => {
                self.record_failure(key);
                Err(CircuitBreakerError::Inner(error))
            }
        }
    }

    fn admit<E>(&self, key: &str) -> Result<(), CircuitBreakerError<E>> {
        let mut circuit = self.circuits.entry(key.to_owned()).or_default();
        if circuit.state != CircuitState::Open {
            return Ok(());
        }
        let cooled = circuit
            .last_failure
            .is_none_or(|at| at.elapsed() >= self.config.reset_timeout);
        if !cooled {
            return Err(CircuitBreakerError::Open {
                key: key.to_owned(),
            });
        }
        circuit.state = CircuitState::HalfOpen;
        circuit.successes = 0;
        metrics::inc_circuit_transition(CircuitState::HalfOpen.as_str());
        warn!("Circuit breaker {key} transitioned to HALF_OPEN");
        Ok(())
    }

    fn record_success(&self, key: &str) {
        let mut circuit = self.circuits.entry(key.to_owned()).or_default();
        match circuit.state {
            CircuitState::HalfOpen => {
                circuit.successes += 1;
                if circuit.successes >= self.config.success_threshold {
                    *circuit = Circuit::default();
                    metrics::inc_circuit_transition(CircuitState::Closed.as_str());
                    info!("Circuit breaker {key} closed");
                }
            }
            CircuitState::Closed => circuit.failures = 0,
            CircuitState::Open => {}
        }
    }

    fn record_failure(&self, key: &str) {
        let mut circuit = self.circuits.entry(key.to_owned()).or_default();
        circuit.failures += 1;
        circuit.last_failure = Some(Instant::now());
        let trips = circuit.state == CircuitState::HalfOpen
            || circuit.failures >= self.config.failure_threshold;
        if trips && circuit.state != CircuitState::Open {
            circuit.state = CircuitState::Open;
            metrics::inc_circuit_transition(CircuitState::Open.as_str());
            error!(
                "Circuit breaker {key} opened due to {} failures",
                circuit.failures
            );
        }
    }
}
