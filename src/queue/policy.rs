//! The pure retry/dead-letter decision.

/// Why a message was dead-lettered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeadLetterReason {
    /// The failure cannot be fixed by retrying.
    Permanent,
    /// The failure was transient but the retry budget is spent.
    RetriesExhausted,
}

impl DeadLetterReason {
    /// Returns the reason as a static string for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Permanent => "permanent",
            Self::RetriesExhausted => "retries_exhausted",
        }
    }
}

/// What to do with a message whose processing failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedeliveryDecision {
    /// Nack without requeue so the broker's retry queue redelivers it.
    Retry {
        /// One-based number of the retry being scheduled.
        attempt: u32,
    },
    /// Publish to the dead-letter exchange, then ack.
    DeadLetter {
        /// Why retrying was ruled out.
        reason: DeadLetterReason,
    },
}

impl RedeliveryDecision {
    /// Returns the decision name as a static string for logging and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Retry { .. } => "retry",
            Self::DeadLetter { .. } => "dead_letter",
        }
    }
}

/// Decide the fate of a failed message.
///
/// Permanent failures are dead-lettered regardless of `retries`. Transient
/// failures are retried while `retries < max_retries`.
///
/// ```
/// use errorframe::queue::{DeadLetterReason, RedeliveryDecision, decide};
///
/// assert_eq!(decide(true, 0, 2), RedeliveryDecision::Retry { attempt: 1 });
/// assert_eq!(
///     decide(true, 2, 2),
///     RedeliveryDecision::DeadLetter { reason: DeadLetterReason::RetriesExhausted }
/// );
/// assert_eq!(
///     decide(false, 0, 2),
///     RedeliveryDecision::DeadLetter { reason: DeadLetterReason::Permanent }
/// );
/// ```
#[must_use]
pub const fn decide(is_transient: bool, retries: u32, max_retries: u32) -> RedeliveryDecision {
    if !is_transient {
        RedeliveryDecision::DeadLetter {
            reason: DeadLetterReason::Permanent,
        }
    } else if retries < max_retries {
        RedeliveryDecision::Retry {
            attempt: retries.saturating_add(1),
        }
    } else {
        RedeliveryDecision::DeadLetter {
            reason: DeadLetterReason::RetriesExhausted,
        }
    }
}
