//! Configuration for the redelivery controller.

/// Exchange dead-lettered messages are published to by default.
pub const DEFAULT_DEAD_LETTER_EXCHANGE: &str = "events_exchange.dlx";

/// Retries allowed after the first delivery before a transient failure is
/// dead-lettered.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Configuration for redelivery behaviour.
///
/// # Examples
///
/// ```
/// use errorframe::queue::RedeliveryConfig;
///
/// let config = RedeliveryConfig::default()
///     .dead_letter_exchange("orders.dlx")
///     .max_retries(4);
///
/// assert_eq!(config.dead_letter_exchange, "orders.dlx");
/// assert_eq!(config.max_retries, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedeliveryConfig {
    /// Exchange that receives dead-lettered messages.
    ///
    /// Default: `events_exchange.dlx`.
    pub dead_letter_exchange: String,

    /// Retries allowed for transient failures, so a message is attempted at
    /// most `max_retries + 1` times.
    ///
    /// Default: 2.
    pub max_retries: u32,
}

impl Default for RedeliveryConfig {
    fn default() -> Self {
        Self {
            dead_letter_exchange: DEFAULT_DEAD_LETTER_EXCHANGE.to_owned(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl RedeliveryConfig {
    /// Set the dead-letter exchange.
    #[must_use]
    pub fn dead_letter_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.dead_letter_exchange = exchange.into();
        self
    }

    /// Set the retry budget for transient failures.
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}
