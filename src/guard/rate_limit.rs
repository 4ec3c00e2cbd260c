//! Fixed-window rate limiting keyed by client and resource.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use log::debug;
use serde_json::json;
use thiserror::Error;
use tokio::{task::JoinHandle, time::Instant};
use tokio_util::sync::CancellationToken;

use super::{Guard, RouteOptions};
use crate::{
    metrics,
    request::RequestParts,
    thrown::{HttpException, Thrown},
};

/// Message sent with rejected requests.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later";

const TOO_MANY_REQUESTS: u16 = 429;

/// Configuration for [`RateLimiter`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use errorframe::guard::RateLimitConfig;
///
/// let config = RateLimitConfig::default()
///     .max_requests(10)
///     .window(Duration::from_secs(1));
/// assert_eq!(config.max_requests, 10);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests admitted per window on non-public routes. Public routes get
    /// half, rounded up.
    ///
    /// Default: 100.
    pub max_requests: u32,

    /// Window length.
    ///
    /// Default: 60 seconds.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// Set the per-window request budget.
    #[must_use]
    pub fn max_requests(mut self, max: u32) -> Self {
        self.max_requests = max;
        self
    }

    /// Set the window length.
    #[must_use]
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
}

/// Identifies whose requests to which resource are counted together.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    /// The caller, by default its client address.
    pub identity: String,
    /// The resource, by default the request URL.
    pub resource: String,
}

impl RateLimitKey {
    /// Key `request` by client address and URL.
    #[must_use]
    pub fn for_request(request: &RequestParts) -> Self {
        Self {
            identity: request.client_ip().to_owned(),
            resource: request.url_or_path().to_owned(),
        }
    }
}

/// A request was rejected because its window budget is spent.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("Too many requests, please try again later")]
pub struct RateLimitExceeded {
    /// Seconds until the window resets, rounded up.
    pub retry_after: u64,
}

impl From<RateLimitExceeded> for Thrown {
    fn from(exceeded: RateLimitExceeded) -> Self {
        Thrown::Http(HttpException::new(
            TOO_MANY_REQUESTS,
            json!({
                "statusCode": TOO_MANY_REQUESTS,
                "message": RATE_LIMIT_MESSAGE,
                "retryAfter": exceeded.retry_after,
            }),
        ))
    }
}

#[derive(Clone, Copy, Debug)]
struct Window {
    count: u32,
    resets_at: Instant,
}

type KeyFn = dyn Fn(&RequestParts) -> RateLimitKey + Send + Sync;

/// Counts requests per [`RateLimitKey`] in fixed windows.
///
/// Expired windows are replaced on the next request for their key and
/// removed in bulk by [`RateLimiter::sweep`], which [`spawn_sweeper`] runs
/// periodically.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Arc<DashMap<RateLimitKey, Window>>,
    key_fn: Option<Arc<KeyFn>>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("tracked", &self.windows.len())
            .finish_non_exhaustive()
    }
}

impl Default for RateLimiter {
    fn default() -> Self { Self::new(RateLimitConfig::default()) }
}

impl RateLimiter {
    /// Create a limiter with the given configuration.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(DashMap::new()),
            key_fn: None,
        }
    }

    /// Derive keys with `key_fn` instead of [`RateLimitKey::for_request`].
    #[must_use]
    pub fn with_key_fn<F>(mut self, key_fn: F) -> Self
    where
        F: Fn(&RequestParts) -> RateLimitKey + Send + Sync + 'static,
    {
        self.key_fn = Some(Arc::new(key_fn));
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &RateLimitConfig { &self.config }

    /// Number of keys with a tracked window.
    #[must_use]
    pub fn tracked(&self) -> usize { self.windows.len() }

    /// The key `request` is counted under.
    #[must_use]
    pub fn key_for(&self, request: &RequestParts) -> RateLimitKey {
        match &self.key_fn {
            Some(key_fn) => key_fn(request),
            None => RateLimitKey::for_request(request),
        }
    }

    /// Count one request under `key` against a budget of `max` per window.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitExceeded`] when the window already holds `max`
    /// requests.
    pub fn acquire(&self, key: RateLimitKey, max: u32) -> Result<(), RateLimitExceeded> {
        let now = Instant::now();
        let mut window = self.windows.entry(key).or_insert(Window {
            count: 0,
            resets_at: now + self.config.window,
        });
        if now > window.resets_at {
            *window = Window {
                count: 0,
                resets_at: now + self.config.window,
            };
        }
        if window.count >= max {
            let remaining = window.resets_at.saturating_duration_since(now);
            metrics::inc_rate_limited();
            return Err(RateLimitExceeded {
                retry_after: ceil_secs(remaining),
            });
        }
        window.count += 1;
        Ok(())
    }

    /// Remove every expired window.
    pub fn sweep(&self) {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows.retain(|_, window| window.resets_at >= now);
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!("rate limiter swept {removed} expired windows");
        }
    }
}

impl Guard for RateLimiter {
    fn check(&self, request: &RequestParts, route: &RouteOptions) -> Result<(), Thrown> {
        let max = if route.public {
            self.config.max_requests.div_ceil(2)
        } else {
            self.config.max_requests
        };
        self.acquire(self.key_for(request), max)
            .map_err(Thrown::from)
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

/// Sweep `limiter` every `interval` until `shutdown` is cancelled.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_sweeper(
    limiter: RateLimiter,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => limiter.sweep(),
            }
        }
    })
}
