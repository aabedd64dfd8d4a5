//! Per-host and global throughput ceilings.

use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::ConfigError;
use crate::types::RateLimitConfig;

type DirectLimiter<C> = RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<<C as Clock>::Instant>>;
type HostLimiter<C> =
    RateLimiter<String, DefaultKeyedStateStore<String>, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Admission was abandoned because the run was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Two independent ceilings, both of which must grant before a request runs.
///
/// Both quotas use a burst of one so grants are evenly spaced: the per-host
/// limiter hands out one slot every `window / N` (rounded up to the next
/// nanosecond), which keeps any window of that length at N requests or fewer.
pub struct RateLimits<C: Clock = DefaultClock> {
    per_host: HostLimiter<C>,
    global: DirectLimiter<C>,
    host_period: Duration,
    global_period: Duration,
}

/// `window / n`, rounded up so `n` periods never fall short of the window.
fn spacing(window: Duration, n: NonZeroU32) -> Duration {
    let nanos = window.as_nanos().div_ceil(u128::from(n.get()));
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

impl RateLimits {
    pub fn new(config: &RateLimitConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, DefaultClock::default())
    }

    /// Wait until both the host and the global ceiling grant a slot.
    pub async fn acquire(&self, host: &str, cancel: &CancellationToken) -> Result<(), Cancelled> {
        let key = host.to_string();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Cancelled),
            _ = self.per_host.until_key_ready(&key) => {}
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Cancelled),
            _ = self.global.until_ready() => {}
        }
        Ok(())
    }
}

impl<C: Clock + Clone> RateLimits<C> {
    pub fn with_clock(config: &RateLimitConfig, clock: C) -> Result<Self, ConfigError> {
        let per_host_requests = NonZeroU32::new(config.per_host_requests).ok_or(ConfigError::Zero {
            field: "rate_limits.per_host_requests",
        })?;
        let global_rpm = NonZeroU32::new(config.global_requests_per_minute).ok_or(ConfigError::Zero {
            field: "rate_limits.global_requests_per_minute",
        })?;

        let host_period = spacing(config.per_host_window(), per_host_requests);
        let host_quota = Quota::with_period(host_period)
            .ok_or(ConfigError::Zero {
                field: "rate_limits.per_host_window_ms",
            })?
            .allow_burst(NonZeroU32::MIN);

        let global_period = spacing(Duration::from_secs(60), global_rpm);
        let global_quota = Quota::with_period(global_period)
            .ok_or(ConfigError::Zero {
                field: "rate_limits.global_requests_per_minute",
            })?
            .allow_burst(NonZeroU32::MIN);

        Ok(Self {
            per_host: RateLimiter::new(host_quota, DefaultKeyedStateStore::default(), clock.clone()),
            global: RateLimiter::direct_with_clock(global_quota, clock),
            host_period,
            global_period,
        })
    }

    /// Minimum spacing between two grants to the same host.
    pub fn host_period(&self) -> Duration {
        self.host_period
    }

    /// Minimum spacing between any two grants.
    pub fn global_period(&self) -> Duration {
        self.global_period
    }
}
