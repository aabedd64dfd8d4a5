//! Rate-limited, cached fetcher.

use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, FetchError, TransportError};
use crate::fetch::cooldown::{is_busy_status, HostCooldowns};
use crate::fetch::limiter::RateLimits;
use crate::fetch::transport::{Transport, TransportResponse};
use crate::traits::cache::FetchCache;
use crate::types::{CacheConfig, EngineConfig, FetchConfig, FetchResult};

/// Fetches normalized URLs under the run's throughput ceilings.
///
/// Order of operations for one `fetch`:
/// 1. A fresh cache entry is returned without network I/O.
/// 2. Wait for the host to leave cooldown, then for both rate ceilings.
/// 3. GET through the transport.
/// 4. Transient failures retry with exponential backoff up to `max_retries`.
/// 5. Successes are hashed, cached and returned.
pub struct Fetcher<T: Transport> {
    transport: T,
    cache: Option<Arc<dyn FetchCache>>,
    limits: RateLimits,
    cooldowns: HostCooldowns,
    config: FetchConfig,
    cache_config: CacheConfig,
}

enum Attempt {
    Done(FetchResult),
    Retry(FetchError),
    Fail(FetchError),
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            transport,
            cache: None,
            limits: RateLimits::new(&config.rate_limits)?,
            cooldowns: HostCooldowns::new(config.fetch.cooldown()),
            config: config.fetch.clone(),
            cache_config: config.cache.clone(),
        })
    }

    /// Attach a content cache.
    pub fn with_cache(mut self, cache: Arc<dyn FetchCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn cooldowns(&self) -> &HostCooldowns {
        &self.cooldowns
    }

    /// Fetch a normalized URL.
    pub async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<FetchResult, FetchError> {
        let host = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .ok_or_else(|| FetchError::InvalidUrl {
                url: url.to_string(),
            })?;

        if let Some(hit) = self.cached(url).await {
            return Ok(hit);
        }

        let mut attempt: u32 = 0;
        loop {
            let cancelled = || FetchError::Cancelled {
                url: url.to_string(),
            };
            if cancel.is_cancelled() {
                return Err(cancelled());
            }
            self.cooldowns
                .wait_open(&host, cancel)
                .await
                .map_err(|_| cancelled())?;
            self.limits
                .acquire(&host, cancel)
                .await
                .map_err(|_| cancelled())?;

            let outcome = self.transport.get(url).await;
            let error = match self.judge(url, &host, outcome) {
                Attempt::Done(result) => {
                    self.store(&result).await;
                    debug!(url = %url, status = result.status_code, size = result.body_len(), "Fetch successful");
                    return Ok(result);
                }
                Attempt::Fail(e) => return Err(e),
                Attempt::Retry(e) => e,
            };

            if attempt >= self.config.max_retries {
                warn!(url = %url, attempts = attempt + 1, error = %error, "Fetch retries exhausted");
                return Err(error);
            }

            let backoff = self.config.backoff(attempt);
            info!(url = %url, attempt = attempt + 1, backoff_ms = backoff.as_millis() as u64, error = %error, "Retrying fetch");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled()),
                _ = tokio::time::sleep(backoff) => {}
            }
            attempt += 1;
        }
    }

    fn judge(
        &self,
        url: &str,
        host: &str,
        outcome: Result<TransportResponse, TransportError>,
    ) -> Attempt {
        let response = match outcome {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Attempt::Retry(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
            Err(e) => {
                return Attempt::Retry(FetchError::Refused {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        let status = response.status;
        self.cooldowns.record_status(host, status);

        match status {
            200..=299 => Attempt::Done(
                FetchResult::new(url, status, response.body, Utc::now())
                    .with_final_url(response.final_url),
            ),
            s if is_busy_status(s) => Attempt::Retry(FetchError::ServerBusy {
                url: url.to_string(),
                status: s,
            }),
            502 | 504 => Attempt::Retry(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            _ => Attempt::Fail(FetchError::Status {
                url: url.to_string(),
                status,
            }),
        }
    }

    async fn cached(&self, url: &str) -> Option<FetchResult> {
        if !self.cache_config.enabled {
            return None;
        }
        let cache = self.cache.as_ref()?;
        match cache.get_fetch(url).await {
            Ok(Some(hit)) if hit.is_fresh(self.cache_config.ttl(), Utc::now()) => {
                debug!(url = %url, "Cache hit");
                Some(hit)
            }
            Ok(Some(_)) => {
                debug!(url = %url, "Cache expired");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(url = %url, error = %e, "Cache read failed");
                None
            }
        }
    }

    async fn store(&self, result: &FetchResult) {
        if !self.cache_config.enabled {
            return;
        }
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put_fetch(result).await {
                warn!(url = %result.normalized_url, error = %e, "Cache write failed");
            }
        }
    }
}
