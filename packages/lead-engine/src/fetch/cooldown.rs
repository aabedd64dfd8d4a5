//! Per-host cooldown after busy responses.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::fetch::limiter::Cancelled;

/// Whether a host currently accepts requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Open,
    Cooldown { until: Instant },
}

/// Status codes that put a host into cooldown.
pub fn is_busy_status(status: u16) -> bool {
    matches!(status, 429 | 503)
}

/// Cooldown state machine for every host seen in a run.
///
/// `Open -> Cooldown(until)` on a busy response, `Cooldown -> Open` once a
/// caller observes that `until` has passed. Requests to a cooling host are
/// deferred, never dropped.
pub struct HostCooldowns {
    cooldown: Duration,
    states: Mutex<HashMap<String, HostState>>,
}

impl HostCooldowns {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Current state, applying the elapsed-window transition.
    pub fn state(&self, host: &str) -> HostState {
        let mut states = self.states.lock().unwrap();
        match states.get(host).copied() {
            Some(HostState::Cooldown { until }) if Instant::now() >= until => {
                states.insert(host.to_string(), HostState::Open);
                HostState::Open
            }
            Some(state) => state,
            None => HostState::Open,
        }
    }

    /// Feed a response status. Busy statuses start (or extend) a cooldown.
    pub fn record_status(&self, host: &str, status: u16) -> HostState {
        if !is_busy_status(status) {
            return self.state(host);
        }

        let until = Instant::now() + self.cooldown;
        let mut states = self.states.lock().unwrap();
        let next = match states.get(host) {
            Some(HostState::Cooldown { until: current }) if *current > until => {
                HostState::Cooldown { until: *current }
            }
            _ => HostState::Cooldown { until },
        };
        states.insert(host.to_string(), next);
        tracing::warn!(host = %host, status, cooldown_secs = self.cooldown.as_secs(), "Host entered cooldown");
        next
    }

    /// Wait until the host is open again.
    pub async fn wait_open(&self, host: &str, cancel: &CancellationToken) -> Result<(), Cancelled> {
        loop {
            let until = match self.state(host) {
                HostState::Open => return Ok(()),
                HostState::Cooldown { until } => until,
            };
            tracing::debug!(host = %host, "Waiting for host cooldown");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Cancelled),
                _ = tokio::time::sleep_until(until) => {}
            }
        }
    }
}
