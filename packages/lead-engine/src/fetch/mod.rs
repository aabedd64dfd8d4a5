//! Rate-limited cached fetching.
//!
//! [`Fetcher`] combines the per-host and global ceilings, the per-host
//! cooldown state machine, bounded retries and the content cache over a
//! pluggable [`Transport`].

pub mod cooldown;
pub mod fetcher;
pub mod limiter;
pub mod transport;

pub use cooldown::{HostCooldowns, HostState};
pub use fetcher::Fetcher;
pub use limiter::RateLimits;
pub use transport::{HttpTransport, Transport, TransportResponse};
