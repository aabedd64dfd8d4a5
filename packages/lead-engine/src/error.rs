//! Typed errors for the lead engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can
//! match on the failure kind and keep per-item failures isolated.

use thiserror::Error;

/// Umbrella error for operations that cross component boundaries.
#[derive(Debug, Error)]
pub enum EngineError {
    /// URL could not be normalized
    #[error("normalize failed: {0}")]
    Normalize(#[from] NormalizeError),

    /// Fetch failed after the retry policy was exhausted
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Classifier failed
    #[error("classify failed: {0}")]
    Classify(#[from] ClassifyError),

    /// Search provider failed
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Shared infrastructure could not be initialized
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors produced by URL normalization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// Input is not an absolute http(s) URL with a parsable host
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl NormalizeError {
    pub(crate) fn invalid(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors returned by the fetcher once retries are exhausted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connect or read phase exceeded its budget on every attempt
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    /// Connection refused or reset, or another transport failure
    #[error("request refused for {url}: {reason}")]
    Refused { url: String, reason: String },

    /// Host kept answering 429/503
    #[error("server busy for {url} (status {status})")]
    ServerBusy { url: String, status: u16 },

    /// Non-retryable HTTP status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// URL had no host to rate limit against
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Run was cancelled while waiting for admission
    #[error("fetch cancelled: {url}")]
    Cancelled { url: String },
}

/// Low-level transport failures, classified for the retry policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connect phase timed out
    #[error("connect timeout")]
    ConnectTimeout,

    /// Read phase timed out
    #[error("read timeout")]
    ReadTimeout,

    /// Connection could not be established
    #[error("connect failed: {0}")]
    Connect(String),

    /// Anything else the transport reported
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether this failure was a timeout of either phase.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectTimeout | Self::ReadTimeout)
    }
}

/// Content could not be turned into signals.
///
/// Never propagated out of [`crate::extract::Extractors::extract`]; converted into an
/// empty signal set with a diagnostic instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("empty body")]
    EmptyBody,

    #[error("body is not valid UTF-8")]
    NotUtf8,

    #[error("content does not look like markup")]
    NotMarkup,

    #[error("malformed content: {0}")]
    Malformed(String),
}

/// Classifier failures (secondary classifiers only; the rule classifier is infallible).
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Classifier service unavailable or failed
    #[error("classifier backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Classifier returned something outside the contract
    #[error("invalid classifier response: {0}")]
    InvalidResponse(String),

    /// Per-period call budget spent
    #[error("classifier budget exhausted")]
    BudgetExhausted,
}

/// Search provider failures.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search provider error: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("search provider rate limited")]
    RateLimited,
}

/// Storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Attempt to change an immutable identity field
    #[error("domain mismatch: record {existing} cannot become {requested}")]
    DomainMismatch { existing: String, requested: String },
}

/// Fatal initialization errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A throughput ceiling or pool size was zero
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    /// A configured pattern failed to compile
    #[error("invalid pattern for {field}: {source}")]
    Pattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Config file could not be read
    #[error("config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file or override could not be parsed
    #[error("config parse error: {0}")]
    Parse(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Result type alias for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
