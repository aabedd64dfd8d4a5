//! Content cache for fetched pages.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::FetchResult;

/// Cache of fetch results keyed by normalized URL.
///
/// A later entry for the same URL supersedes the earlier one.
#[async_trait]
pub trait FetchCache: Send + Sync {
    /// Cached result for a normalized URL, fresh or not.
    async fn get_fetch(&self, normalized_url: &str) -> StoreResult<Option<FetchResult>>;

    /// Store a result, replacing any previous entry.
    async fn put_fetch(&self, result: &FetchResult) -> StoreResult<()>;
}
