//! Persistence for companies, snapshots and discovery targets.

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::types::{CompanyRecord, DiscoveryTarget, SignalSnapshot};

/// Record storage consumed by the pipeline.
///
/// Companies are upserted by domain, snapshots are append-only, and targets
/// are upserted by normalized URL so a later run can rehydrate its ledger.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Company by domain.
    async fn get_company(&self, domain: &str) -> StoreResult<Option<CompanyRecord>>;

    /// Insert or merge a company. Returns the stored record.
    ///
    /// Implementations must keep `domain` and `first_seen_at` of an existing
    /// record; see [`merge_company`].
    async fn upsert_company(&self, company: &CompanyRecord) -> StoreResult<CompanyRecord>;

    /// All companies, ordered by domain.
    async fn companies(&self) -> StoreResult<Vec<CompanyRecord>>;

    /// Append a snapshot.
    async fn append_snapshot(&self, snapshot: &SignalSnapshot) -> StoreResult<()>;

    /// Whether a snapshot exists for this exact content at this source.
    async fn has_snapshot(&self, source_url: &str, content_hash: &str) -> StoreResult<bool>;

    /// Snapshots for a domain in append order.
    async fn snapshots_for(&self, domain: &str) -> StoreResult<Vec<SignalSnapshot>>;

    /// Insert or replace a discovery target.
    async fn upsert_target(&self, target: &DiscoveryTarget) -> StoreResult<()>;

    /// All persisted targets.
    async fn targets(&self) -> StoreResult<Vec<DiscoveryTarget>>;
}

/// Merge an incoming company into the stored one.
///
/// Classification fields take the incoming values; identity and first
/// sighting are kept; `last_seen_at` only moves forward.
pub fn merge_company(existing: &CompanyRecord, incoming: &CompanyRecord) -> StoreResult<CompanyRecord> {
    if existing.domain != incoming.domain {
        return Err(StoreError::DomainMismatch {
            existing: existing.domain.clone(),
            requested: incoming.domain.clone(),
        });
    }

    Ok(CompanyRecord {
        domain: existing.domain.clone(),
        canonical_name: incoming.canonical_name.clone(),
        website_url: incoming.website_url.clone(),
        business_type: incoming.business_type,
        confidence: incoming.confidence,
        reasons: incoming.reasons.clone(),
        hints: incoming.hints.clone(),
        first_seen_at: existing.first_seen_at.min(incoming.first_seen_at),
        last_seen_at: existing.last_seen_at.max(incoming.last_seen_at),
    })
}
