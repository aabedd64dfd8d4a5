//! In-memory storage implementation for testing and single-run batches.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::cache::FetchCache;
use crate::traits::store::{merge_company, RecordStore};
use crate::types::{CompanyRecord, DiscoveryTarget, FetchResult, SignalSnapshot};

/// In-memory storage for fetches, companies, snapshots and targets.
///
/// Data is lost when the process exits; serialize the records out if a
/// later run needs them.
pub struct MemoryStore {
    fetches: RwLock<HashMap<String, FetchResult>>,
    companies: RwLock<BTreeMap<String, CompanyRecord>>,
    snapshots: RwLock<Vec<SignalSnapshot>>,
    targets: RwLock<BTreeMap<String, DiscoveryTarget>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            fetches: RwLock::new(HashMap::new()),
            companies: RwLock::new(BTreeMap::new()),
            snapshots: RwLock::new(Vec::new()),
            targets: RwLock::new(BTreeMap::new()),
        }
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.fetches.write().unwrap().clear();
        self.companies.write().unwrap().clear();
        self.snapshots.write().unwrap().clear();
        self.targets.write().unwrap().clear();
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.read().unwrap().len()
    }

    pub fn company_count(&self) -> usize {
        self.companies.read().unwrap().len()
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.read().unwrap().len()
    }

    /// Every snapshot in append order.
    pub fn all_snapshots(&self) -> Vec<SignalSnapshot> {
        self.snapshots.read().unwrap().clone()
    }
}

#[async_trait]
impl FetchCache for MemoryStore {
    async fn get_fetch(&self, normalized_url: &str) -> StoreResult<Option<FetchResult>> {
        Ok(self.fetches.read().unwrap().get(normalized_url).cloned())
    }

    async fn put_fetch(&self, result: &FetchResult) -> StoreResult<()> {
        self.fetches
            .write()
            .unwrap()
            .insert(result.normalized_url.clone(), result.clone());
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_company(&self, domain: &str) -> StoreResult<Option<CompanyRecord>> {
        Ok(self.companies.read().unwrap().get(domain).cloned())
    }

    async fn upsert_company(&self, company: &CompanyRecord) -> StoreResult<CompanyRecord> {
        let mut companies = self.companies.write().unwrap();
        let stored = match companies.get(&company.domain) {
            Some(existing) => merge_company(existing, company)?,
            None => company.clone(),
        };
        companies.insert(stored.domain.clone(), stored.clone());
        Ok(stored)
    }

    async fn companies(&self) -> StoreResult<Vec<CompanyRecord>> {
        Ok(self.companies.read().unwrap().values().cloned().collect())
    }

    async fn append_snapshot(&self, snapshot: &SignalSnapshot) -> StoreResult<()> {
        self.snapshots.write().unwrap().push(snapshot.clone());
        Ok(())
    }

    async fn has_snapshot(&self, source_url: &str, content_hash: &str) -> StoreResult<bool> {
        Ok(self
            .snapshots
            .read()
            .unwrap()
            .iter()
            .any(|s| s.source_url == source_url && s.content_hash == content_hash))
    }

    async fn snapshots_for(&self, domain: &str) -> StoreResult<Vec<SignalSnapshot>> {
        Ok(self
            .snapshots
            .read()
            .unwrap()
            .iter()
            .filter(|s| s.company_domain == domain)
            .cloned()
            .collect())
    }

    async fn upsert_target(&self, target: &DiscoveryTarget) -> StoreResult<()> {
        self.targets
            .write()
            .unwrap()
            .insert(target.normalized_url.clone(), target.clone());
        Ok(())
    }

    async fn targets(&self) -> StoreResult<Vec<DiscoveryTarget>> {
        Ok(self.targets.read().unwrap().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BusinessType, ExtractedFields, Signal, SourceType};
    use chrono::{Duration, Utc};
    use std::collections::BTreeSet;

    fn snapshot(domain: &str, url: &str, hash: &str) -> SignalSnapshot {
        SignalSnapshot {
            company_domain: domain.to_string(),
            source_type: SourceType::Hiring,
            source_url: url.to_string(),
            signals: BTreeSet::from([Signal::AtsBoardFound]),
            details: ExtractedFields::empty(SourceType::Hiring),
            content_hash: hash.to_string(),
            fetched_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_fetch_cache_supersedes() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .put_fetch(&FetchResult::new("https://acme.io", 200, b"v1".to_vec(), now))
            .await
            .unwrap();
        store
            .put_fetch(&FetchResult::new("https://acme.io", 200, b"v2".to_vec(), now))
            .await
            .unwrap();

        let cached = store.get_fetch("https://acme.io").await.unwrap().unwrap();
        assert_eq!(cached.body, b"v2");
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_company_upsert_overwrites_classification() {
        let store = MemoryStore::new();
        let t0 = Utc::now();
        store.upsert_company(&CompanyRecord::new("acme.io", t0)).await.unwrap();

        let later = CompanyRecord::new("acme.io", t0 + Duration::hours(1)).with_classification(
            BusinessType::ServiceAgency,
            0.7,
            vec!["services".into()],
        );
        let stored = store.upsert_company(&later).await.unwrap();

        assert_eq!(stored.first_seen_at, t0);
        assert_eq!(stored.business_type, BusinessType::ServiceAgency);
        assert_eq!(store.company_count(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_lookup_by_content() {
        let store = MemoryStore::new();
        store
            .append_snapshot(&snapshot("acme.io", "https://jobs.lever.co/acme", "abc"))
            .await
            .unwrap();
        store
            .append_snapshot(&snapshot("zed.dev", "https://jobs.lever.co/zed", "def"))
            .await
            .unwrap();

        assert!(store.has_snapshot("https://jobs.lever.co/acme", "abc").await.unwrap());
        assert!(!store.has_snapshot("https://jobs.lever.co/acme", "def").await.unwrap());
        assert_eq!(store.snapshots_for("acme.io").await.unwrap().len(), 1);
    }
}
