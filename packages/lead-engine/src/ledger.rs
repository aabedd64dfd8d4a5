//! Dedup ledger: the single record of which URLs have been queued.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::NormalizeError;
use crate::normalize::UrlNormalizer;
use crate::types::{DiscoveryTarget, QueryEvidence, SourceType};

/// Maps normalized URLs to their discovery target.
///
/// The whole check-and-insert happens under one lock, so concurrent
/// admissions of the same URL always converge on a single target.
pub struct DedupLedger {
    normalizer: UrlNormalizer,
    targets: Mutex<HashMap<String, DiscoveryTarget>>,
}

impl DedupLedger {
    pub fn new(normalizer: UrlNormalizer) -> Self {
        Self {
            normalizer,
            targets: Mutex::new(HashMap::new()),
        }
    }

    /// Rehydrate from previously persisted targets.
    ///
    /// Later entries with a duplicate key are merged into the first.
    pub fn from_targets(normalizer: UrlNormalizer, targets: impl IntoIterator<Item = DiscoveryTarget>) -> Self {
        let mut map: HashMap<String, DiscoveryTarget> = HashMap::new();
        for target in targets {
            match map.get_mut(&target.normalized_url) {
                Some(existing) => {
                    existing.seen_count += target.seen_count;
                    existing.first_seen_at = existing.first_seen_at.min(target.first_seen_at);
                    existing.last_seen_at = existing.last_seen_at.max(target.last_seen_at);
                }
                None => {
                    map.insert(target.normalized_url.clone(), target);
                }
            }
        }
        Self {
            normalizer,
            targets: Mutex::new(map),
        }
    }

    pub fn normalizer(&self) -> &UrlNormalizer {
        &self.normalizer
    }

    /// Record a sighting of `raw_url`. Returns the target and whether it is new.
    pub fn admit(
        &self,
        source_type: SourceType,
        raw_url: &str,
    ) -> Result<(DiscoveryTarget, bool), NormalizeError> {
        self.admit_at(source_type, raw_url, None, Utc::now())
    }

    /// Like [`admit`](Self::admit), keeping search evidence for a first sighting.
    pub fn admit_with_evidence(
        &self,
        source_type: SourceType,
        raw_url: &str,
        evidence: QueryEvidence,
    ) -> Result<(DiscoveryTarget, bool), NormalizeError> {
        self.admit_at(source_type, raw_url, Some(evidence), Utc::now())
    }

    /// Admission with an explicit clock.
    pub fn admit_at(
        &self,
        source_type: SourceType,
        raw_url: &str,
        evidence: Option<QueryEvidence>,
        now: DateTime<Utc>,
    ) -> Result<(DiscoveryTarget, bool), NormalizeError> {
        let normalized_url = self.normalizer.normalize(raw_url, None)?;

        let mut targets = self.targets.lock().unwrap();
        if let Some(existing) = targets.get_mut(&normalized_url) {
            existing.seen_count += 1;
            existing.last_seen_at = existing.last_seen_at.max(now);
            tracing::debug!(
                url = %normalized_url,
                seen_count = existing.seen_count,
                "Repeat sighting"
            );
            return Ok((existing.clone(), false));
        }

        let target = DiscoveryTarget {
            source_type,
            raw_url: raw_url.to_string(),
            source_domain: host_of(&normalized_url),
            normalized_url: normalized_url.clone(),
            first_seen_at: now,
            last_seen_at: now,
            seen_count: 1,
            query_evidence: evidence,
        };
        targets.insert(normalized_url, target.clone());
        Ok((target, true))
    }

    pub fn get(&self, normalized_url: &str) -> Option<DiscoveryTarget> {
        self.targets.lock().unwrap().get(normalized_url).cloned()
    }

    /// All targets, ordered by normalized URL.
    pub fn targets(&self) -> Vec<DiscoveryTarget> {
        let mut all: Vec<DiscoveryTarget> = self.targets.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| a.normalized_url.cmp(&b.normalized_url));
        all
    }

    pub fn len(&self) -> usize {
        self.targets.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DedupLedger {
    fn default() -> Self {
        Self::new(UrlNormalizer::default())
    }
}

fn host_of(normalized_url: &str) -> String {
    url::Url::parse(normalized_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}
