//! Batch orchestration: discover, process, project.
//!
//! A run admits search hits into the ledger, fetches every target through a
//! bounded worker pool, and handles each page inline as its fetch completes:
//! extract, resolve the company domain, classify, then persist the company
//! and an append-only snapshot. Leads are projected from whatever the store
//! holds, so projection can be rerun at any time.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::classify::RuleClassifier;
use crate::error::{ConfigError, FetchError, StoreResult};
use crate::extract::{html, ExtractionResult, Extractors};
use crate::fetch::{Fetcher, Transport};
use crate::ledger::DedupLedger;
use crate::normalize::UrlNormalizer;
use crate::resolve::resolve;
use crate::score::{export_lanes, project_lead, Lanes};
use crate::traits::cache::FetchCache;
use crate::traits::classifier::{Classification, Classifier, PageKind, Pages};
use crate::traits::search::{QueryPack, SearchHit, SearchProvider};
use crate::traits::store::RecordStore;
use crate::types::{
    CompanyRecord, DiscoveryTarget, EngineConfig, FetchResult, LeadRecord, QueryEvidence,
    SignalSnapshot, SourceType,
};

/// Counters for one run.
///
/// Per-item failures land here instead of aborting the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct RunStats {
    pub queries_run: usize,
    pub queries_failed: usize,
    pub hits_seen: usize,
    pub targets_new: usize,
    pub targets_repeat: usize,
    pub invalid_urls: usize,
    pub fetched: usize,
    pub fetch_failed: usize,
    /// Targets cancelled mid-fetch or never started
    pub cancelled: usize,
    /// Same content already snapshotted for the source URL
    pub unchanged_skipped: usize,
    pub unresolved_domains: usize,
    pub snapshots_written: usize,
    pub companies_classified: usize,
    pub store_errors: usize,
    pub failed_urls: Vec<String>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// No per-item failures.
    pub fn is_success(&self) -> bool {
        self.queries_failed == 0 && self.fetch_failed == 0 && self.store_errors == 0
    }

    /// Fold another stats block into this one.
    pub fn merge(&mut self, other: RunStats) {
        self.queries_run += other.queries_run;
        self.queries_failed += other.queries_failed;
        self.hits_seen += other.hits_seen;
        self.targets_new += other.targets_new;
        self.targets_repeat += other.targets_repeat;
        self.invalid_urls += other.invalid_urls;
        self.fetched += other.fetched;
        self.fetch_failed += other.fetch_failed;
        self.cancelled += other.cancelled;
        self.unchanged_skipped += other.unchanged_skipped;
        self.unresolved_domains += other.unresolved_domains;
        self.snapshots_written += other.snapshots_written;
        self.companies_classified += other.companies_classified;
        self.store_errors += other.store_errors;
        self.failed_urls.extend(other.failed_urls);
    }
}

/// What happened to one target.
enum Outcome {
    Snapshot { classified: bool },
    Unchanged,
    Unresolved,
    FetchFailed(String),
    Cancelled,
    StoreFailed(String),
}

type ClassificationCell = Arc<OnceCell<Classification>>;

/// The discovery-to-lead pipeline.
pub struct Pipeline<T: Transport> {
    ledger: DedupLedger,
    fetcher: Fetcher<T>,
    extractors: Extractors,
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn RecordStore>,
    config: EngineConfig,
    /// One classification per domain per run
    classified: Mutex<HashMap<String, ClassificationCell>>,
}

impl<T: Transport> Pipeline<T> {
    /// Build a pipeline. Fails only on unusable shared infrastructure.
    pub fn new(transport: T, store: Arc<dyn RecordStore>, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let normalizer = UrlNormalizer::new(&config.normalize)?;
        Ok(Self {
            ledger: DedupLedger::new(normalizer),
            fetcher: Fetcher::new(transport, &config)?,
            extractors: Extractors::new(&config.extract),
            classifier: Arc::new(RuleClassifier::new(config.classifier.clone())),
            store,
            config,
            classified: Mutex::new(HashMap::new()),
        })
    }

    /// Attach a content cache to the fetcher.
    pub fn with_cache(mut self, cache: Arc<dyn FetchCache>) -> Self {
        self.fetcher = self.fetcher.with_cache(cache);
        self
    }

    /// Replace the rule classifier, e.g. with a [`crate::classify::ClassifierChain`].
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Seed the ledger with targets persisted by an earlier run.
    pub async fn rehydrate(mut self) -> StoreResult<Self> {
        let targets = self.store.targets().await?;
        info!(targets = targets.len(), "Rehydrating ledger");
        self.ledger = DedupLedger::from_targets(self.ledger.normalizer().clone(), targets);
        Ok(self)
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run every query of every pack and admit the hits.
    ///
    /// A failing query is counted and skipped; the rest still run.
    pub async fn discover(&self, provider: &dyn SearchProvider, packs: &[QueryPack]) -> RunStats {
        let mut stats = RunStats::new();

        for pack in packs {
            for query in &pack.queries {
                stats.queries_run += 1;
                match provider.search(query, pack.params()).await {
                    Ok(hits) => {
                        debug!(pack = %pack.name, query = %query, hits = hits.len(), "Search completed");
                        let admitted = self.admit_hits(&pack.name, pack.source_type, query, &hits).await;
                        stats.merge(admitted);
                    }
                    Err(e) => {
                        warn!(pack = %pack.name, query = %query, error = %e, "Search failed");
                        stats.queries_failed += 1;
                    }
                }
            }
        }

        info!(
            queries = stats.queries_run,
            new = stats.targets_new,
            repeat = stats.targets_repeat,
            invalid = stats.invalid_urls,
            "Discovery completed"
        );
        stats
    }

    /// Admit the hits of one query, recording them as its evidence.
    pub async fn admit_hits(
        &self,
        pack_name: &str,
        source_type: SourceType,
        query: &str,
        hits: &[SearchHit],
    ) -> RunStats {
        let mut stats = RunStats::new();

        for hit in hits {
            stats.hits_seen += 1;
            let evidence = QueryEvidence {
                query_pack: Some(pack_name.to_string()),
                query: Some(query.to_string()),
                title: hit.title.clone(),
                snippet: hit.snippet.clone(),
                rank: Some(hit.rank),
            };

            let (target, is_new) = match self.ledger.admit_with_evidence(source_type, &hit.link, evidence) {
                Ok(admitted) => admitted,
                Err(e) => {
                    debug!(url = %hit.link, error = %e, "Dropping invalid URL");
                    stats.invalid_urls += 1;
                    continue;
                }
            };

            if is_new {
                stats.targets_new += 1;
            } else {
                stats.targets_repeat += 1;
            }

            if let Err(e) = self.store.upsert_target(&target).await {
                warn!(url = %target.normalized_url, error = %e, "Failed to persist target");
                stats.store_errors += 1;
            }
        }

        stats
    }

    /// Fetch and handle every target in the ledger.
    ///
    /// Fetches overlap up to the worker pool size; everything after a fetch
    /// runs inline for that item. Cancelling stops new fetches from starting;
    /// targets left behind stay in the ledger untouched.
    pub async fn process(&self, cancel: &CancellationToken) -> RunStats {
        let targets = self.ledger.targets();
        let total = targets.len();
        let workers = self
            .config
            .fetch
            .workers
            .unwrap_or_else(|| self.config.rate_limits.default_workers());

        info!(targets = total, workers, "Processing targets");

        let outcomes: Vec<Outcome> = stream::iter(targets)
            .take_while(|_| futures::future::ready(!cancel.is_cancelled()))
            .map(|target| self.process_target(target, cancel))
            .buffer_unordered(workers)
            .collect()
            .await;

        let mut stats = RunStats::new();
        stats.cancelled = total - outcomes.len();
        for outcome in outcomes {
            match outcome {
                Outcome::Snapshot { classified } => {
                    stats.fetched += 1;
                    stats.snapshots_written += 1;
                    if classified {
                        stats.companies_classified += 1;
                    }
                }
                Outcome::Unchanged => {
                    stats.fetched += 1;
                    stats.unchanged_skipped += 1;
                }
                Outcome::Unresolved => {
                    stats.fetched += 1;
                    stats.unresolved_domains += 1;
                }
                Outcome::FetchFailed(url) => {
                    stats.fetch_failed += 1;
                    stats.failed_urls.push(url);
                }
                Outcome::Cancelled => stats.cancelled += 1,
                Outcome::StoreFailed(url) => {
                    stats.fetched += 1;
                    stats.store_errors += 1;
                    stats.failed_urls.push(url);
                }
            }
        }
        stats.failed_urls.sort();

        info!(
            fetched = stats.fetched,
            failed = stats.fetch_failed,
            cancelled = stats.cancelled,
            snapshots = stats.snapshots_written,
            unresolved = stats.unresolved_domains,
            "Processing completed"
        );
        stats
    }

    async fn process_target(&self, target: DiscoveryTarget, cancel: &CancellationToken) -> Outcome {
        let url = target.normalized_url.as_str();

        let fetched = match self.fetcher.fetch(url, cancel).await {
            Ok(fetched) => fetched,
            Err(FetchError::Cancelled { .. }) => return Outcome::Cancelled,
            Err(e) => {
                warn!(url = %url, error = %e, "Fetch failed");
                return Outcome::FetchFailed(url.to_string());
            }
        };

        let source_url = self.source_url(&fetched);
        match self.store.has_snapshot(&source_url, &fetched.content_hash).await {
            Ok(true) => {
                debug!(url = %source_url, "Content unchanged since last snapshot");
                return Outcome::Unchanged;
            }
            Ok(false) => {}
            Err(e) => warn!(url = %source_url, error = %e, "Snapshot lookup failed"),
        }

        let extraction = self.extractors.extract(target.source_type, &source_url, &fetched.body);
        let Some(domain) = resolve(&extraction, &source_url) else {
            debug!(url = %source_url, "No company domain resolved");
            return Outcome::Unresolved;
        };

        let Some((classification, fresh)) = self.classification_for(&domain, cancel).await else {
            return Outcome::Cancelled;
        };

        match self.persist(&domain, &source_url, &fetched, extraction, classification).await {
            Ok(()) => Outcome::Snapshot { classified: fresh },
            Err(e) => {
                warn!(url = %source_url, domain = %domain, error = %e, "Failed to persist signals");
                Outcome::StoreFailed(url.to_string())
            }
        }
    }

    /// The page's declared canonical URL, else the fetched URL.
    fn source_url(&self, fetched: &FetchResult) -> String {
        html::decode(&fetched.body)
            .ok()
            .and_then(|text| {
                self.ledger
                    .normalizer()
                    .canonical_from_html(&fetched.normalized_url, text)
                    .ok()
            })
            .unwrap_or_else(|| fetched.normalized_url.clone())
    }

    /// Classification for a domain, computed at most once per run.
    ///
    /// Returns the verdict and whether this call produced it; `None` when the
    /// run was cancelled while the company pages were being fetched.
    async fn classification_for(
        &self,
        domain: &str,
        cancel: &CancellationToken,
    ) -> Option<(Classification, bool)> {
        let cell = self
            .classified
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .clone();

        let fresh = AtomicBool::new(false);
        let flag = &fresh;
        let verdict = cell
            .get_or_try_init(move || async move {
                flag.store(true, Ordering::Relaxed);
                self.classify_domain(domain, cancel).await
            })
            .await
            .ok()
            .cloned()?;
        Some((verdict, fresh.load(Ordering::Relaxed)))
    }

    async fn classify_domain(&self, domain: &str, cancel: &CancellationToken) -> Result<Classification, FetchError> {
        let mut pages = Pages::new();
        for kind in [PageKind::Home, PageKind::About] {
            if let Some(text) = self.fetch_page(domain, kind, cancel).await? {
                pages.insert(kind, text);
            }
        }
        for kind in PageKind::SUPPORTING {
            if let Some(text) = self.fetch_page(domain, kind, cancel).await? {
                pages.insert(kind, text);
                break;
            }
        }

        let classification = match self.classifier.classify(domain, &pages).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!(domain = %domain, classifier = self.classifier.name(), error = %e, "Classification failed");
                Classification::unknown(format!("classifier failed: {}", e))
            }
        };
        info!(
            domain = %domain,
            pages = pages.len(),
            business_type = %classification.business_type,
            confidence = classification.confidence,
            "Company classified"
        );
        Ok(classification)
    }

    /// One company page as text. Missing pages are `None`; only cancellation is an error.
    async fn fetch_page(
        &self,
        domain: &str,
        kind: PageKind,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, FetchError> {
        let url = format!("https://{}{}", domain, kind.path());
        match self.fetcher.fetch(&url, cancel).await {
            Ok(page) => Ok(html::decode(&page.body).ok().map(str::to_string)),
            Err(e @ FetchError::Cancelled { .. }) => Err(e),
            Err(e) => {
                debug!(url = %url, page = %kind, error = %e, "Company page unavailable");
                Ok(None)
            }
        }
    }

    async fn persist(
        &self,
        domain: &str,
        source_url: &str,
        fetched: &FetchResult,
        extraction: ExtractionResult,
        classification: Classification,
    ) -> StoreResult<()> {
        let existing = self.store.get_company(domain).await?;
        let name = extraction
            .fields
            .display_name()
            .map(str::to_string)
            .or_else(|| existing.map(|c| c.canonical_name));

        let mut company = CompanyRecord::new(domain, fetched.fetched_at).with_classification(
            classification.business_type,
            classification.confidence,
            classification.reasons,
        );
        company.hints = classification.hints;
        if let Some(name) = name {
            company = company.with_name(name);
        }
        self.store.upsert_company(&company).await?;

        let snapshot = SignalSnapshot {
            company_domain: domain.to_string(),
            source_type: extraction.source_type,
            source_url: source_url.to_string(),
            signals: extraction.signals,
            details: extraction.fields,
            content_hash: fetched.content_hash.clone(),
            fetched_at: fetched.fetched_at,
        };
        self.store.append_snapshot(&snapshot).await?;
        debug!(
            domain = %domain,
            url = %source_url,
            signals = snapshot.signals.len(),
            "Snapshot written"
        );
        Ok(())
    }

    /// Project a lead for every stored company.
    pub async fn project_leads(&self, as_of: DateTime<Utc>) -> StoreResult<Vec<LeadRecord>> {
        let companies = self.store.companies().await?;
        let mut leads = Vec::with_capacity(companies.len());
        for company in &companies {
            let snapshots = self.store.snapshots_for(&company.domain).await?;
            leads.push(project_lead(
                company,
                &snapshots,
                as_of,
                &self.config.scoring,
                &self.config.routing,
            ));
        }
        Ok(leads)
    }

    /// The two outreach lanes as of `as_of`.
    pub async fn export(&self, as_of: DateTime<Utc>) -> StoreResult<Lanes> {
        let leads = self.project_leads(as_of).await?;
        let companies = self.store.companies().await?;
        Ok(export_lanes(&leads, &companies))
    }

    /// Discover then process.
    pub async fn run(
        &self,
        provider: &dyn SearchProvider,
        packs: &[QueryPack],
        cancel: &CancellationToken,
    ) -> RunStats {
        let mut stats = self.discover(provider, packs).await;
        stats.merge(self.process(cancel).await);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::{MockClassifier, MockSearchProvider, MockTransport};
    use crate::types::{BusinessType, FetchConfig, RateLimitConfig, RouteFlag, Signal};
    use std::time::Duration;

    const BOARD: &str = r#"<html><head><title>Jobs at Acme</title></head><body>
        <div id="logo"><a href="https://www.acme.io"><img alt="Acme"></a></div>
        <div class="opening"><a href="/acme/jobs/1">Senior Backend Engineer</a></div>
        <div class="opening"><a href="/acme/jobs/2">Platform Engineer</a></div>
        <div class="opening"><a href="/acme/jobs/3">DevOps Engineer</a></div>
      </body></html>"#;

    const HOME: &str = r#"<html><body>
        <h1>Acme</h1><p>The API dashboard for data teams. Start a free trial, see pricing.</p>
      </body></html>"#;

    fn fast_config() -> EngineConfig {
        EngineConfig::default()
            .with_rate_limits(RateLimitConfig::new(100, Duration::from_secs(1), 60_000))
            .with_fetch(
                FetchConfig::default()
                    .with_backoff_base_ms(1)
                    .with_cooldown(Duration::from_secs(0))
                    .with_workers(4),
            )
    }

    fn transport() -> MockTransport {
        MockTransport::new()
            .with_page("https://boards.greenhouse.io/acme", BOARD)
            .with_page("https://acme.io", HOME)
    }

    fn pipeline(transport: MockTransport, store: Arc<MemoryStore>) -> Pipeline<MockTransport> {
        Pipeline::new(transport, store.clone(), fast_config())
            .unwrap()
            .with_cache(store)
    }

    fn hiring_pack() -> QueryPack {
        QueryPack::new("ats", SourceType::Hiring).with_query("site:boards.greenhouse.io engineer")
    }

    #[tokio::test]
    async fn test_discover_dedups_and_isolates_failures() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(transport(), store.clone());
        let provider = MockSearchProvider::new()
            .with_hits(
                "site:boards.greenhouse.io engineer",
                vec![
                    SearchHit::new("https://boards.greenhouse.io/acme/jobs/1?utm_source=x", 1),
                    SearchHit::new("https://boards.greenhouse.io/acme/jobs/2", 2),
                    SearchHit::new("not a url", 3),
                ],
            )
            .with_failure("broken query");
        let packs = vec![hiring_pack().with_query("broken query")];

        let stats = pipeline.discover(&provider, &packs).await;

        assert_eq!(stats.queries_run, 2);
        assert_eq!(stats.queries_failed, 1);
        assert_eq!(stats.targets_new, 1);
        assert_eq!(stats.targets_repeat, 1);
        assert_eq!(stats.invalid_urls, 1);
        assert!(!stats.is_success());

        let target = pipeline.ledger().get("https://boards.greenhouse.io/acme").unwrap();
        assert_eq!(target.seen_count, 2);
        let evidence = target.query_evidence.unwrap();
        assert_eq!(evidence.query_pack.as_deref(), Some("ats"));
        assert_eq!(evidence.rank, Some(1));
        assert_eq!(store.targets().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_process_writes_company_and_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(transport(), store.clone());
        pipeline.ledger().admit(SourceType::Hiring, "https://boards.greenhouse.io/acme/jobs/1").unwrap();

        let stats = pipeline.process(&CancellationToken::new()).await;

        assert_eq!(stats.fetched, 1);
        assert_eq!(stats.snapshots_written, 1);
        assert_eq!(stats.companies_classified, 1);
        assert!(stats.is_success());

        let company = store.get_company("acme.io").await.unwrap().unwrap();
        assert_eq!(company.business_type, BusinessType::ProductCompany);
        assert_eq!(company.canonical_name, "Acme");

        let snapshots = store.snapshots_for("acme.io").await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert!(snapshots[0].has(Signal::AtsBoardFound));
        assert_eq!(snapshots[0].source_url, "https://boards.greenhouse.io/acme");

        let lanes = pipeline.export(Utc::now()).await.unwrap();
        assert_eq!(lanes.outreach_mvp_client.len(), 1);
        assert_eq!(lanes.outreach_mvp_client[0].lead.route_flag, RouteFlag::OutreachMvpClient);
    }

    #[tokio::test]
    async fn test_unchanged_content_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        let first = pipeline(transport(), store.clone());
        let hit = SearchHit::new("https://boards.greenhouse.io/acme", 1);
        first.admit_hits("ats", SourceType::Hiring, "q", &[hit]).await;
        first.process(&CancellationToken::new()).await;

        let second = pipeline(transport(), store.clone()).rehydrate().await.unwrap();
        assert_eq!(second.ledger().len(), 1);
        let stats = second.process(&CancellationToken::new()).await;

        assert_eq!(stats.unchanged_skipped, 1);
        assert_eq!(stats.snapshots_written, 0);
        assert_eq!(store.snapshot_count(), 1);
    }

    #[tokio::test]
    async fn test_domain_is_classified_once_per_run() {
        let store = Arc::new(MemoryStore::new());
        let classifier = MockClassifier::returning(Classification::new(BusinessType::ProductCompany, 0.8));
        let transport = transport().with_page(
            "https://www.producthunt.com/posts/acme",
            r#"<html><head><title>Acme - the API dashboard</title></head><body>
               <a href="https://acme.io">Website</a></body></html>"#,
        );
        let pipeline = pipeline(transport, store.clone()).with_classifier(Arc::new(classifier.clone()));
        pipeline.ledger().admit(SourceType::Hiring, "https://boards.greenhouse.io/acme").unwrap();
        pipeline.ledger().admit(SourceType::Launch, "https://www.producthunt.com/posts/acme").unwrap();

        let stats = pipeline.process(&CancellationToken::new()).await;

        assert_eq!(stats.snapshots_written, 2);
        assert_eq!(stats.companies_classified, 1);
        assert_eq!(classifier.calls(), vec!["acme.io".to_string()]);
        assert_eq!(store.company_count(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_fatal() {
        let store = Arc::new(MemoryStore::new());
        let transport = transport().with_status("https://boards.greenhouse.io/gone", 404);
        let pipeline = pipeline(transport, store.clone());
        pipeline.ledger().admit(SourceType::Hiring, "https://boards.greenhouse.io/gone").unwrap();
        pipeline.ledger().admit(SourceType::Hiring, "https://boards.greenhouse.io/acme").unwrap();
        pipeline.ledger().admit(SourceType::Launch, "https://news.ycombinator.com/item").unwrap();

        let stats = pipeline.process(&CancellationToken::new()).await;

        assert_eq!(stats.fetch_failed, 2);
        assert_eq!(
            stats.failed_urls,
            vec![
                "https://boards.greenhouse.io/gone".to_string(),
                "https://news.ycombinator.com/item".to_string(),
            ]
        );
        assert_eq!(stats.snapshots_written, 1);
    }

    #[tokio::test]
    async fn test_cancelled_run_leaves_targets_recorded() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(transport(), store.clone());
        pipeline.ledger().admit(SourceType::Hiring, "https://boards.greenhouse.io/acme").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let stats = pipeline.process(&cancel).await;

        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.fetched, 0);
        assert_eq!(pipeline.fetcher().transport().calls().len(), 0);
        assert_eq!(pipeline.ledger().len(), 1);
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(transport(), store.clone());
        let provider = MockSearchProvider::new().with_hits(
            "site:boards.greenhouse.io engineer",
            vec![SearchHit::new("https://boards.greenhouse.io/acme/jobs/3", 1).with_title("DevOps Engineer")],
        );

        let stats = pipeline.run(&provider, &[hiring_pack()], &CancellationToken::new()).await;

        assert_eq!(stats.targets_new, 1);
        assert_eq!(stats.snapshots_written, 1);
        assert_eq!(provider.calls(), vec!["site:boards.greenhouse.io engineer".to_string()]);

        let leads = pipeline.project_leads(Utc::now()).await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].company_domain, "acme.io");
        assert!(leads[0].mvp_score > 0);
    }
}
