//! Lead Signal Engine
//!
//! A batch discovery-to-lead pipeline. Search results become deduplicated
//! targets, targets become fetched pages, pages become typed signals, and
//! signals plus a business-type classification become scored, routed leads.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lead_engine::{EngineConfig, HttpTransport, MemoryStore, Pipeline};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = EngineConfig::from_env()?;
//! let store = Arc::new(MemoryStore::new());
//! let pipeline = Pipeline::new(HttpTransport::new(&config.fetch)?, store.clone(), config)?
//!     .with_cache(store);
//!
//! let stats = pipeline.run(&provider, &packs, &CancellationToken::new()).await;
//! let lanes = pipeline.export(chrono::Utc::now()).await?;
//! ```
//!
//! # Modules
//!
//! - [`normalize`] - URL canonicalization and job-board reduction
//! - [`ledger`] - Dedup ledger over normalized URLs
//! - [`fetch`] - Rate-limited, cached fetching with per-host cooldowns
//! - [`extract`] - Per-source signal extraction
//! - [`resolve`] - Company-domain resolution
//! - [`classify`] - Rule classifier and the secondary-classifier chain
//! - [`score`] - Scoring, routing, outreach notes and export lanes
//! - [`pipeline`] - Batch orchestration
//! - [`traits`] - Search, storage, cache and classifier seams
//! - [`stores`] - Storage implementations (MemoryStore)
//! - [`testing`] - Mock implementations for testing

pub mod classify;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod ledger;
pub mod normalize;
pub mod pipeline;
pub mod resolve;
pub mod score;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{
    ClassifyError, ConfigError, EngineError, ExtractionError, FetchError, NormalizeError, Result,
    SearchError, StoreError, StoreResult, TransportError,
};
pub use traits::{
    cache::FetchCache,
    classifier::{Classification, Classifier, PageKind, Pages},
    search::{QueryPack, SearchHit, SearchParams, SearchProvider},
    store::{merge_company, RecordStore},
};
pub use types::{
    BusinessType, Channel, CompanyHint, CompanyRecord, DiscoveryTarget, EngineConfig,
    ExtractedFields, FetchResult, LeadRecord, Priority, QueryEvidence, RouteFlag, Signal,
    SignalSnapshot, SourceType,
};

pub use classify::{BudgetedClassifier, ClassifierChain, RuleClassifier};
pub use extract::{ExtractionResult, Extractors, SignalExtractor};
pub use fetch::{Fetcher, HttpTransport, Transport, TransportResponse};
pub use ledger::DedupLedger;
pub use normalize::{BoardFamily, UrlNormalizer};
pub use pipeline::{Pipeline, RunStats};
pub use resolve::resolve;
pub use score::{export_lanes, project_lead, LaneEntry, Lanes};
pub use stores::MemoryStore;

// Re-export testing utilities
pub use testing::{MockClassifier, MockSearchProvider, MockTransport};
