//! Source-specific signal extraction.
//!
//! One extractor per [`SourceType`], all behind [`SignalExtractor`].
//! [`Extractors::extract`] dispatches on the source type and never fails:
//! malformed content becomes an empty result carrying a diagnostic.

pub mod ecosystem;
pub mod funding;
pub mod hiring;
pub mod html;
pub mod launch;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::ExtractionError;
use crate::types::{ExtractConfig, ExtractedFields, Signal, SourceType};

pub use ecosystem::EcosystemExtractor;
pub use funding::FundingExtractor;
pub use hiring::HiringExtractor;
pub use launch::LaunchExtractor;

/// Signals and typed fields pulled from one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub source_type: SourceType,
    pub signals: BTreeSet<Signal>,
    pub fields: ExtractedFields,
    /// Why the result is empty, when it is
    pub diagnostic: Option<String>,
}

impl ExtractionResult {
    pub fn new(fields: ExtractedFields) -> Self {
        Self {
            source_type: fields.source_type(),
            signals: BTreeSet::new(),
            fields,
            diagnostic: None,
        }
    }

    /// Empty result for content that could not be read.
    pub fn empty(source_type: SourceType, diagnostic: impl Into<String>) -> Self {
        Self {
            source_type,
            signals: BTreeSet::new(),
            fields: ExtractedFields::empty(source_type),
            diagnostic: Some(diagnostic.into()),
        }
    }

    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signals.insert(signal);
        self
    }

    pub(crate) fn signal_if(&mut self, condition: bool, signal: Signal) {
        if condition {
            self.signals.insert(signal);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

/// Turns one source type's pages into signals.
pub trait SignalExtractor: Send + Sync {
    fn source_type(&self) -> SourceType;

    /// Extract from decoded markup. `url` is the normalized page URL.
    fn extract(&self, url: &str, html: &str) -> Result<ExtractionResult, ExtractionError>;
}

/// The four extractors, dispatched by source type.
pub struct Extractors {
    hiring: HiringExtractor,
    launch: LaunchExtractor,
    funding: FundingExtractor,
    ecosystem: EcosystemExtractor,
}

impl Extractors {
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            hiring: HiringExtractor::new(config),
            launch: LaunchExtractor::new(),
            funding: FundingExtractor::new(),
            ecosystem: EcosystemExtractor::new(),
        }
    }

    pub fn for_source(&self, source_type: SourceType) -> &dyn SignalExtractor {
        match source_type {
            SourceType::Hiring => &self.hiring,
            SourceType::Launch => &self.launch,
            SourceType::Funding => &self.funding,
            SourceType::Ecosystem => &self.ecosystem,
        }
    }

    /// Extract signals from raw fetched content.
    pub fn extract(&self, source_type: SourceType, url: &str, content: &[u8]) -> ExtractionResult {
        let outcome = html::decode(content)
            .and_then(|text| self.for_source(source_type).extract(url, text));

        match outcome {
            Ok(result) => {
                debug!(
                    url = %url,
                    source = %source_type,
                    signals = result.signals.len(),
                    "Extracted signals"
                );
                result
            }
            Err(e) => {
                debug!(url = %url, source = %source_type, error = %e, "Extraction produced no signals");
                ExtractionResult::empty(source_type, e.to_string())
            }
        }
    }
}

impl Default for Extractors {
    fn default() -> Self {
        Self::new(&ExtractConfig::default())
    }
}
