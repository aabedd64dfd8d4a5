//! Business-type classifier contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::ClassifyError;
use crate::types::{BusinessType, CompanyHint};

/// Company pages a classifier may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Home,
    About,
    Pricing,
    Docs,
    Services,
}

impl PageKind {
    /// Site path the page is fetched from.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "",
            Self::About => "/about",
            Self::Pricing => "/pricing",
            Self::Docs => "/docs",
            Self::Services => "/services",
        }
    }

    /// Third-page candidates in the order they are tried.
    pub const SUPPORTING: [PageKind; 3] = [Self::Pricing, Self::Docs, Self::Services];

    /// Pages whose mere existence points at a product.
    pub fn is_strong_product_page(&self) -> bool {
        matches!(self, Self::Pricing | Self::Docs)
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Pricing => "pricing",
            Self::Docs => "docs",
            Self::Services => "services",
        };
        f.write_str(name)
    }
}

/// Page contents keyed by kind.
pub type Pages = BTreeMap<PageKind, String>;

/// Classifier verdict for one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub business_type: BusinessType,
    /// In `[0, 1]`
    pub confidence: f32,
    pub reasons: Vec<String>,
    #[serde(default)]
    pub hints: BTreeSet<CompanyHint>,
}

impl Classification {
    pub fn unknown(reason: impl Into<String>) -> Self {
        Self {
            business_type: BusinessType::Unknown,
            confidence: 0.0,
            reasons: vec![reason.into()],
            hints: BTreeSet::new(),
        }
    }

    pub fn new(business_type: BusinessType, confidence: f32) -> Self {
        Self {
            business_type,
            confidence: confidence.clamp(0.0, 1.0),
            reasons: Vec::new(),
            hints: BTreeSet::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }

    pub fn with_hint(mut self, hint: CompanyHint) -> Self {
        self.hints.insert(hint);
        self
    }
}

/// Assigns a business type from a company's pages.
///
/// The rule classifier and any secondary classifier share this contract so
/// they can be chained behind a trigger predicate.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, domain: &str, pages: &Pages) -> Result<Classification, ClassifyError>;

    /// Name recorded in reasons and logs.
    fn name(&self) -> &'static str {
        "classifier"
    }
}
