//! Keyword-count rule classifier.

use async_trait::async_trait;
use scraper::Html;
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::ClassifyError;
use crate::extract::html::{self, KeywordSet};
use crate::traits::classifier::{Classification, Classifier, PageKind, Pages};
use crate::types::{BusinessType, ClassifierConfig, CompanyHint, KeywordConfig};

/// Weighted keyword counts (`strong * 2 + moderate`) over a company's pages,
/// plus raw counts of the vocabularies that pick a services subtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordCounts {
    pub product: u32,
    pub services: u32,
    pub staffing: u32,
    pub consultancy_terms: u32,
    pub agency_terms: u32,
    pub integrator_terms: u32,
}

impl KeywordCounts {
    pub fn new(product: u32, services: u32, staffing: u32) -> Self {
        Self {
            product,
            services,
            staffing,
            ..Default::default()
        }
    }

    /// Evidence across the three main vocabularies.
    pub fn total(&self) -> u32 {
        self.product + self.services + self.staffing
    }

    fn services_subtype(&self) -> BusinessType {
        if self.consultancy_terms > 0 {
            BusinessType::Consultancy
        } else if self.agency_terms > 0 {
            BusinessType::ServiceAgency
        } else if self.integrator_terms > 0 {
            BusinessType::SystemIntegrator
        } else {
            BusinessType::ServiceAgency
        }
    }
}

/// Below this much total evidence, confidence is damped.
const THIN_EVIDENCE: u32 = 3;
const THIN_DAMPING: f32 = 0.7;
const STRONG_PAGE_BOOST: f32 = 0.05;

/// Apply the decision rules to keyword counts. First match wins.
///
/// `present` holds the page kinds that were actually fetched.
pub fn decide(counts: &KeywordCounts, present: &BTreeSet<PageKind>, config: &ClassifierConfig) -> Classification {
    let product = counts.product as i64;
    let services = counts.services as i64;
    let delta = config.services_product_delta as i64;
    let strong_page = present.iter().any(PageKind::is_strong_product_page);

    let mut result = if counts.staffing >= config.staffing_threshold {
        let confidence = (0.5 + counts.staffing as f32 / 10.0).min(0.9);
        Classification::new(BusinessType::StaffingRecruiter, confidence)
            .with_reason(format!("{} staffing indicators", counts.staffing))
    } else if services - product >= delta {
        let diff = (services - product) as f32;
        Classification::new(counts.services_subtype(), (0.5 + diff / 10.0).min(0.85)).with_reason(format!(
            "services indicators ({}) exceed product indicators ({})",
            services, product
        ))
    } else if product - services >= delta {
        let diff = (product - services) as f32;
        let mut confidence = (0.6 + diff / 10.0).min(0.9);
        if strong_page {
            confidence = (confidence + STRONG_PAGE_BOOST).min(0.95);
        }
        Classification::new(BusinessType::ProductCompany, confidence).with_reason(format!(
            "product indicators ({}) exceed services indicators ({})",
            product, services
        ))
    } else {
        Classification::new(BusinessType::Unknown, 0.3).with_reason("insufficient evidence")
    };

    if counts.total() < THIN_EVIDENCE {
        result.confidence *= THIN_DAMPING;
    }
    result.confidence = (result.confidence * 100.0).round() / 100.0;
    result
}

struct Vocabulary {
    product_strong: KeywordSet,
    product_moderate: KeywordSet,
    services_strong: KeywordSet,
    services_moderate: KeywordSet,
    staffing_strong: KeywordSet,
    staffing_moderate: KeywordSet,
    consultancy: KeywordSet,
    agency: KeywordSet,
    integrator: KeywordSet,
    hints: Vec<(CompanyHint, KeywordSet)>,
}

impl Vocabulary {
    fn new(k: &KeywordConfig) -> Self {
        Self {
            product_strong: KeywordSet::new(&k.product_strong),
            product_moderate: KeywordSet::new(&k.product_moderate),
            services_strong: KeywordSet::new(&k.services_strong),
            services_moderate: KeywordSet::new(&k.services_moderate),
            staffing_strong: KeywordSet::new(&k.staffing_strong),
            staffing_moderate: KeywordSet::new(&k.staffing_moderate),
            consultancy: KeywordSet::new(&k.consultancy_terms),
            agency: KeywordSet::new(&k.agency_terms),
            integrator: KeywordSet::new(&k.integrator_terms),
            hints: vec![
                (CompanyHint::IntegrationsPage, KeywordSet::new(&["integrations", "status page"])),
                (CompanyHint::EnterpriseNoise, KeywordSet::new(&k.enterprise_noise)),
                (CompanyHint::HugeHiring, KeywordSet::new(&k.huge_hiring)),
                (CompanyHint::PartnerFit, KeywordSet::new(&k.partner_fit)),
                (CompanyHint::ProductStudio, KeywordSet::new(&k.product_studio)),
                (CompanyHint::CaseStudies, KeywordSet::new(&k.case_studies)),
                (CompanyHint::InboundChannel, KeywordSet::new(&k.inbound_channel)),
                (CompanyHint::BroadAgency, KeywordSet::new(&k.broad_agency)),
            ],
        }
    }

    fn counts(&self, text: &str) -> KeywordCounts {
        KeywordCounts {
            product: self.product_strong.count(text) * 2 + self.product_moderate.count(text),
            services: self.services_strong.count(text) * 2 + self.services_moderate.count(text),
            staffing: self.staffing_strong.count(text) * 2 + self.staffing_moderate.count(text),
            consultancy_terms: self.consultancy.count(text),
            agency_terms: self.agency.count(text),
            integrator_terms: self.integrator.count(text),
        }
    }
}

/// Deterministic classifier over home, about and one supporting page.
pub struct RuleClassifier {
    config: ClassifierConfig,
    vocabulary: Vocabulary,
}

impl RuleClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            vocabulary: Vocabulary::new(&config.keywords),
            config,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Visible text of all pages, lowercased and joined.
    fn page_text(pages: &Pages) -> String {
        pages
            .values()
            .map(|raw| html::visible_text(&Html::parse_document(raw)))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Classify synchronously; the rule path never fails.
    pub fn classify_pages(&self, domain: &str, pages: &Pages) -> Classification {
        let text = Self::page_text(pages);
        if text.trim().is_empty() {
            debug!(domain = %domain, "No page text to classify");
            return Classification::unknown("no text content found on pages");
        }

        let counts = self.vocabulary.counts(&text);
        let present: BTreeSet<PageKind> = pages.keys().copied().collect();
        let mut result = decide(&counts, &present, &self.config);

        for (kind, hint) in [
            (PageKind::Pricing, CompanyHint::PricingPage),
            (PageKind::Docs, CompanyHint::DocsPage),
            (PageKind::Services, CompanyHint::ServicesPage),
        ] {
            if present.contains(&kind) {
                result.hints.insert(hint);
            }
        }
        for (hint, words) in &self.vocabulary.hints {
            if words.matches(&text) {
                result.hints.insert(*hint);
            }
        }
        if counts.staffing > 0 {
            result.hints.insert(CompanyHint::StaffingLanguage);
        }
        if result.hints.contains(&CompanyHint::EnterpriseNoise) {
            result.reasons.push("enterprise noise indicators detected".into());
        }

        debug!(
            domain = %domain,
            business_type = %result.business_type,
            confidence = result.confidence,
            product = counts.product,
            services = counts.services,
            staffing = counts.staffing,
            "Classification completed"
        );
        result
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

#[async_trait]
impl Classifier for RuleClassifier {
    async fn classify(&self, domain: &str, pages: &Pages) -> Result<Classification, ClassifyError> {
        Ok(self.classify_pages(domain, pages))
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}
