//! Plain records exchanged with callers.
//!
//! The engine owns none of these durably; callers persist them however they
//! like and hand them back for the next run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::types::signals::{ExtractedFields, Signal};

/// Category of the page a discovery target came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Hiring,
    Launch,
    Funding,
    Ecosystem,
}

impl SourceType {
    pub const ALL: [SourceType; 4] = [Self::Hiring, Self::Launch, Self::Funding, Self::Ecosystem];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hiring => "hiring",
            Self::Launch => "launch",
            Self::Funding => "funding",
            Self::Ecosystem => "ecosystem",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business type assigned by classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    ProductCompany,
    ServiceAgency,
    Consultancy,
    SystemIntegrator,
    StaffingRecruiter,
    OpenSourceCommunity,
    Unknown,
}

impl Default for BusinessType {
    fn default() -> Self {
        Self::Unknown
    }
}

impl BusinessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductCompany => "product_company",
            Self::ServiceAgency => "service_agency",
            Self::Consultancy => "consultancy",
            Self::SystemIntegrator => "system_integrator",
            Self::StaffingRecruiter => "staffing_recruiter",
            Self::OpenSourceCommunity => "open_source_community",
            Self::Unknown => "unknown",
        }
    }

    /// Agencies, consultancies and integrators.
    pub fn is_services_family(&self) -> bool {
        matches!(
            self,
            Self::ServiceAgency | Self::Consultancy | Self::SystemIntegrator
        )
    }
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final lane assignment for a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteFlag {
    OutreachMvpClient,
    OutreachPartnership,
    Ignore,
}

impl RouteFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutreachMvpClient => "outreach_mvp_client",
            Self::OutreachPartnership => "outreach_partnership",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for RouteFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommended outreach channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    XDm,
    LinkedinDm,
    PartnerIntro,
    Email,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::XDm => "x_dm",
            Self::LinkedinDm => "linkedin_dm",
            Self::PartnerIntro => "partner_intro",
            Self::Email => "email",
        }
    }
}

/// Priority within a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Normal,
    Low,
}

/// Search evidence recorded with the first sighting of a target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryEvidence {
    pub query_pack: Option<String>,
    pub query: Option<String>,
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub rank: Option<u32>,
}

/// A normalized URL queued for fetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryTarget {
    pub source_type: SourceType,
    pub raw_url: String,
    pub normalized_url: String,
    pub source_domain: String,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub seen_count: u32,
    #[serde(default)]
    pub query_evidence: Option<QueryEvidence>,
}

/// Result of one successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub normalized_url: String,
    /// URL after redirects
    pub final_url: String,
    pub status_code: u16,
    /// Lowercase hex SHA-256 of `body`
    pub content_hash: String,
    pub body: Vec<u8>,
    pub fetched_at: DateTime<Utc>,
}

impl FetchResult {
    pub fn new(
        normalized_url: impl Into<String>,
        status_code: u16,
        body: Vec<u8>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let normalized_url = normalized_url.into();
        Self {
            final_url: normalized_url.clone(),
            normalized_url,
            status_code,
            content_hash: Self::hash_body(&body),
            body,
            fetched_at,
        }
    }

    pub fn with_final_url(mut self, final_url: impl Into<String>) -> Self {
        self.final_url = final_url.into();
        self
    }

    /// SHA-256 of the body as lowercase hex.
    pub fn hash_body(body: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(body);
        hex::encode(hasher.finalize())
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Whether the entry is still inside the cache time-to-live.
    pub fn is_fresh(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at) < ttl
    }
}

/// Append-only evidence for one (domain, source, fetch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub company_domain: String,
    pub source_type: SourceType,
    pub source_url: String,
    pub signals: BTreeSet<Signal>,
    pub details: ExtractedFields,
    pub content_hash: String,
    pub fetched_at: DateTime<Utc>,
}

impl SignalSnapshot {
    pub fn has(&self, signal: Signal) -> bool {
        self.signals.contains(&signal)
    }
}

/// Page-level indicators the classifier found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyHint {
    PricingPage,
    DocsPage,
    IntegrationsPage,
    ServicesPage,
    EnterpriseNoise,
    HugeHiring,
    PartnerFit,
    ProductStudio,
    CaseStudies,
    InboundChannel,
    BroadAgency,
    StaffingLanguage,
}

impl CompanyHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PricingPage => "pricing_page",
            Self::DocsPage => "docs_page",
            Self::IntegrationsPage => "integrations_page",
            Self::ServicesPage => "services_page",
            Self::EnterpriseNoise => "enterprise_noise",
            Self::HugeHiring => "huge_hiring",
            Self::PartnerFit => "partner_fit",
            Self::ProductStudio => "product_studio",
            Self::CaseStudies => "case_studies",
            Self::InboundChannel => "inbound_channel",
            Self::BroadAgency => "broad_agency",
            Self::StaffingLanguage => "staffing_language",
        }
    }
}

/// Canonical company, upserted by domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub domain: String,
    pub canonical_name: String,
    pub website_url: String,
    pub business_type: BusinessType,
    pub confidence: f32,
    pub reasons: Vec<String>,
    #[serde(default)]
    pub hints: BTreeSet<CompanyHint>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl CompanyRecord {
    /// A freshly identified company with no classification yet.
    pub fn new(domain: impl Into<String>, seen_at: DateTime<Utc>) -> Self {
        let domain = domain.into();
        Self {
            canonical_name: name_from_domain(&domain),
            website_url: format!("https://{}", domain),
            domain,
            business_type: BusinessType::Unknown,
            confidence: 0.0,
            reasons: Vec::new(),
            hints: BTreeSet::new(),
            first_seen_at: seen_at,
            last_seen_at: seen_at,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.canonical_name = name.into();
        self
    }

    pub fn with_classification(
        mut self,
        business_type: BusinessType,
        confidence: f32,
        reasons: Vec<String>,
    ) -> Self {
        self.business_type = business_type;
        self.confidence = confidence;
        self.reasons = reasons;
        self
    }

    pub fn with_hint(mut self, hint: CompanyHint) -> Self {
        self.hints.insert(hint);
        self
    }

    pub fn has_hint(&self, hint: CompanyHint) -> bool {
        self.hints.contains(&hint)
    }
}

/// Capitalized first label of a domain, e.g. `acme.io` -> `Acme`.
pub fn name_from_domain(domain: &str) -> String {
    let label = domain.split('.').next().unwrap_or(domain);
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Point contributions behind both scores, keyed by rule name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub mvp: BTreeMap<String, i32>,
    pub partnership: BTreeMap<String, i32>,
}

/// Routable lead, recomputed from company + snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub company_domain: String,
    pub route_flag: RouteFlag,
    pub priority: Priority,
    pub mvp_score: u32,
    pub partnership_score: u32,
    pub score_breakdown: ScoreBreakdown,
    pub recommended_channel: Option<Channel>,
    pub outreach_note: String,
}
