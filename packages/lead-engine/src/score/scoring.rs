//! MVP-intent and partnership-fit scores.
//!
//! Both scores are clamped weighted sums over a company's hints and every
//! snapshot recorded for its domain. Evidence of one kind counts once, at
//! its best value; different kinds add independently.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::types::{
    BusinessType, CompanyHint, CompanyRecord, ExtractedFields, FundingRound, MvpWeights,
    PartnershipWeights, RecencyBoost, ScoreBreakdown, ScoringConfig, Signal, SignalSnapshot,
};

/// Both lane scores with their point breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub mvp_score: u32,
    pub partnership_score: u32,
    pub breakdown: ScoreBreakdown,
}

/// Facts pooled from every snapshot of one domain.
#[derive(Debug, Default)]
pub(crate) struct Evidence {
    pub signals: BTreeSet<Signal>,
    pub engineering_roles: u32,
    pub roles: BTreeSet<String>,
    /// Launch dates (publish date, or fetch date when absent)
    pub launches: Vec<NaiveDate>,
    pub fundings: Vec<(Option<FundingRound>, NaiveDate)>,
}

impl Evidence {
    pub fn gather(snapshots: &[SignalSnapshot]) -> Self {
        let mut evidence = Self::default();
        for snapshot in snapshots {
            evidence.signals.extend(snapshot.signals.iter().copied());
            let fetched = snapshot.fetched_at.date_naive();
            match &snapshot.details {
                ExtractedFields::Hiring(h) => {
                    evidence.engineering_roles = evidence.engineering_roles.max(h.engineering_roles_count);
                    evidence.roles.extend(h.roles_detected.iter().cloned());
                }
                ExtractedFields::Launch(l) if snapshot.has(Signal::LaunchPost) => {
                    evidence.launches.push(l.launch_date.unwrap_or(fetched));
                }
                ExtractedFields::Funding(f) if snapshot.has(Signal::FundingAnnounced) => {
                    evidence
                        .fundings
                        .push((f.funding_round, f.funding_date.unwrap_or(fetched)));
                }
                _ => {}
            }
        }
        evidence
    }

    pub fn has(&self, signal: Signal) -> bool {
        self.signals.contains(&signal)
    }
}

/// Best value of a boost over several dated pieces of evidence.
fn best_boost(boost: &RecencyBoost, dates: impl Iterator<Item = NaiveDate>, as_of: NaiveDate) -> i32 {
    dates
        .map(|d| boost.value((as_of - d).num_days()))
        .max()
        .unwrap_or(0)
}

struct Tally<'a> {
    points: i64,
    breakdown: &'a mut BTreeMap<String, i32>,
}

impl<'a> Tally<'a> {
    fn new(breakdown: &'a mut BTreeMap<String, i32>) -> Self {
        Self { points: 0, breakdown }
    }

    fn add_if(&mut self, condition: bool, key: &str, points: i32) {
        if condition && points != 0 {
            self.points += points as i64;
            self.breakdown.insert(key.to_string(), points);
        }
    }

    fn clamped(&self) -> u32 {
        self.points.clamp(0, 100) as u32
    }
}

fn mvp_score(
    company: &CompanyRecord,
    evidence: &Evidence,
    as_of: NaiveDate,
    w: &MvpWeights,
    breakdown: &mut BTreeMap<String, i32>,
) -> u32 {
    let mut t = Tally::new(breakdown);

    t.add_if(evidence.has(Signal::AtsBoardFound), "ats_board_found", w.ats_board_found);
    if let Some((key, points)) = w.engineering_roles.bucket(evidence.engineering_roles) {
        t.add_if(true, key, points);
    }
    t.add_if(evidence.has(Signal::FoundingRole), "founding_role", w.founding_role);
    t.add_if(
        w.relevant_roles.iter().any(|r| evidence.roles.contains(r)),
        "relevant_role_tags",
        w.relevant_role_tags,
    );
    t.add_if(evidence.has(Signal::ProductEngineerRole), "product_engineer_role", w.product_engineer_role);

    t.add_if(company.has_hint(CompanyHint::PricingPage), "pricing_page", w.pricing_page);
    t.add_if(company.has_hint(CompanyHint::DocsPage), "docs_page", w.docs_page);
    t.add_if(company.has_hint(CompanyHint::IntegrationsPage), "integrations_page", w.integrations_page);

    let launch = best_boost(&w.launch, evidence.launches.iter().copied(), as_of);
    t.add_if(true, "recent_launch", launch);
    t.add_if(evidence.has(Signal::BuilderPost), "builder_post", w.builder_post);

    // Rounds without a name share the early-stage boost; later rounds earn none.
    let early = best_boost(
        &w.early_funding,
        evidence
            .fundings
            .iter()
            .filter(|(round, _)| round.map_or(true, |r| r.is_early()))
            .map(|(_, date)| *date),
        as_of,
    );
    t.add_if(true, "early_funding", early);
    let series_a = best_boost(
        &w.series_a_funding,
        evidence
            .fundings
            .iter()
            .filter(|(round, _)| *round == Some(FundingRound::SeriesA))
            .map(|(_, date)| *date),
        as_of,
    );
    t.add_if(true, "series_a_funding", series_a);

    t.add_if(evidence.has(Signal::AcceleratorMember), "accelerator_member", w.accelerator_member);
    t.add_if(evidence.has(Signal::EcosystemListed), "ecosystem_listed", w.ecosystem_listed);
    t.add_if(
        evidence.has(Signal::GrantRecipient) || evidence.has(Signal::HackathonWinner),
        "grant_or_hackathon",
        w.grant_or_hackathon,
    );

    t.add_if(company.business_type.is_services_family(), "services_penalty", w.services_penalty);
    t.add_if(
        company.business_type == BusinessType::StaffingRecruiter,
        "staffing_penalty",
        w.staffing_penalty,
    );
    t.add_if(
        company.has_hint(CompanyHint::EnterpriseNoise),
        "enterprise_noise_penalty",
        w.enterprise_noise_penalty,
    );
    t.add_if(company.has_hint(CompanyHint::HugeHiring), "huge_hiring_penalty", w.huge_hiring_penalty);

    t.clamped()
}

fn partnership_score(
    company: &CompanyRecord,
    evidence: &Evidence,
    w: &PartnershipWeights,
    breakdown: &mut BTreeMap<String, i32>,
) -> u32 {
    if !company.business_type.is_services_family() {
        return 0;
    }
    let mut t = Tally::new(breakdown);

    t.add_if(true, "services_type", w.services_type);
    t.add_if(company.has_hint(CompanyHint::ProductStudio), "product_studio", w.product_studio);
    t.add_if(company.has_hint(CompanyHint::PartnerFit), "partner_fit", w.partner_fit);
    t.add_if(
        evidence.engineering_roles > 0 || evidence.has(Signal::HiringEngineering),
        "hiring_engineers",
        w.hiring_engineers,
    );
    t.add_if(
        evidence.has(Signal::HiringAi)
            || evidence.has(Signal::HiringWeb3)
            || evidence.roles.contains("ml_ai")
            || evidence.roles.contains("web3"),
        "niche_alignment",
        w.niche_alignment,
    );
    t.add_if(company.has_hint(CompanyHint::CaseStudies), "case_studies", w.case_studies);
    t.add_if(company.has_hint(CompanyHint::InboundChannel), "inbound_channel", w.inbound_channel);
    t.add_if(
        company.has_hint(CompanyHint::StaffingLanguage),
        "staffing_language_penalty",
        w.staffing_language_penalty,
    );
    t.add_if(company.has_hint(CompanyHint::BroadAgency), "broad_agency_penalty", w.broad_agency_penalty);

    t.clamped()
}

/// Score a company from its record and all of its snapshots, as of `as_of`.
///
/// Pure: identical inputs always produce identical scores.
pub fn score(
    company: &CompanyRecord,
    snapshots: &[SignalSnapshot],
    as_of: DateTime<Utc>,
    config: &ScoringConfig,
) -> Scores {
    let evidence = Evidence::gather(snapshots);
    let as_of = as_of.date_naive();
    let mut breakdown = ScoreBreakdown::default();

    let mvp = mvp_score(company, &evidence, as_of, &config.mvp, &mut breakdown.mvp);
    let partnership = partnership_score(company, &evidence, &config.partnership, &mut breakdown.partnership);

    debug!(
        domain = %company.domain,
        mvp_score = mvp,
        partnership_score = partnership,
        "Scoring completed"
    );

    Scores {
        mvp_score: mvp,
        partnership_score: partnership,
        breakdown,
    }
}
