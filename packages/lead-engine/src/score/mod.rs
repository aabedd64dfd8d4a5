//! Scoring, routing and lead projection.
//!
//! A lead is a pure projection of one company record plus all snapshots for
//! its domain at an explicit as-of time, so it can be recomputed at will.

pub mod lanes;
pub mod note;
pub mod routing;
pub mod scoring;

use chrono::{DateTime, Utc};

use crate::types::{CompanyRecord, LeadRecord, RoutingConfig, ScoringConfig, SignalSnapshot};

pub use lanes::{export_lanes, LaneEntry, Lanes};
pub use note::outreach_note;
pub use routing::{route, RouteDecision};
pub use scoring::{score, Scores};

/// Score, route and annotate one company.
pub fn project_lead(
    company: &CompanyRecord,
    snapshots: &[SignalSnapshot],
    as_of: DateTime<Utc>,
    scoring: &ScoringConfig,
    routing: &RoutingConfig,
) -> LeadRecord {
    let scores = score(company, snapshots, as_of, scoring);
    let decision = route(company, &scores, snapshots, routing);
    LeadRecord {
        company_domain: company.domain.clone(),
        route_flag: decision.route_flag,
        priority: decision.priority,
        mvp_score: scores.mvp_score,
        partnership_score: scores.partnership_score,
        outreach_note: outreach_note(&decision, snapshots),
        score_breakdown: scores.breakdown,
        recommended_channel: decision.channel,
    }
}
