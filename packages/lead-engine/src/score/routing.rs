//! Lane, priority and channel assignment.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::score::scoring::{Evidence, Scores};
use crate::types::{
    BusinessType, Channel, CompanyRecord, Priority, RouteFlag, RoutingConfig, Signal, SignalSnapshot,
    SourceType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub route_flag: RouteFlag,
    pub priority: Priority,
    /// `None` for ignored leads
    pub channel: Option<Channel>,
}

impl RouteDecision {
    fn ignore() -> Self {
        Self {
            route_flag: RouteFlag::Ignore,
            priority: Priority::Low,
            channel: None,
        }
    }
}

fn tiered(score: u32, high_at: u32) -> Priority {
    if score >= high_at {
        Priority::High
    } else {
        Priority::Normal
    }
}

/// Channel for the MVP lane, from the freshest kind of evidence present.
fn mvp_channel(evidence: &Evidence) -> Channel {
    let from = |source: SourceType| evidence.signals.iter().any(|s| s.source_type() == source);
    if from(SourceType::Launch) || from(SourceType::Ecosystem) {
        Channel::XDm
    } else if from(SourceType::Hiring) {
        Channel::LinkedinDm
    } else {
        Channel::Email
    }
}

/// Route a scored company.
pub fn route(
    company: &CompanyRecord,
    scores: &Scores,
    snapshots: &[SignalSnapshot],
    config: &RoutingConfig,
) -> RouteDecision {
    let evidence = Evidence::gather(snapshots);

    let decision = match company.business_type {
        BusinessType::StaffingRecruiter => RouteDecision::ignore(),
        t if t.is_services_family() => RouteDecision {
            route_flag: RouteFlag::OutreachPartnership,
            priority: tiered(scores.partnership_score, config.partnership_high_priority_score),
            channel: Some(Channel::PartnerIntro),
        },
        BusinessType::ProductCompany => RouteDecision {
            route_flag: RouteFlag::OutreachMvpClient,
            priority: tiered(scores.mvp_score, config.mvp_high_priority_score),
            channel: Some(mvp_channel(&evidence)),
        },
        BusinessType::Unknown
            if evidence.engineering_roles >= config.strong_hiring_threshold
                || evidence.has(Signal::HiringEngineering) =>
        {
            RouteDecision {
                route_flag: RouteFlag::OutreachMvpClient,
                priority: Priority::Low,
                channel: Some(mvp_channel(&evidence)),
            }
        }
        _ => RouteDecision::ignore(),
    };

    debug!(
        domain = %company.domain,
        business_type = %company.business_type,
        route = %decision.route_flag,
        "Routing completed"
    );
    decision
}
