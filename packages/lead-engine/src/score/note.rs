//! One-line outreach notes.

use crate::score::routing::RouteDecision;
use crate::types::{ExtractedFields, RouteFlag, Signal, SignalSnapshot};

/// Build the outreach note from the strongest evidence available.
///
/// Evidence is consulted in a fixed order: partnership lane, hiring roles,
/// launched product, accelerator, funding round, then a generic line.
/// Within a kind the newest snapshot wins (ties by source URL), whatever
/// order the store returned them in.
pub fn outreach_note(decision: &RouteDecision, snapshots: &[SignalSnapshot]) -> String {
    if decision.route_flag == RouteFlag::OutreachPartnership {
        return "Looks like you ship MVPs for clients. Open to a partnership for overflow engineering and AI/Web3 builds?"
            .to_string();
    }

    let mut ordered: Vec<&SignalSnapshot> = snapshots.iter().collect();
    ordered.sort_by(|a, b| {
        b.fetched_at
            .cmp(&a.fetched_at)
            .then_with(|| a.source_url.cmp(&b.source_url))
    });
    let snapshots = ordered;

    let has = |signal: Signal| snapshots.iter().any(|s| s.has(signal));

    if has(Signal::HiringEngineering) || has(Signal::AtsBoardFound) {
        let hiring = snapshots.iter().filter_map(|s| match &s.details {
            ExtractedFields::Hiring(h) => Some(h),
            _ => None,
        });
        let mut roles: Vec<&str> = Vec::new();
        let mut engineering = 0;
        for h in hiring {
            engineering = engineering.max(h.engineering_roles_count);
            for role in &h.roles_detected {
                if !roles.contains(&role.as_str()) {
                    roles.push(role);
                }
            }
        }
        let what = if !roles.is_empty() {
            format!("hiring {} roles", roles.iter().take(2).copied().collect::<Vec<_>>().join("/"))
        } else if engineering > 0 {
            format!("hiring {} engineering roles", engineering)
        } else {
            "hiring".to_string()
        };
        return format!(
            "Noticed you're {}. Execution bandwidth is usually tight at this stage; happy to help speed things up.",
            what
        );
    }

    let launch_name = snapshots.iter().find_map(|s| match &s.details {
        ExtractedFields::Launch(l) if s.has(Signal::LaunchPost) => Some(l.product_name.as_deref()),
        _ => None,
    });
    if let Some(name) = launch_name {
        return match name {
            Some(name) => format!("Saw your recent launch of {}. Happy to share a quick teardown to speed up iteration.", name),
            None => "Saw your recent launch. Happy to share a quick teardown to speed up iteration.".to_string(),
        };
    }

    let funding = snapshots.iter().filter_map(|s| s.details.as_funding());
    let mut accelerator = None;
    let mut round = None;
    for f in funding {
        accelerator = accelerator.or(f.accelerator_name.as_deref());
        round = round.or(f.funding_round);
    }

    if has(Signal::AcceleratorMember) {
        return format!(
            "Noticed you're part of {}. Congrats! Happy to help with execution bandwidth.",
            accelerator.unwrap_or("an accelerator")
        );
    }
    if has(Signal::FundingAnnounced) {
        let round = round.map(|r| r.as_str()).unwrap_or("funding");
        return format!("Congrats on your {} round! Happy to help with execution bandwidth as you scale.", round);
    }

    "Would love to explore how we can help with your technical execution needs.".to_string()
}
