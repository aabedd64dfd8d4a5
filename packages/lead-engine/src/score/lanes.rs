//! The two ordered export lanes.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::types::{BusinessType, CompanyRecord, LeadRecord, RouteFlag};

/// A lead joined with the company fields an outreach list needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneEntry {
    pub company_name: String,
    pub website_url: String,
    pub business_type: BusinessType,
    pub confidence: f32,
    #[serde(flatten)]
    pub lead: LeadRecord,
}

impl LaneEntry {
    fn lane_score(&self) -> u32 {
        match self.lead.route_flag {
            RouteFlag::OutreachPartnership => self.lead.partnership_score,
            _ => self.lead.mvp_score,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lanes {
    pub outreach_mvp_client: Vec<LaneEntry>,
    pub outreach_partnership: Vec<LaneEntry>,
}

impl Lanes {
    pub fn len(&self) -> usize {
        self.outreach_mvp_client.len() + self.outreach_partnership.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split leads into their lanes, sorted by lane score descending and then
/// domain ascending. Ignored leads and leads without a company are dropped.
pub fn export_lanes(leads: &[LeadRecord], companies: &[CompanyRecord]) -> Lanes {
    let by_domain: HashMap<&str, &CompanyRecord> =
        companies.iter().map(|c| (c.domain.as_str(), c)).collect();

    let mut lanes = Lanes::default();
    for lead in leads {
        let Some(company) = by_domain.get(lead.company_domain.as_str()) else {
            continue;
        };
        let entry = LaneEntry {
            company_name: company.canonical_name.clone(),
            website_url: company.website_url.clone(),
            business_type: company.business_type,
            confidence: company.confidence,
            lead: lead.clone(),
        };
        match lead.route_flag {
            RouteFlag::OutreachMvpClient => lanes.outreach_mvp_client.push(entry),
            RouteFlag::OutreachPartnership => lanes.outreach_partnership.push(entry),
            RouteFlag::Ignore => {}
        }
    }

    for lane in [&mut lanes.outreach_mvp_client, &mut lanes.outreach_partnership] {
        lane.sort_by(|a, b| {
            Reverse(a.lane_score())
                .cmp(&Reverse(b.lane_score()))
                .then_with(|| a.lead.company_domain.cmp(&b.lead.company_domain))
        });
    }
    lanes
}
