//! Signal vocabulary and the typed per-source field sets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalize::BoardFamily;
use crate::types::records::SourceType;

/// A named fact extracted from fetched content.
///
/// Each source type draws from its own slice of this vocabulary. The
/// declaration order is the canonical ordering used in signal sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    // Hiring boards
    AtsBoardFound,
    HiringEngineering,
    HiringAi,
    HiringWeb3,
    HiringDevops,
    FoundingRole,
    ProductEngineerRole,

    // Launch posts
    LaunchPost,
    BuilderPost,

    // Funding announcements
    FundingAnnounced,
    AcceleratorMember,

    // Ecosystem directories
    EcosystemListed,
    GrantRecipient,
    HackathonWinner,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AtsBoardFound => "ats_board_found",
            Self::HiringEngineering => "hiring_engineering",
            Self::HiringAi => "hiring_ai",
            Self::HiringWeb3 => "hiring_web3",
            Self::HiringDevops => "hiring_devops",
            Self::FoundingRole => "founding_role",
            Self::ProductEngineerRole => "product_engineer_role",
            Self::LaunchPost => "launch_post",
            Self::BuilderPost => "builder_post",
            Self::FundingAnnounced => "funding_announced",
            Self::AcceleratorMember => "accelerator_member",
            Self::EcosystemListed => "ecosystem_listed",
            Self::GrantRecipient => "grant_recipient",
            Self::HackathonWinner => "hackathon_winner",
        }
    }

    /// The source type whose extractor may emit this signal.
    pub fn source_type(&self) -> SourceType {
        match self {
            Self::AtsBoardFound
            | Self::HiringEngineering
            | Self::HiringAi
            | Self::HiringWeb3
            | Self::HiringDevops
            | Self::FoundingRole
            | Self::ProductEngineerRole => SourceType::Hiring,
            Self::LaunchPost | Self::BuilderPost => SourceType::Launch,
            Self::FundingAnnounced | Self::AcceleratorMember => SourceType::Funding,
            Self::EcosystemListed | Self::GrantRecipient | Self::HackathonWinner => {
                SourceType::Ecosystem
            }
        }
    }

    /// Hiring signals strong enough to route an unclassified company.
    pub fn is_strong_hiring(&self) -> bool {
        matches!(self, Self::HiringEngineering)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields extracted from a hiring board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiringFields {
    pub board_family: Option<BoardFamily>,
    pub jobs_count: u32,
    pub engineering_roles_count: u32,
    /// Role taxonomy tags, sorted
    pub roles_detected: Vec<String>,
    /// First twenty job titles in page order
    pub job_titles: Vec<String>,
    pub company_website_url: Option<String>,
}

/// Fields extracted from a launch post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchFields {
    pub product_name: Option<String>,
    pub product_url: Option<String>,
    pub launch_date: Option<NaiveDate>,
    pub company_website_url: Option<String>,
}

/// Funding round as announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingRound {
    PreSeed,
    Seed,
    SeriesA,
    SeriesB,
    Later,
}

impl FundingRound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreSeed => "pre-seed",
            Self::Seed => "seed",
            Self::SeriesA => "Series A",
            Self::SeriesB => "Series B",
            Self::Later => "growth",
        }
    }

    /// Pre-seed and seed rounds share the early-stage boost.
    pub fn is_early(&self) -> bool {
        matches!(self, Self::PreSeed | Self::Seed)
    }
}

/// Fields extracted from a funding or accelerator announcement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingFields {
    pub accelerator_name: Option<String>,
    pub batch: Option<String>,
    pub funding_round: Option<FundingRound>,
    pub amount_usd: Option<u64>,
    pub funding_date: Option<NaiveDate>,
    pub company_website_url: Option<String>,
}

/// Kind of ecosystem program a listing belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramType {
    Directory,
    Grant,
    Hackathon,
}

/// Fields extracted from an ecosystem directory or program page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcosystemFields {
    pub ecosystem_tag: Option<String>,
    pub program_type: Option<ProgramType>,
    pub program_name: Option<String>,
    pub project_url: Option<String>,
}

/// The typed field set of one extraction, tagged by source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ExtractedFields {
    Hiring(HiringFields),
    Launch(LaunchFields),
    Funding(FundingFields),
    Ecosystem(EcosystemFields),
}

impl ExtractedFields {
    /// A field set with every field absent.
    pub fn empty(source_type: SourceType) -> Self {
        match source_type {
            SourceType::Hiring => Self::Hiring(HiringFields::default()),
            SourceType::Launch => Self::Launch(LaunchFields::default()),
            SourceType::Funding => Self::Funding(FundingFields::default()),
            SourceType::Ecosystem => Self::Ecosystem(EcosystemFields::default()),
        }
    }

    pub fn source_type(&self) -> SourceType {
        match self {
            Self::Hiring(_) => SourceType::Hiring,
            Self::Launch(_) => SourceType::Launch,
            Self::Funding(_) => SourceType::Funding,
            Self::Ecosystem(_) => SourceType::Ecosystem,
        }
    }

    /// Explicit company website candidates, most trusted first.
    pub fn website_candidates(&self) -> Vec<&str> {
        let candidates = match self {
            Self::Hiring(h) => vec![h.company_website_url.as_deref()],
            Self::Launch(l) => vec![l.company_website_url.as_deref(), l.product_url.as_deref()],
            Self::Funding(f) => vec![f.company_website_url.as_deref()],
            Self::Ecosystem(e) => vec![e.project_url.as_deref()],
        };
        candidates.into_iter().flatten().collect()
    }

    /// Company display name, when the page names the product itself.
    ///
    /// Ecosystem program titles name the directory, not the company.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Self::Launch(l) => l.product_name.as_deref(),
            _ => None,
        }
    }

    pub fn as_hiring(&self) -> Option<&HiringFields> {
        match self {
            Self::Hiring(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_launch(&self) -> Option<&LaunchFields> {
        match self {
            Self::Launch(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_funding(&self) -> Option<&FundingFields> {
        match self {
            Self::Funding(f) => Some(f),
            _ => None,
        }
    }
}
