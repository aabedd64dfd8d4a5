//! Ecosystem directory, grant and hackathon extraction.

use scraper::Html;
use url::Url;

use crate::error::ExtractionError;
use crate::extract::html::{self, KeywordSet};
use crate::extract::{ExtractionResult, SignalExtractor};
use crate::resolve::is_platform_host;
use crate::types::{EcosystemFields, ExtractedFields, ProgramType, Signal, SourceType};

/// Ecosystem tag and the words that mention it.
const ECOSYSTEMS: [(&str, &[&str]); 10] = [
    ("ethereum", &["ethereum", "eth", "evm"]),
    ("solana", &["solana"]),
    ("polygon", &["polygon"]),
    ("base", &["base chain", "onchain summer", "built on base"]),
    ("near", &["near protocol"]),
    ("cosmos", &["cosmos", "ibc"]),
    ("openai", &["openai", "gpt-4", "chatgpt"]),
    ("aws", &["aws activate", "amazon web services"]),
    ("google_cloud", &["google cloud", "gcp"]),
    ("microsoft", &["microsoft for startups", "azure"]),
];

const HACKATHON_WORDS: [&str; 2] = ["hackathon", "hack week"];
const WINNER_WORDS: [&str; 6] = ["winner", "winners", "prize", "finalist", "finalists", "1st place"];
const GRANT_WORDS: [&str; 5] = ["grant", "grants", "grantee", "grant recipient", "awarded"];

const PROJECT_LABELS: [&str; 5] = ["website", "visit", "project", "homepage", "app"];

pub struct EcosystemExtractor {
    ecosystems: Vec<(&'static str, KeywordSet)>,
    hackathon: KeywordSet,
    winner: KeywordSet,
    grant: KeywordSet,
}

impl EcosystemExtractor {
    pub fn new() -> Self {
        Self {
            ecosystems: ECOSYSTEMS
                .iter()
                .map(|(tag, words)| (*tag, KeywordSet::new(words)))
                .collect(),
            hackathon: KeywordSet::new(&HACKATHON_WORDS),
            winner: KeywordSet::new(&WINNER_WORDS),
            grant: KeywordSet::new(&GRANT_WORDS),
        }
    }

    /// The most-mentioned ecosystem. Ties go to the earlier entry.
    fn ecosystem_tag(&self, text: &str) -> Option<&'static str> {
        let mut best: Option<(&'static str, u32)> = None;
        for (tag, words) in &self.ecosystems {
            let count = words.count(text);
            if count > 0 && best.map_or(true, |(_, n)| count > n) {
                best = Some((*tag, count));
            }
        }
        best.map(|(tag, _)| tag)
    }

    fn program_type(&self, text: &str) -> ProgramType {
        if self.hackathon.matches(text) && self.winner.matches(text) {
            ProgramType::Hackathon
        } else if self.grant.matches(text) {
            ProgramType::Grant
        } else {
            ProgramType::Directory
        }
    }
}

impl Default for EcosystemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalExtractor for EcosystemExtractor {
    fn source_type(&self) -> SourceType {
        SourceType::Ecosystem
    }

    fn extract(&self, url: &str, text: &str) -> Result<ExtractionResult, ExtractionError> {
        let page = Url::parse(url).map_err(|e| ExtractionError::Malformed(e.to_string()))?;
        let doc = Html::parse_document(text);
        let ld = html::json_ld(&doc);

        let title = html::page_title(&doc);
        let body = format!(
            "{} {}",
            title.as_deref().unwrap_or_default().to_lowercase(),
            html::visible_text(&doc)
        );

        let tag = self.ecosystem_tag(&body);
        let program_type = self.program_type(&body);
        let project_url = html::labeled_external_link(&html::links(&doc, &page), &page, &PROJECT_LABELS, is_platform_host)
            .or_else(|| {
                ld.iter()
                    .filter_map(|v| html::ld_str(v, "url"))
                    .find(|u| {
                        Url::parse(u)
                            .ok()
                            .as_ref()
                            .and_then(html::bare_host)
                            .is_some_and(|h| Some(h) != html::bare_host(&page) && !is_platform_host(h))
                    })
                    .map(str::to_string)
            });

        // A page that names no ecosystem and links nowhere is not a listing.
        let listed = tag.is_some() || project_url.is_some();

        let fields = EcosystemFields {
            ecosystem_tag: tag.map(str::to_string),
            program_type: listed.then_some(program_type),
            program_name: title,
            project_url,
        };

        let mut result = ExtractionResult::new(ExtractedFields::Ecosystem(fields));
        result.signal_if(listed, Signal::EcosystemListed);
        result.signal_if(listed && program_type == ProgramType::Grant, Signal::GrantRecipient);
        result.signal_if(listed && program_type == ProgramType::Hackathon, Signal::HackathonWinner);
        Ok(result)
    }
}
