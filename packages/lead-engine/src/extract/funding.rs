//! Funding and accelerator announcement extraction.

use regex::Regex;
use scraper::Html;
use url::Url;

use crate::error::ExtractionError;
use crate::extract::html::{self, KeywordSet};
use crate::extract::{ExtractionResult, SignalExtractor};
use crate::resolve::is_platform_host;
use crate::types::{ExtractedFields, FundingFields, FundingRound, Signal, SourceType};

/// Known accelerators: display name and the pattern that finds it.
const ACCELERATORS: [(&str, &str); 9] = [
    ("Y Combinator", r"\by ?combinator\b|\(yc [swfx]\d{2}\)|\byc [swfx]\d{2}\b"),
    ("Techstars", r"\btechstars\b"),
    ("500 Global", r"\b500 (global|startups)\b"),
    ("Antler", r"\bantler\b"),
    ("Entrepreneur First", r"\bentrepreneur first\b"),
    ("Plug and Play", r"\bplug and play\b"),
    ("Alchemist", r"\balchemist accelerator\b"),
    ("a16z speedrun", r"\ba16z (speedrun|start)\b"),
    ("Founders Inc", r"\bfounders,? inc\b"),
];

const FUNDING_VERBS: [&str; 8] = [
    "raised", "raises", "raising", "secures", "secured", "closes", "closed", "funding",
];

const WEBSITE_LABELS: [&str; 4] = ["website", "homepage", "visit", "learn more"];

pub struct FundingExtractor {
    accelerators: Vec<(&'static str, Regex)>,
    batch: Regex,
    season_batch: Regex,
    amount: Regex,
    verbs: KeywordSet,
}

impl FundingExtractor {
    pub fn new() -> Self {
        Self {
            accelerators: ACCELERATORS
                .iter()
                .map(|(name, pattern)| (*name, Regex::new(pattern).expect("accelerator pattern compiles")))
                .collect(),
            batch: Regex::new(r"\byc ([swfx])(\d{2})\b").expect("batch pattern compiles"),
            season_batch: Regex::new(r"\b(winter|summer|spring|fall) (20\d{2})\b")
                .expect("season pattern compiles"),
            amount: Regex::new(r"\$\s?(\d+(?:\.\d+)?)\s?(billion|million|thousand|bn|[mbk])\b")
                .expect("amount pattern compiles"),
            verbs: KeywordSet::new(&FUNDING_VERBS),
        }
    }

    fn accelerator(&self, text: &str) -> Option<&'static str> {
        self.accelerators
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(name, _)| *name)
    }

    fn batch(&self, text: &str) -> Option<String> {
        if let Some(caps) = self.batch.captures(text) {
            return Some(format!("{}{}", caps[1].to_uppercase(), &caps[2]));
        }
        self.season_batch.captures(text).map(|caps| {
            let season = &caps[1];
            let mut chars = season.chars();
            let season: String = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            };
            format!("{} {}", season, &caps[2])
        })
    }

    fn amount_usd(&self, text: &str) -> Option<u64> {
        let caps = self.amount.captures(text)?;
        let value: f64 = caps[1].parse().ok()?;
        let scale = match &caps[2] {
            "billion" | "bn" | "b" => 1e9,
            "million" | "m" => 1e6,
            _ => 1e3,
        };
        Some((value * scale).round() as u64)
    }
}

impl Default for FundingExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Round named in the text. Pre-seed is checked before seed.
fn funding_round(text: &str) -> Option<FundingRound> {
    if text.contains("pre-seed") || text.contains("pre seed") || text.contains("preseed") {
        Some(FundingRound::PreSeed)
    } else if text.contains("seed round") || text.contains("seed funding") || text.contains(" seed ") {
        Some(FundingRound::Seed)
    } else if text.contains("series a") {
        Some(FundingRound::SeriesA)
    } else if text.contains("series b") {
        Some(FundingRound::SeriesB)
    } else if ["series c", "series d", "series e", "series f", "growth round"]
        .iter()
        .any(|r| text.contains(r))
    {
        Some(FundingRound::Later)
    } else {
        None
    }
}

impl SignalExtractor for FundingExtractor {
    fn source_type(&self) -> SourceType {
        SourceType::Funding
    }

    fn extract(&self, url: &str, text: &str) -> Result<ExtractionResult, ExtractionError> {
        let page = Url::parse(url).map_err(|e| ExtractionError::Malformed(e.to_string()))?;
        let doc = Html::parse_document(text);
        let ld = html::json_ld(&doc);

        let title = html::page_title(&doc).unwrap_or_default().to_lowercase();
        let body = format!(" {} {} ", title, html::visible_text(&doc));

        let accelerator = self.accelerator(&body);
        let company_website_url = ld
            .iter()
            .filter(|v| html::ld_is(v, "Organization") || html::ld_is(v, "Corporation"))
            .filter_map(|v| html::ld_str(v, "url"))
            .find(|u| {
                Url::parse(u)
                    .ok()
                    .as_ref()
                    .and_then(html::bare_host)
                    .is_some_and(|h| Some(h) != html::bare_host(&page) && !is_platform_host(h))
            })
            .map(str::to_string)
            .or_else(|| {
                html::labeled_external_link(&html::links(&doc, &page), &page, &WEBSITE_LABELS, is_platform_host)
            });

        let fields = FundingFields {
            accelerator_name: accelerator.map(str::to_string),
            batch: self.batch(&body),
            funding_round: funding_round(&body),
            amount_usd: self.amount_usd(&body),
            funding_date: html::published_date(&doc, &ld),
            company_website_url,
        };

        let announced = (fields.funding_round.is_some() || fields.amount_usd.is_some())
            && self.verbs.matches(&body);

        let mut result = ExtractionResult::new(ExtractedFields::Funding(fields));
        result.signal_if(announced, Signal::FundingAnnounced);
        result.signal_if(accelerator.is_some(), Signal::AcceleratorMember);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn extract(html: &str) -> ExtractionResult {
        FundingExtractor::new()
            .extract("https://techcrunch.com/2024/06/01/acme-raises", html)
            .unwrap()
    }

    #[test]
    fn test_seed_announcement() {
        let html = r#"<html><head>
            <title>Acme raises $4.5M seed round to automate invoicing</title>
            <meta property="article:published_time" content="2024-06-01T09:00:00Z">
          </head><body>
            <p>Acme (YC W24) announced today it has raised $4.5 million in a seed round.</p>
            <a href="https://acme.io">Visit Acme's website</a>
          </body></html>"#;
        let result = extract(html);
        let fields = result.fields.as_funding().unwrap();

        assert_eq!(fields.accelerator_name.as_deref(), Some("Y Combinator"));
        assert_eq!(fields.batch.as_deref(), Some("W24"));
        assert_eq!(fields.funding_round, Some(FundingRound::Seed));
        assert_eq!(fields.amount_usd, Some(4_500_000));
        assert_eq!(fields.funding_date, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(fields.company_website_url.as_deref(), Some("https://acme.io/"));
        assert!(result.signals.contains(&Signal::FundingAnnounced));
        assert!(result.signals.contains(&Signal::AcceleratorMember));
    }

    #[test]
    fn test_pre_seed_wins_over_seed() {
        let html = "<html><body><p>Zed closed a pre-seed round of $800k.</p></body></html>";
        let fields = extract(html).fields.as_funding().cloned().unwrap();
        assert_eq!(fields.funding_round, Some(FundingRound::PreSeed));
        assert_eq!(fields.amount_usd, Some(800_000));
    }

    #[test]
    fn test_accelerator_cohort_without_funding() {
        let html = "<html><body><h1>Techstars Boston Summer 2024 cohort</h1><p>Meet the companies.</p></body></html>";
        let result = extract(html);
        let fields = result.fields.as_funding().unwrap();

        assert_eq!(fields.accelerator_name.as_deref(), Some("Techstars"));
        assert_eq!(fields.batch.as_deref(), Some("Summer 2024"));
        assert_eq!(result.signals.iter().copied().collect::<Vec<_>>(), vec![Signal::AcceleratorMember]);
    }

    #[test]
    fn test_later_rounds() {
        assert_eq!(funding_round(" closes series c "), Some(FundingRound::Later));
        assert_eq!(funding_round(" series a led by "), Some(FundingRound::SeriesA));
        assert_eq!(funding_round(" nothing here "), None);
    }
}
