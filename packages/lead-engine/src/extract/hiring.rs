//! Hiring-board extraction.

use scraper::Html;
use std::collections::BTreeSet;
use url::Url;

use crate::error::ExtractionError;
use crate::extract::html::{self, KeywordSet};
use crate::extract::{ExtractionResult, SignalExtractor};
use crate::normalize::BoardFamily;
use crate::resolve::is_platform_host;
use crate::types::{ExtractConfig, ExtractedFields, HiringFields, Signal, SourceType};

/// Role tags that count as engineering.
const ENGINEERING_TAGS: [&str; 8] = [
    "backend", "frontend", "fullstack", "devops", "ml_ai", "data", "web3", "mobile",
];

/// Title words that mark an engineering role on their own.
const ENGINEERING_WORDS: [&str; 11] = [
    "engineer", "engineers", "engineering", "developer", "developers", "programmer", "architect",
    "sre", "devops", "swe", "software",
];

const FOUNDING_WORDS: [&str; 6] = ["founding", "founder", "0 to 1", "0-1", "greenfield", "mvp"];

const PRODUCT_ENGINEER_WORDS: [&str; 2] = ["product engineer", "engineering generalist"];

/// Link labels that point at the company's own site.
const WEBSITE_LABELS: [&str; 5] = ["website", "homepage", "home page", "company", "about"];

/// Selectors tried per family before the generic ones.
fn family_selectors(family: BoardFamily) -> &'static [&'static str] {
    match family {
        BoardFamily::Greenhouse => &["div.opening a", "tr.job-post a p.body--medium", ".job-post a"],
        BoardFamily::Lever => &[".posting .posting-title h5", ".posting h5"],
        BoardFamily::Ashby => &["a[href*='/jobs/'] h3", "[class*='jobPosting'] h3"],
        BoardFamily::Workable => &["li[data-ui='job'] h3", "[data-ui='job-title']"],
        BoardFamily::SmartRecruiters => &["li.opening-job h4", ".opening-job .details-title"],
        BoardFamily::Teamtailor => &["#jobs_list_container li a span", "ul.jobs li a"],
        BoardFamily::Recruitee => &[".job .job-title", "a[href*='/o/'] .title"],
    }
}

const GENERIC_SELECTORS: [&str; 6] = [
    "div.opening",
    "[data-job-id]",
    ".job-listing",
    ".posting-title",
    "tr.job",
    "a.opening",
];

/// Extracts open roles from a hosted job board.
pub struct HiringExtractor {
    roles: Vec<(String, KeywordSet)>,
    engineering: KeywordSet,
    founding: KeywordSet,
    product_engineer: KeywordSet,
    max_job_titles: usize,
}

impl HiringExtractor {
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            roles: config
                .role_keywords
                .iter()
                .map(|(tag, words)| (tag.clone(), KeywordSet::new(words)))
                .collect(),
            engineering: KeywordSet::new(&ENGINEERING_WORDS),
            founding: KeywordSet::new(&FOUNDING_WORDS),
            product_engineer: KeywordSet::new(&PRODUCT_ENGINEER_WORDS),
            max_job_titles: config.max_job_titles,
        }
    }

    fn job_titles(&self, doc: &Html, family: Option<BoardFamily>) -> Vec<String> {
        let family_sels = family.map(family_selectors).unwrap_or(&[]);
        for css in family_sels.iter().chain(GENERIC_SELECTORS.iter()) {
            let Some(sel) = html::selector(css) else {
                continue;
            };
            let titles: Vec<String> = doc
                .select(&sel)
                .map(|el| title_of(&el))
                .filter(|t| t.chars().count() >= 3)
                .collect();
            if !titles.is_empty() {
                return titles;
            }
        }

        let ld_titles: Vec<String> = html::json_ld(doc)
            .iter()
            .filter(|v| html::ld_is(v, "JobPosting"))
            .filter_map(|v| html::ld_str(v, "title"))
            .map(html::collapse_whitespace)
            .collect();
        if !ld_titles.is_empty() {
            return ld_titles;
        }

        // Last resort: anchors that read like job postings.
        let Some(sel) = html::selector("a[href]") else {
            return Vec::new();
        };
        doc.select(&sel)
            .map(|el| html::element_text(&el))
            .filter(|t| t.chars().count() >= 3)
            .filter(|t| {
                let lower = t.to_lowercase();
                ["engineer", "developer", "software"].iter().any(|w| lower.contains(w))
            })
            .collect()
    }

    fn tag_roles(&self, title: &str) -> BTreeSet<String> {
        let lower = title.to_lowercase();
        self.roles
            .iter()
            .filter(|(_, words)| words.matches(&lower))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    fn company_website(&self, doc: &Html, page: &Url) -> Option<String> {
        // Greenhouse and Lever put the company's site behind the header logo.
        let logo = ["#logo a[href]", "a.main-header-logo[href]", ".main-header a[href]", "header a[href]"]
            .iter()
            .filter_map(|css| html::selector(css))
            .find_map(|sel| {
                doc.select(&sel).find_map(|el| {
                    let url = page.join(el.value().attr("href")?).ok()?;
                    let host = html::bare_host(&url)?;
                    (host != html::bare_host(page)? && !is_platform_host(host)).then(|| url.to_string())
                })
            });
        logo.or_else(|| {
            html::labeled_external_link(&html::links(doc, page), page, &WEBSITE_LABELS, is_platform_host)
        })
    }
}

fn title_of(el: &scraper::ElementRef<'_>) -> String {
    // Prefer a nested title/name node when the matched element wraps more.
    if let Some(sel) = html::selector("[class*='title'], [class*='name']") {
        if let Some(inner) = el.select(&sel).map(|e| html::element_text(&e)).find(|t| !t.is_empty()) {
            return inner;
        }
    }
    html::element_text(el)
}

impl SignalExtractor for HiringExtractor {
    fn source_type(&self) -> SourceType {
        SourceType::Hiring
    }

    fn extract(&self, url: &str, text: &str) -> Result<ExtractionResult, ExtractionError> {
        let page = Url::parse(url).map_err(|e| ExtractionError::Malformed(e.to_string()))?;
        let family = page.host_str().and_then(BoardFamily::detect);
        let doc = Html::parse_document(text);

        let titles = self.job_titles(&doc, family);
        let mut roles = BTreeSet::new();
        let mut engineering = 0u32;
        let mut founding = false;
        let mut product_engineer = false;

        for title in &titles {
            let lower = title.to_lowercase();
            let tags = self.tag_roles(title);
            if tags.iter().any(|t| ENGINEERING_TAGS.contains(&t.as_str())) || self.engineering.matches(&lower) {
                engineering += 1;
            }
            founding |= self.founding.matches(&lower);
            product_engineer |= self.product_engineer.matches(&lower);
            roles.extend(tags);
        }

        let fields = HiringFields {
            board_family: family,
            jobs_count: titles.len() as u32,
            engineering_roles_count: engineering,
            job_titles: titles.iter().take(self.max_job_titles).cloned().collect(),
            company_website_url: self.company_website(&doc, &page),
            roles_detected: roles.iter().cloned().collect(),
        };

        let mut result = ExtractionResult::new(ExtractedFields::Hiring(fields));
        result.signal_if(family.is_some() || !titles.is_empty(), Signal::AtsBoardFound);
        result.signal_if(engineering > 0, Signal::HiringEngineering);
        result.signal_if(roles.contains("ml_ai"), Signal::HiringAi);
        result.signal_if(roles.contains("web3"), Signal::HiringWeb3);
        result.signal_if(roles.contains("devops"), Signal::HiringDevops);
        result.signal_if(founding, Signal::FoundingRole);
        result.signal_if(product_engineer, Signal::ProductEngineerRole);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREENHOUSE_BOARD: &str = r#"
        <html><head><title>Jobs at Acme</title></head><body>
          <div id="logo"><a href="https://www.acme.io"><img alt="Acme"></a></div>
          <section class="level-0">
            <div class="opening"><a href="/acme/jobs/1">Senior Backend Engineer</a></div>
            <div class="opening"><a href="/acme/jobs/2">Founding Machine Learning Engineer</a></div>
            <div class="opening"><a href="/acme/jobs/3">Product Engineer, Growth</a></div>
            <div class="opening"><a href="/acme/jobs/4">Account Executive</a></div>
          </section>
        </body></html>"#;

    fn extract(url: &str, html: &str) -> ExtractionResult {
        HiringExtractor::new(&ExtractConfig::default()).extract(url, html).unwrap()
    }

    #[test]
    fn test_greenhouse_board() {
        let result = extract("https://boards.greenhouse.io/acme", GREENHOUSE_BOARD);
        let fields = result.fields.as_hiring().unwrap();

        assert_eq!(fields.board_family, Some(BoardFamily::Greenhouse));
        assert_eq!(fields.jobs_count, 4);
        assert_eq!(fields.engineering_roles_count, 3);
        assert_eq!(fields.roles_detected, vec!["backend".to_string(), "ml_ai".to_string()]);
        assert_eq!(fields.company_website_url.as_deref(), Some("https://www.acme.io/"));

        assert!(result.signals.contains(&Signal::AtsBoardFound));
        assert!(result.signals.contains(&Signal::HiringEngineering));
        assert!(result.signals.contains(&Signal::HiringAi));
        assert!(result.signals.contains(&Signal::FoundingRole));
        assert!(result.signals.contains(&Signal::ProductEngineerRole));
        assert!(!result.signals.contains(&Signal::HiringWeb3));
    }

    #[test]
    fn test_lever_board_with_website_link() {
        let html = r#"<html><body>
            <div class="main-footer"><a href="https://acme.dev">Acme Home Page</a></div>
            <div class="posting"><a class="posting-title" href="/acme/1"><h5>Site Reliability Engineer</h5></a></div>
            <div class="posting"><a class="posting-title" href="/acme/2"><h5>Solidity Developer</h5></a></div>
        </body></html>"#;
        let result = extract("https://jobs.lever.co/acme", html);
        let fields = result.fields.as_hiring().unwrap();

        assert_eq!(fields.jobs_count, 2);
        assert_eq!(fields.engineering_roles_count, 2);
        assert_eq!(fields.company_website_url.as_deref(), Some("https://acme.dev/"));
        assert!(result.signals.contains(&Signal::HiringDevops));
        assert!(result.signals.contains(&Signal::HiringWeb3));
    }

    #[test]
    fn test_engineering_words_need_word_boundaries() {
        let html = r#"<html><body>
            <div class="opening"><a href="/acme/jobs/1">Answer Desk Specialist</a></div>
            <div class="opening"><a href="/acme/jobs/2">Pressreader Partnerships Lead</a></div>
            <div class="opening"><a href="/acme/jobs/3">Engineering Manager</a></div>
            <div class="opening"><a href="/acme/jobs/4">SRE, Platform</a></div>
        </body></html>"#;
        let result = extract("https://boards.greenhouse.io/acme", html);
        let fields = result.fields.as_hiring().unwrap();

        assert_eq!(fields.jobs_count, 4);
        assert_eq!(fields.engineering_roles_count, 2);
        assert!(!result.signals.contains(&Signal::FoundingRole));
    }

    #[test]
    fn test_json_ld_postings() {
        let html = r#"<html><head><script type="application/ld+json">
            [{"@type":"JobPosting","title":"Full Stack Developer"},{"@type":"JobPosting","title":"Designer"}]
        </script></head><body></body></html>"#;
        let result = extract("https://acme.recruitee.com", html);
        let fields = result.fields.as_hiring().unwrap();
        assert_eq!(fields.jobs_count, 2);
        assert_eq!(fields.roles_detected, vec!["fullstack".to_string()]);
    }

    #[test]
    fn test_job_titles_are_capped() {
        let mut html = String::from("<html><body>");
        for i in 0..30 {
            html.push_str(&format!(r#"<div class="opening"><a href="/j/{i}">Backend Engineer {i}</a></div>"#));
        }
        html.push_str("</body></html>");

        let result = extract("https://boards.greenhouse.io/acme", &html);
        let fields = result.fields.as_hiring().unwrap();
        assert_eq!(fields.jobs_count, 30);
        assert_eq!(fields.job_titles.len(), 20);
        assert_eq!(fields.job_titles[0], "Backend Engineer 0");
    }

    #[test]
    fn test_empty_board_still_marks_board() {
        let result = extract("https://jobs.ashbyhq.com/acme", "<html><body><p>No openings</p></body></html>");
        assert_eq!(result.signals, BTreeSet::from([Signal::AtsBoardFound]));
    }
}
