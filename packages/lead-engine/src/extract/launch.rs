//! Launch-post extraction (Show HN, Product Hunt, launch blogs).

use scraper::Html;
use url::Url;

use crate::error::ExtractionError;
use crate::extract::html::{self, KeywordSet};
use crate::extract::{ExtractionResult, SignalExtractor};
use crate::resolve::is_platform_host;
use crate::types::{ExtractedFields, LaunchFields, Signal, SourceType};

const TITLE_PREFIXES: [&str; 4] = ["show hn:", "launch hn:", "launching:", "introducing"];

const TITLE_SEPARATORS: [&str; 4] = [" - ", " | ", " – ", " — "];

const PRODUCT_LABELS: [&str; 6] = ["visit", "website", "try it", "try ", "get it", "homepage"];

const COMPANY_LABELS: [&str; 3] = ["website", "homepage", "company"];

const BUILDER_PHRASES: [&str; 7] = [
    "show hn",
    "we built",
    "i built",
    "i made",
    "we made",
    "building in public",
    "side project",
];

pub struct LaunchExtractor {
    builder: KeywordSet,
}

impl LaunchExtractor {
    pub fn new() -> Self {
        Self {
            builder: KeywordSet::new(&BUILDER_PHRASES),
        }
    }
}

impl Default for LaunchExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip launch prefixes, taglines and parentheticals from a post title.
fn product_name(title: &str) -> Option<String> {
    let mut name = title.trim();
    for prefix in TITLE_PREFIXES {
        if name.get(..prefix.len()).is_some_and(|head| head.eq_ignore_ascii_case(prefix)) {
            name = name[prefix.len()..].trim_start();
        }
    }
    for sep in TITLE_SEPARATORS {
        if let Some((head, _)) = name.split_once(sep) {
            name = head;
        }
    }
    // "Acme: the fastest way to ..." keeps "Acme"
    if let Some((head, _)) = name.split_once(": ") {
        name = head;
    }

    let mut out = String::with_capacity(name.len());
    let mut depth = 0u32;
    for c in name.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    let out = html::collapse_whitespace(&out);
    (!out.is_empty()).then_some(out)
}

fn ld_url(ld: &[serde_json::Value], types: &[&str]) -> Option<String> {
    ld.iter()
        .filter(|v| types.iter().any(|t| html::ld_is(v, t)))
        .find_map(|v| html::ld_str(v, "url"))
        .filter(|u| Url::parse(u).is_ok())
        .map(str::to_string)
}

impl SignalExtractor for LaunchExtractor {
    fn source_type(&self) -> SourceType {
        SourceType::Launch
    }

    fn extract(&self, url: &str, text: &str) -> Result<ExtractionResult, ExtractionError> {
        let page = Url::parse(url).map_err(|e| ExtractionError::Malformed(e.to_string()))?;
        let doc = Html::parse_document(text);
        let ld = html::json_ld(&doc);
        let links = html::links(&doc, &page);

        let title = html::page_title(&doc);
        let fields = LaunchFields {
            product_name: title.as_deref().and_then(product_name),
            product_url: ld_url(&ld, &["SoftwareApplication", "WebApplication", "Product"])
                .or_else(|| html::labeled_external_link(&links, &page, &PRODUCT_LABELS, is_platform_host)),
            launch_date: html::published_date(&doc, &ld),
            company_website_url: ld_url(&ld, &["Organization", "Corporation"])
                .or_else(|| html::labeled_external_link(&links, &page, &COMPANY_LABELS, is_platform_host)),
        };

        let body = format!(
            "{} {}",
            title.as_deref().unwrap_or_default().to_lowercase(),
            html::visible_text(&doc)
        );

        let launched = fields.product_name.is_some() || fields.product_url.is_some();
        let builder = self.builder.matches(&body);

        let mut result = ExtractionResult::new(ExtractedFields::Launch(fields));
        result.signal_if(launched, Signal::LaunchPost);
        result.signal_if(builder, Signal::BuilderPost);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn extract(url: &str, html: &str) -> ExtractionResult {
        LaunchExtractor::new().extract(url, html).unwrap()
    }

    #[test]
    fn test_product_name_cleanup() {
        assert_eq!(product_name("Show HN: Acme (YC W24) - Ship APIs faster").as_deref(), Some("Acme"));
        assert_eq!(product_name("Launch HN: Zed | Code at the speed of thought").as_deref(), Some("Zed"));
        assert_eq!(product_name("Beacon: uptime for cron jobs").as_deref(), Some("Beacon"));
        assert_eq!(product_name("Show HN: (beta)"), None);
    }

    #[test]
    fn test_show_hn_post() {
        let html = r#"<html><head>
            <title>Show HN: Acme - Deploy previews for every branch | Hacker News</title>
            <meta property="article:published_time" content="2024-03-02T12:00:00Z">
          </head><body>
            <a href="https://news.ycombinator.com/item?id=1">comments</a>
            <a href="https://acme.dev">Visit Acme</a>
            <p>We built Acme after years of fighting staging environments.</p>
          </body></html>"#;
        let result = extract("https://news.ycombinator.com/item?id=1", html);
        let fields = result.fields.as_launch().unwrap();

        assert_eq!(fields.product_name.as_deref(), Some("Acme"));
        assert_eq!(fields.product_url.as_deref(), Some("https://acme.dev/"));
        assert_eq!(fields.launch_date, NaiveDate::from_ymd_opt(2024, 3, 2));
        assert!(result.signals.contains(&Signal::LaunchPost));
        assert!(result.signals.contains(&Signal::BuilderPost));
    }

    #[test]
    fn test_json_ld_product_page() {
        let html = r#"<html><head>
            <meta property="og:title" content="Beacon – Cron monitoring">
            <script type="application/ld+json">
              {"@graph":[
                {"@type":"SoftwareApplication","url":"https://app.beacon.io"},
                {"@type":"Organization","url":"https://beacon.io"}
              ]}
            </script></head><body><p>Now available.</p></body></html>"#;
        let result = extract("https://www.producthunt.com/posts/beacon", html);
        let fields = result.fields.as_launch().unwrap();

        assert_eq!(fields.product_name.as_deref(), Some("Beacon"));
        assert_eq!(fields.product_url.as_deref(), Some("https://app.beacon.io"));
        assert_eq!(fields.company_website_url.as_deref(), Some("https://beacon.io"));
        assert!(result.signals.contains(&Signal::LaunchPost));
        assert!(!result.signals.contains(&Signal::BuilderPost));
    }

    #[test]
    fn test_platform_links_are_not_products() {
        let html = r#"<html><body>
            <a href="https://twitter.com/acme">Visit us on X</a>
            <a href="https://github.com/acme/acme">Try it on GitHub</a>
          </body></html>"#;
        let result = extract("https://blog.example.org/post", html);
        let fields = result.fields.as_launch().unwrap();
        assert_eq!(fields.product_url, None);
        assert!(result.signals.is_empty());
    }
}
