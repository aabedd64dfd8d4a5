//! HTML helpers shared by the extractors and the classifier.

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::ExtractionError;

/// Validate raw bytes as markup and return the text.
pub fn decode(content: &[u8]) -> Result<&str, ExtractionError> {
    if content.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ExtractionError::EmptyBody);
    }
    let text = std::str::from_utf8(content).map_err(|_| ExtractionError::NotUtf8)?;
    let looks_like_markup = text.contains('<')
        && text.contains('>')
        && text
            .as_bytes()
            .windows(2)
            .any(|w| w[0] == b'<' && (w[1].is_ascii_alphabetic() || w[1] == b'!' || w[1] == b'/'));
    if !looks_like_markup {
        return Err(ExtractionError::NotMarkup);
    }
    Ok(text)
}

/// Parse a CSS selector known at compile time.
pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Element text with whitespace collapsed.
pub fn element_text(el: &ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the first element matching any selector, in selector order.
pub fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        let sel = selector(css)?;
        doc.select(&sel)
            .map(|el| element_text(&el))
            .find(|t| !t.is_empty())
    })
}

/// Content of the first `<meta>` whose `property` or `name` is in `keys`.
pub fn meta_content(doc: &Html, keys: &[&str]) -> Option<String> {
    let sel = selector("meta")?;
    keys.iter().find_map(|key| {
        doc.select(&sel).find_map(|el| {
            let v = el.value();
            let name = v.attr("property").or_else(|| v.attr("name"))?;
            if name.eq_ignore_ascii_case(key) {
                v.attr("content")
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
            } else {
                None
            }
        })
    })
}

/// Parsed JSON-LD objects, with `@graph` arrays flattened.
pub fn json_ld(doc: &Html) -> Vec<serde_json::Value> {
    let Some(sel) = selector(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for el in doc.select(&sel) {
        let raw: String = el.text().collect();
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) else {
            continue;
        };
        flatten_ld(value, &mut out);
    }
    out
}

fn flatten_ld(value: serde_json::Value, out: &mut Vec<serde_json::Value>) {
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                flatten_ld(item, out);
            }
        }
        serde_json::Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten_ld(graph, out);
            }
            out.push(serde_json::Value::Object(map));
        }
        _ => {}
    }
}

/// Whether a JSON-LD object declares `@type` (string or array) equal to `ty`.
pub fn ld_is(value: &serde_json::Value, ty: &str) -> bool {
    match value.get("@type") {
        Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case(ty),
        Some(serde_json::Value::Array(types)) => types
            .iter()
            .filter_map(|t| t.as_str())
            .any(|t| t.eq_ignore_ascii_case(ty)),
        _ => false,
    }
}

/// String field of a JSON-LD object.
pub fn ld_str<'a>(value: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(|v| v.as_str()).map(str::trim).filter(|s| !s.is_empty())
}

/// Lowercased visible text, skipping scripts, styles and page chrome.
pub fn visible_text(doc: &Html) -> String {
    const SKIP: [&str; 6] = ["script", "style", "noscript", "nav", "footer", "header"];
    let mut parts = Vec::new();
    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(|a| a.value().as_element())
            .any(|el| SKIP.contains(&el.name()));
        if !hidden {
            parts.push(&**text);
        }
    }
    collapse_whitespace(&parts.join(" ")).to_lowercase()
}

/// An anchor resolved against the page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: Url,
    /// Lowercased anchor text plus `title`/`aria-label`
    pub label: String,
}

/// All http(s) anchors on the page.
pub fn links(doc: &Html, base: &Url) -> Vec<Link> {
    let Some(sel) = selector("a[href]") else {
        return Vec::new();
    };
    doc.select(&sel)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            if href.starts_with('#') || href.starts_with("mailto:") || href.starts_with("javascript:") {
                return None;
            }
            let url = base.join(href).ok()?;
            if !matches!(url.scheme(), "http" | "https") {
                return None;
            }
            let mut label = element_text(&el);
            for attr in ["title", "aria-label"] {
                if let Some(extra) = el.value().attr(attr) {
                    label.push(' ');
                    label.push_str(extra);
                }
            }
            Some(Link {
                url,
                label: label.to_lowercase(),
            })
        })
        .collect()
}

/// Host without a leading `www.`.
pub fn bare_host(url: &Url) -> Option<&str> {
    url.host_str().map(|h| h.strip_prefix("www.").unwrap_or(h))
}

/// First link off the page's own host whose label contains one of `labels`,
/// skipping hosts rejected by `skip_host`.
pub fn labeled_external_link(
    links: &[Link],
    page: &Url,
    labels: &[&str],
    skip_host: impl Fn(&str) -> bool,
) -> Option<String> {
    let own = bare_host(page);
    links
        .iter()
        .filter(|l| {
            let host = bare_host(&l.url);
            host.is_some() && host != own && !host.is_some_and(&skip_host)
        })
        .find(|l| labels.iter().any(|label| l.label.contains(label)))
        .map(|l| l.url.to_string())
}

/// Compiled word-boundary matchers for a keyword list.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    patterns: Vec<Regex>,
}

impl KeywordSet {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let patterns = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .filter_map(|k| Regex::new(&format!(r"\b{}\b", regex::escape(&k))).ok())
            .collect();
        Self { patterns }
    }

    /// Total occurrences of all keywords in lowercased `text`.
    pub fn count(&self, text: &str) -> u32 {
        self.patterns
            .iter()
            .map(|p| p.find_iter(text).count() as u32)
            .sum()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Best-effort date parsing for published/announced dates.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() >= 10 {
        if let Some(prefix) = raw.get(..10) {
            if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
                return Some(date);
            }
        }
    }
    let cleaned = raw.replace(',', "");
    ["%B %d %Y", "%b %d %Y", "%d %B %Y", "%d %b %Y", "%Y/%m/%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
}

/// Publication date from the usual metadata spots.
pub fn published_date(doc: &Html, ld: &[serde_json::Value]) -> Option<NaiveDate> {
    meta_content(
        doc,
        &["article:published_time", "og:published_time", "date", "publish-date", "pubdate"],
    )
    .and_then(|d| parse_date(&d))
    .or_else(|| {
        ld.iter()
            .filter_map(|v| ld_str(v, "datePublished").or_else(|| ld_str(v, "dateCreated")))
            .find_map(parse_date)
    })
    .or_else(|| {
        let sel = selector("time[datetime]")?;
        doc.select(&sel)
            .filter_map(|el| el.value().attr("datetime"))
            .find_map(parse_date)
    })
}

/// Page title preferring `og:title`, then `<h1>`, then `<title>`.
pub fn page_title(doc: &Html) -> Option<String> {
    meta_content(doc, &["og:title", "twitter:title"])
        .map(|t| collapse_whitespace(&t))
        .or_else(|| first_text(doc, &["h1", "title"]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(decode(b"   "), Err(ExtractionError::EmptyBody));
        assert_eq!(decode(&[0xff, 0xfe, b'<']), Err(ExtractionError::NotUtf8));
        assert_eq!(decode(b"{\"jobs\": []}"), Err(ExtractionError::NotMarkup));
        assert!(decode(b"<html><body>ok</body></html>").is_ok());
    }

    #[test]
    fn test_keyword_set_uses_word_boundaries() {
        let set = KeywordSet::new(&["ai", "machine learning"]);
        assert_eq!(set.count("ai engineer, machine learning and more ai"), 3);
        assert!(!set.matches("maintenance"));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert_eq!(parse_date("2024-05-01T10:00:00Z"), expected);
        assert_eq!(parse_date("May 1, 2024"), expected);
        assert_eq!(parse_date("1 May 2024"), expected);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_visible_text_skips_chrome() {
        let doc = Html::parse_document(
            "<html><head><style>.x{}</style></head><body><nav>Menu</nav><p>Our  Pricing</p><script>var a;</script></body></html>",
        );
        assert_eq!(visible_text(&doc), "our pricing");
    }

    #[test]
    fn test_json_ld_flattens_graph() {
        let doc = Html::parse_document(
            r#"<script type="application/ld+json">{"@graph":[{"@type":"Organization","url":"https://acme.io"}]}</script>"#,
        );
        let ld = json_ld(&doc);
        let org = ld.iter().find(|v| ld_is(v, "Organization")).unwrap();
        assert_eq!(ld_str(org, "url"), Some("https://acme.io"));
    }

    #[test]
    fn test_labeled_external_link() {
        let page = Url::parse("https://jobs.lever.co/acme").unwrap();
        let doc = Html::parse_document(
            r#"<a href="/acme/123">Backend Engineer</a><a href="https://acme.io">Company Website</a>"#,
        );
        let found = labeled_external_link(&links(&doc, &page), &page, &["website"], |_| false);
        assert_eq!(found.as_deref(), Some("https://acme.io/"));
    }
}
