//! Generic URL canonicalization.

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{ConfigError, NormalizeError};
use crate::normalize::job_board::BoardFamily;
use crate::types::config::NormalizeConfig;

/// Canonicalizes raw URLs into stable dedup keys.
///
/// Keys are `scheme://host[:port]/path[?query]` with:
/// - scheme and host lowercased, default ports and userinfo dropped
/// - the fragment removed
/// - denylisted query parameters removed
/// - trailing slashes stripped (the root serializes with no slash)
///
/// Job-board URLs collapse to their board root so every posting of one
/// board shares a key.
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    denylist: Regex,
}

impl UrlNormalizer {
    /// Build a normalizer from config. Fails on an invalid denylist pattern.
    pub fn new(config: &NormalizeConfig) -> Result<Self, ConfigError> {
        let denylist = Regex::new(&config.tracking_param_pattern).map_err(|source| {
            ConfigError::Pattern {
                field: "normalize.tracking_param_pattern",
                source,
            }
        })?;
        Ok(Self { denylist })
    }

    /// Normalize `raw`, reducing to a board root when the host or `hint`
    /// identifies a job-board family.
    pub fn normalize(&self, raw: &str, hint: Option<BoardFamily>) -> Result<String, NormalizeError> {
        let url = parse_http(raw)?;
        let host = url.host_str().unwrap_or_default();

        if let Some(family) = BoardFamily::detect(host).or(hint) {
            if let Some(slug) = family.slug(&url) {
                return Ok(family.board_root(&slug));
            }
        }

        Ok(self.canonicalize(&url))
    }

    /// Normalize the page's `<link rel="canonical">` target if it declares a
    /// usable one, otherwise `page_url` itself.
    pub fn canonical_from_html(&self, page_url: &str, html: &str) -> Result<String, NormalizeError> {
        let base = parse_http(page_url)?;

        if let Some(href) = canonical_href(html) {
            if let Ok(resolved) = base.join(&href) {
                match self.normalize(resolved.as_str(), None) {
                    Ok(key) => return Ok(key),
                    Err(e) => {
                        tracing::debug!(url = %page_url, error = %e, "Ignoring unusable canonical link");
                    }
                }
            }
        }

        self.normalize(page_url, None)
    }

    fn canonicalize(&self, url: &Url) -> String {
        let mut out = String::with_capacity(url.as_str().len());
        out.push_str(url.scheme());
        out.push_str("://");
        out.push_str(url.host_str().unwrap_or_default());
        if let Some(port) = url.port() {
            out.push(':');
            out.push_str(&port.to_string());
        }
        out.push_str(url.path().trim_end_matches('/'));

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(name, _)| !self.denylist.is_match(&name.to_lowercase()))
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        if !kept.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(kept)
                .finish();
            out.push('?');
            out.push_str(&query);
        }

        out
    }
}

impl Default for UrlNormalizer {
    fn default() -> Self {
        Self::new(&NormalizeConfig::default()).expect("default tracking pattern compiles")
    }
}

fn parse_http(raw: &str) -> Result<Url, NormalizeError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| NormalizeError::invalid(raw, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(NormalizeError::invalid(
            raw,
            format!("unsupported scheme {:?}", url.scheme()),
        ));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(NormalizeError::invalid(raw, "missing host")),
    }
}

fn canonical_href(html: &str) -> Option<String> {
    let selector = Selector::parse(r#"link[rel~="canonical"]"#).ok()?;
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn norm(raw: &str) -> String {
        UrlNormalizer::default().normalize(raw, None).unwrap()
    }

    #[test]
    fn test_lowercases_and_strips() {
        assert_eq!(
            norm("HTTPS://User:pw@WWW.Acme.IO:443/About/?utm_source=x&b=2&fbclid=z#team"),
            "https://www.acme.io/About?b=2"
        );
    }

    #[test]
    fn test_root_has_no_trailing_slash() {
        assert_eq!(norm("https://acme.io/"), "https://acme.io");
        assert_eq!(norm("https://acme.io"), "https://acme.io");
        assert_eq!(norm("http://acme.io:80/docs//"), "http://acme.io/docs");
    }

    #[test]
    fn test_keeps_non_default_port() {
        assert_eq!(norm("https://acme.io:8443/x"), "https://acme.io:8443/x");
    }

    #[test]
    fn test_denylist_is_case_insensitive_on_names() {
        assert_eq!(norm("https://acme.io/p?UTM_Campaign=a&Ref=b&id=7"), "https://acme.io/p?id=7");
        assert_eq!(norm("https://acme.io/p?mc_cid=1&mc_eid=2"), "https://acme.io/p");
    }

    #[test]
    fn test_invalid_urls() {
        let normalizer = UrlNormalizer::default();
        assert!(normalizer.normalize("acme.io/jobs", None).is_err());
        assert!(normalizer.normalize("ftp://acme.io/file", None).is_err());
        assert!(normalizer.normalize("https://", None).is_err());
        assert!(normalizer.normalize("", None).is_err());
    }

    #[test]
    fn test_board_posting_variants_share_root() {
        let expected = "https://boards.greenhouse.io/acme";
        assert_eq!(norm("https://boards.greenhouse.io/acme/jobs/123?utm_source=x"), expected);
        assert_eq!(norm("https://boards.greenhouse.io/acme/jobs/456"), expected);
        assert_eq!(norm("https://job-boards.greenhouse.io/Acme/jobs/789"), expected);
        assert_eq!(norm("https://boards.greenhouse.io/embed/job_board?for=acme"), expected);
    }

    #[test]
    fn test_each_family_root() {
        assert_eq!(norm("https://jobs.lever.co/acme/1f2e/apply"), "https://jobs.lever.co/acme");
        assert_eq!(norm("https://jobs.ashbyhq.com/acme/abc"), "https://jobs.ashbyhq.com/acme");
        assert_eq!(norm("https://apply.workable.com/acme/j/ABC/"), "https://apply.workable.com/acme");
        assert_eq!(
            norm("https://jobs.smartrecruiters.com/Acme/7431-backend"),
            "https://careers.smartrecruiters.com/acme"
        );
        assert_eq!(norm("https://acme.teamtailor.com/jobs/42-dev"), "https://acme.teamtailor.com/jobs");
        assert_eq!(norm("https://acme.recruitee.com/o/backend-dev"), "https://acme.recruitee.com");
    }

    #[test]
    fn test_board_host_without_slug_falls_back() {
        assert_eq!(norm("https://jobs.lever.co/?ref=x"), "https://jobs.lever.co");
    }

    #[test]
    fn test_encoded_embed_slug_is_stable() {
        let normalizer = UrlNormalizer::default();
        let once = normalizer
            .normalize("https://boards.greenhouse.io/embed/job_board?for=a%20b", None)
            .unwrap();
        assert_eq!(once, "https://boards.greenhouse.io/embed/job_board?for=a+b");
        assert_eq!(normalizer.normalize(&once, None).unwrap(), once);
    }

    #[test]
    fn test_hint_forces_family() {
        let normalizer = UrlNormalizer::default();
        let key = normalizer
            .normalize("https://careers.acme.io/acme/jobs/1", Some(BoardFamily::Lever))
            .unwrap();
        assert_eq!(key, "https://jobs.lever.co/acme");
    }

    #[test]
    fn test_custom_denylist() {
        let normalizer = UrlNormalizer::new(&NormalizeConfig {
            tracking_param_pattern: "^session$".to_string(),
        })
        .unwrap();
        assert_eq!(
            normalizer.normalize("https://acme.io/?session=1&utm_source=x", None).unwrap(),
            "https://acme.io?utm_source=x"
        );
    }

    #[test]
    fn test_bad_denylist_is_config_error() {
        let result = UrlNormalizer::new(&NormalizeConfig {
            tracking_param_pattern: "[".to_string(),
        });
        assert!(matches!(result, Err(ConfigError::Pattern { .. })));
    }

    #[test]
    fn test_canonical_from_html() {
        let normalizer = UrlNormalizer::default();
        let html = r#"<html><head><link rel="canonical" href="/launch/acme/?utm_source=feed"></head></html>"#;
        assert_eq!(
            normalizer
                .canonical_from_html("https://launches.example.com/p/123", html)
                .unwrap(),
            "https://launches.example.com/launch/acme"
        );

        let plain = "<html><head><title>x</title></head></html>";
        assert_eq!(
            normalizer
                .canonical_from_html("https://launches.example.com/p/123/", plain)
                .unwrap(),
            "https://launches.example.com/p/123"
        );
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            host in "[a-z]{1,10}\\.(com|io|co\\.uk)",
            segments in proptest::collection::vec("[A-Za-z0-9_.~-]{0,8}", 0..4),
            params in proptest::collection::vec(("[a-z_]{1,8}", "[A-Za-z0-9 %+]{0,6}"), 0..4),
            trailing in any::<bool>(),
        ) {
            let mut raw = format!("https://{}/{}", host, segments.join("/"));
            if trailing {
                raw.push('/');
            }
            if !params.is_empty() {
                let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
                raw.push('?');
                raw.push_str(&query.join("&"));
            }

            let normalizer = UrlNormalizer::default();
            if let Ok(once) = normalizer.normalize(&raw, None) {
                let twice = normalizer.normalize(&once, None).unwrap();
                prop_assert_eq!(once, twice);
            }
        }

        #[test]
        fn prop_board_keys_are_idempotent(
            family in proptest::sample::select(BoardFamily::ALL.to_vec()),
            slug in "[a-zA-Z0-9-]{1,12}",
            job in "[a-z0-9-]{0,10}",
        ) {
            let raw = match family {
                BoardFamily::Teamtailor => format!("https://{slug}.teamtailor.com/jobs/{job}"),
                BoardFamily::Recruitee => format!("https://{slug}.recruitee.com/o/{job}"),
                _ => format!("{}/{job}", family.board_root(&slug)),
            };
            let normalizer = UrlNormalizer::default();
            if let Ok(once) = normalizer.normalize(&raw, None) {
                let twice = normalizer.normalize(&once, None).unwrap();
                prop_assert_eq!(once, twice);
            }
        }

        #[test]
        fn prop_embed_keys_are_idempotent(
            value in "[A-Za-z0-9 ./%+_-]{0,12}",
            encode in any::<bool>(),
        ) {
            let value = if encode {
                url::form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>()
            } else {
                value
            };
            let raw = format!("https://boards.greenhouse.io/embed/job_board?for={value}");
            let normalizer = UrlNormalizer::default();
            if let Ok(once) = normalizer.normalize(&raw, None) {
                let twice = normalizer.normalize(&once, None).unwrap();
                prop_assert_eq!(once, twice);
            }
        }
    }
}
