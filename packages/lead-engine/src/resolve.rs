//! Company-domain resolution.
//!
//! An extraction names the company in different ways depending on where it
//! came from: an explicit website link, a product URL, or only a job-board
//! slug. Resolution prefers explicit links that point off any aggregator
//! and falls back to the board slug.

use url::Url;

use crate::extract::ExtractionResult;
use crate::normalize::BoardFamily;

/// Hosts that aggregate many companies and never identify one.
const PLATFORM_HOSTS: [&str; 34] = [
    // Hiring boards
    "greenhouse.io",
    "lever.co",
    "ashbyhq.com",
    "workable.com",
    "smartrecruiters.com",
    "teamtailor.com",
    "recruitee.com",
    "linkedin.com",
    "indeed.com",
    "wellfound.com",
    "angel.co",
    "workatastartup.com",
    // Launch sites
    "producthunt.com",
    "ycombinator.com",
    "betalist.com",
    "indiehackers.com",
    // Code and social
    "github.com",
    "gitlab.com",
    "twitter.com",
    "x.com",
    "facebook.com",
    "instagram.com",
    "youtube.com",
    "reddit.com",
    "discord.gg",
    "discord.com",
    "t.me",
    "medium.com",
    "substack.com",
    // Press and databases
    "crunchbase.com",
    "techcrunch.com",
    "prnewswire.com",
    "businesswire.com",
    "google.com",
];

/// Second-level labels that act as public suffixes under a country code.
const SECOND_LEVEL: [&str; 8] = ["co", "com", "org", "net", "ac", "gov", "edu", "ltd"];

/// Whether `host` belongs to an aggregator rather than a company.
pub fn is_platform_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    PLATFORM_HOSTS
        .iter()
        .any(|p| host == *p || host.ends_with(&format!(".{}", p)))
}

/// Registrable domain of a host: `www.app.acme.co.uk` -> `acme.co.uk`.
pub fn root_domain(host: &str) -> Option<String> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 || host.parse::<std::net::IpAddr>().is_ok() {
        return None;
    }

    let n = labels.len();
    let keep = if n >= 3 && labels[n - 1].len() == 2 && SECOND_LEVEL.contains(&labels[n - 2]) {
        3
    } else {
        2
    };
    Some(labels[n.saturating_sub(keep)..].join("."))
}

/// Root domain of a URL, or `None` for aggregator hosts.
pub fn company_domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    if is_platform_host(host) {
        return None;
    }
    root_domain(host)
}

/// Domain from a job-board slug: `acme` -> `acme.com`, `acme.io` stays.
fn domain_from_slug(slug: &str) -> Option<String> {
    let slug: String = slug
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '.')
        .collect::<String>()
        .trim_matches(|c| c == '-' || c == '.')
        .to_string();
    if slug.is_empty() {
        return None;
    }
    if slug.contains('.') {
        root_domain(&slug)
    } else {
        Some(format!("{}.com", slug))
    }
}

/// Resolve the company domain for one extraction.
///
/// `source_url` is the page the extraction came from; its board slug is the
/// fallback when no explicit website is found.
pub fn resolve(result: &ExtractionResult, source_url: &str) -> Option<String> {
    if let Some(domain) = result
        .fields
        .website_candidates()
        .into_iter()
        .find_map(company_domain_of)
    {
        return Some(domain);
    }

    let page = Url::parse(source_url).ok()?;
    let host = page.host_str()?;
    if let Some(slug) = BoardFamily::detect(host).and_then(|family| family.slug(&page)) {
        return domain_from_slug(&slug);
    }

    // A page on the company's own site identifies it directly.
    company_domain_of(source_url)
}
