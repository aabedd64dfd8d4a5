//! Job-board families and their board-root identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Hosted applicant-tracking boards we recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardFamily {
    Greenhouse,
    Lever,
    Ashby,
    Workable,
    SmartRecruiters,
    Teamtailor,
    Recruitee,
}

impl BoardFamily {
    pub const ALL: [BoardFamily; 7] = [
        Self::Greenhouse,
        Self::Lever,
        Self::Ashby,
        Self::Workable,
        Self::SmartRecruiters,
        Self::Teamtailor,
        Self::Recruitee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greenhouse => "greenhouse",
            Self::Lever => "lever",
            Self::Ashby => "ashby",
            Self::Workable => "workable",
            Self::SmartRecruiters => "smartrecruiters",
            Self::Teamtailor => "teamtailor",
            Self::Recruitee => "recruitee",
        }
    }

    /// Family whose hosts include `host` (already lowercased).
    pub fn detect(host: &str) -> Option<Self> {
        match host {
            "boards.greenhouse.io" | "job-boards.greenhouse.io" => Some(Self::Greenhouse),
            "jobs.lever.co" => Some(Self::Lever),
            "jobs.ashbyhq.com" => Some(Self::Ashby),
            "apply.workable.com" => Some(Self::Workable),
            "careers.smartrecruiters.com" | "jobs.smartrecruiters.com" => {
                Some(Self::SmartRecruiters)
            }
            h if h.ends_with(".teamtailor.com") => Some(Self::Teamtailor),
            h if h.ends_with(".recruitee.com") => Some(Self::Recruitee),
            _ => None,
        }
    }

    /// Whether the slug lives in the subdomain rather than the path.
    fn slug_in_host(&self) -> bool {
        matches!(self, Self::Teamtailor | Self::Recruitee)
    }

    /// Company slug identified by a board URL, lowercased.
    ///
    /// Returns `None` when the URL carries no slug (e.g. the bare board host)
    /// or when the slug has characters outside `[a-z0-9._-]`, so the URL
    /// falls back to generic canonicalization.
    pub fn slug(&self, url: &Url) -> Option<String> {
        let slug = if self.slug_in_host() {
            let host = url.host_str()?;
            let suffix = match self {
                Self::Teamtailor => ".teamtailor.com",
                _ => ".recruitee.com",
            };
            // A hint may point at a host outside the family; use its first label.
            let prefix = host.strip_suffix(suffix).unwrap_or(host);
            let label = if host.ends_with(suffix) {
                prefix.rsplit('.').next()
            } else {
                prefix.split('.').next()
            };
            label?.to_string()
        } else {
            let first = url.path_segments()?.find(|s| !s.is_empty())?;
            if *self == Self::Greenhouse && first == "embed" {
                url.query_pairs()
                    .find(|(k, _)| k == "for")
                    .map(|(_, v)| v.into_owned())?
            } else {
                first.to_string()
            }
        };

        let slug = slug.trim().to_lowercase();
        if slug == "www" || !is_slug(&slug) {
            None
        } else {
            Some(slug)
        }
    }

    /// Canonical board-root URL for a slug.
    pub fn board_root(&self, slug: &str) -> String {
        match self {
            Self::Greenhouse => format!("https://boards.greenhouse.io/{slug}"),
            Self::Lever => format!("https://jobs.lever.co/{slug}"),
            Self::Ashby => format!("https://jobs.ashbyhq.com/{slug}"),
            Self::Workable => format!("https://apply.workable.com/{slug}"),
            Self::SmartRecruiters => format!("https://careers.smartrecruiters.com/{slug}"),
            Self::Teamtailor => format!("https://{slug}.teamtailor.com/jobs"),
            Self::Recruitee => format!("https://{slug}.recruitee.com"),
        }
    }
}

/// Slugs are spliced into board roots verbatim, so they must survive a
/// reparse unchanged.
fn is_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.chars().all(|c| c == '.')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
}

impl fmt::Display for BoardFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug_of(family: BoardFamily, raw: &str) -> Option<String> {
        family.slug(&Url::parse(raw).unwrap())
    }

    #[test]
    fn test_detect_families() {
        assert_eq!(BoardFamily::detect("boards.greenhouse.io"), Some(BoardFamily::Greenhouse));
        assert_eq!(BoardFamily::detect("job-boards.greenhouse.io"), Some(BoardFamily::Greenhouse));
        assert_eq!(BoardFamily::detect("jobs.smartrecruiters.com"), Some(BoardFamily::SmartRecruiters));
        assert_eq!(BoardFamily::detect("acme.teamtailor.com"), Some(BoardFamily::Teamtailor));
        assert_eq!(BoardFamily::detect("acme.recruitee.com"), Some(BoardFamily::Recruitee));
        assert_eq!(BoardFamily::detect("teamtailor.com"), None);
        assert_eq!(BoardFamily::detect("acme.io"), None);
    }

    #[test]
    fn test_path_slug() {
        assert_eq!(
            slug_of(BoardFamily::Lever, "https://jobs.lever.co/Acme/abc-123/apply"),
            Some("acme".to_string())
        );
        assert_eq!(slug_of(BoardFamily::Ashby, "https://jobs.ashbyhq.com/"), None);
    }

    #[test]
    fn test_greenhouse_embed_slug() {
        assert_eq!(
            slug_of(
                BoardFamily::Greenhouse,
                "https://boards.greenhouse.io/embed/job_board?for=Acme"
            ),
            Some("acme".to_string())
        );
        assert_eq!(
            slug_of(BoardFamily::Greenhouse, "https://boards.greenhouse.io/embed/job_board"),
            None
        );
    }

    #[test]
    fn test_encoded_slugs_are_rejected() {
        assert_eq!(
            slug_of(
                BoardFamily::Greenhouse,
                "https://boards.greenhouse.io/embed/job_board?for=a%20b"
            ),
            None
        );
        assert_eq!(
            slug_of(
                BoardFamily::Greenhouse,
                "https://boards.greenhouse.io/embed/job_board?for=acme%2Fjobs"
            ),
            None
        );
        assert_eq!(
            slug_of(BoardFamily::Greenhouse, "https://boards.greenhouse.io/embed/job_board?for=.."),
            None
        );
        assert_eq!(slug_of(BoardFamily::Lever, "https://jobs.lever.co/a%20b/1"), None);
        assert_eq!(
            slug_of(BoardFamily::Workable, "https://apply.workable.com/acme_labs.io/j/1"),
            Some("acme_labs.io".to_string())
        );
    }

    #[test]
    fn test_host_slug() {
        assert_eq!(
            slug_of(BoardFamily::Teamtailor, "https://acme.teamtailor.com/jobs/42-engineer"),
            Some("acme".to_string())
        );
        assert_eq!(
            slug_of(BoardFamily::Recruitee, "https://acme.recruitee.com/o/backend"),
            Some("acme".to_string())
        );
    }

    #[test]
    fn test_board_roots() {
        assert_eq!(BoardFamily::Teamtailor.board_root("acme"), "https://acme.teamtailor.com/jobs");
        assert_eq!(BoardFamily::Recruitee.board_root("acme"), "https://acme.recruitee.com");
        assert_eq!(
            BoardFamily::SmartRecruiters.board_root("acme"),
            "https://careers.smartrecruiters.com/acme"
        );
    }
}
