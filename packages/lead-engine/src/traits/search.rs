//! Search provider seam for discovery.
//!
//! The engine never calls a search API itself. Applications implement
//! [`SearchProvider`] over whichever engine they pay for, and [`QueryPack`]s
//! describe which queries to run for which source type.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::SourceType;

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub link: String,
    /// 1-based position across all pages
    pub rank: u32,
}

impl SearchHit {
    pub fn new(link: impl Into<String>, rank: u32) -> Self {
        Self {
            title: None,
            snippet: None,
            link: link.into(),
            rank,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

/// Paging parameters for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub pages: u32,
    pub results_per_page: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            pages: 1,
            results_per_page: 10,
        }
    }
}

/// A named set of queries feeding one source type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPack {
    pub name: String,
    pub source_type: SourceType,
    pub queries: Vec<String>,
    #[serde(default = "default_pages")]
    pub pages: u32,
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,
}

fn default_pages() -> u32 {
    1
}

fn default_results_per_page() -> u32 {
    10
}

impl QueryPack {
    pub fn new(name: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            name: name.into(),
            source_type,
            queries: Vec::new(),
            pages: default_pages(),
            results_per_page: default_results_per_page(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.queries.push(query.into());
        self
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages;
        self
    }

    pub fn params(&self) -> SearchParams {
        SearchParams {
            pages: self.pages,
            results_per_page: self.results_per_page,
        }
    }
}

/// Web search used for discovery.
///
/// Results may be empty, may span several pages and may repeat links; the
/// ledger takes care of duplicates.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, params: SearchParams) -> Result<Vec<SearchHit>, SearchError>;
}
