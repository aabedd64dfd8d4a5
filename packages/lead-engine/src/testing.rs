//! Testing utilities including mock implementations.
//!
//! These let applications exercise the pipeline without real HTTP, search or
//! classifier backends.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::error::{ClassifyError, SearchError, TransportError};
use crate::fetch::transport::{Transport, TransportResponse};
use crate::traits::classifier::{Classification, Classifier, Pages};
use crate::traits::search::{SearchHit, SearchParams, SearchProvider};

type Scripted = Result<TransportResponse, TransportError>;

/// A mock transport with scripted responses per URL.
///
/// Responses for a URL are served in the order they were added; the last
/// one repeats. Unscripted URLs answer 404.
#[derive(Default, Clone)]
pub struct MockTransport {
    scripts: Arc<RwLock<HashMap<String, Vec<Scripted>>>>,

    /// URLs in request order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, url: impl Into<String>, response: Scripted) -> Self {
        self.scripts
            .write()
            .unwrap()
            .entry(url.into())
            .or_default()
            .push(response);
        self
    }

    /// Answer 200 with `body`.
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        let response = TransportResponse::new(200, body.into().into_bytes(), url.clone());
        self.push(url, Ok(response))
    }

    /// Answer with an empty body and the given status.
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        let url = url.into();
        let response = TransportResponse::new(status, Vec::new(), url.clone());
        self.push(url, Ok(response))
    }

    /// Fail the request at the transport level.
    pub fn with_error(self, url: impl Into<String>, error: TransportError) -> Self {
        self.push(url, Err(error))
    }

    /// Number of GETs issued for a URL.
    pub fn request_count(&self, url: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|u| *u == url).count()
    }

    /// Every URL requested, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let served = {
            let mut calls = self.calls.write().unwrap();
            calls.push(url.to_string());
            calls.iter().filter(|u| *u == url).count()
        };

        let scripts = self.scripts.read().unwrap();
        match scripts.get(url) {
            Some(script) if !script.is_empty() => {
                let index = (served - 1).min(script.len() - 1);
                script[index].clone()
            }
            _ => Ok(TransportResponse::new(404, Vec::new(), url)),
        }
    }
}

/// A mock classifier that returns one fixed verdict.
#[derive(Clone)]
pub struct MockClassifier {
    verdict: Option<Classification>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockClassifier {
    pub fn returning(verdict: Classification) -> Self {
        Self {
            verdict: Some(verdict),
            calls: Arc::default(),
        }
    }

    /// Fails every call with a backend error.
    pub fn failing() -> Self {
        Self {
            verdict: None,
            calls: Arc::default(),
        }
    }

    /// Domains classified, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, domain: &str, _pages: &Pages) -> Result<Classification, ClassifyError> {
        self.calls.write().unwrap().push(domain.to_string());
        self.verdict
            .clone()
            .ok_or_else(|| ClassifyError::Backend("mock classifier failure".into()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// A mock search provider with canned hits per query.
#[derive(Default, Clone)]
pub struct MockSearchProvider {
    hits: Arc<RwLock<HashMap<String, Vec<SearchHit>>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(self, query: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        self.hits.write().unwrap().insert(query.into(), hits);
        self
    }

    /// Make a query fail with a provider error.
    pub fn with_failure(self, query: impl Into<String>) -> Self {
        self.failing.write().unwrap().insert(query.into());
        self
    }

    /// Queries searched, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, query: &str, _params: SearchParams) -> Result<Vec<SearchHit>, SearchError> {
        self.calls.write().unwrap().push(query.to_string());
        if self.failing.read().unwrap().contains(query) {
            return Err(SearchError::Provider(format!("mock failure for '{}'", query).into()));
        }
        Ok(self.hits.read().unwrap().get(query).cloned().unwrap_or_default())
    }
}
