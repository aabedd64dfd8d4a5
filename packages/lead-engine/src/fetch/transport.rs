//! HTTP transport seam.
//!
//! The fetcher owns retry, cooldown and caching policy; a transport only
//! performs one GET and reports what happened.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ConfigError, TransportError};
use crate::types::FetchConfig;

/// Raw outcome of one GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
    /// URL after redirects
    pub final_url: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>, final_url: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            final_url: final_url.into(),
        }
    }
}

/// Performs single HTTP GETs.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

/// `reqwest`-backed transport with independent connect and read budgets.
///
/// Bodies are streamed and truncated at `max_body_bytes`.
pub struct HttpTransport {
    client: reqwest::Client,
    user_agent: String,
    max_body_bytes: usize,
}

impl HttpTransport {
    /// Build the client. Failure here is fatal for the run.
    pub fn new(config: &FetchConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

/// Append `chunk` without letting `body` grow past `max`. Returns false once
/// the cap is hit.
fn append_capped(body: &mut Vec<u8>, chunk: &[u8], max: usize) -> bool {
    let room = max.saturating_sub(body.len());
    if chunk.len() > room {
        body.extend_from_slice(&chunk[..room]);
        false
    } else {
        body.extend_from_slice(chunk);
        true
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        if e.is_connect() {
            TransportError::ConnectTimeout
        } else {
            TransportError::ReadTimeout
        }
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        debug!(url = %url, "HTTP fetch starting");
        let request = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5");

        let mut response = request.send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            if !append_capped(&mut body, &chunk, self.max_body_bytes) {
                debug!(url = %url, max_bytes = self.max_body_bytes, "Body truncated");
                break;
            }
        }

        Ok(TransportResponse {
            status,
            body,
            final_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_is_capped_across_chunks() {
        let mut body = Vec::new();
        assert!(append_capped(&mut body, b"<html>", 10));
        assert!(append_capped(&mut body, b"<bo", 10));
        assert!(!append_capped(&mut body, b"dy></body>", 10));
        assert_eq!(body, b"<html><bod");
        assert!(!append_capped(&mut body, b"more", 10));
        assert_eq!(body.len(), 10);
    }

    #[test]
    fn test_body_under_cap_is_kept_whole() {
        let mut body = Vec::new();
        assert!(append_capped(&mut body, b"<p>ok</p>", 9));
        assert_eq!(body, b"<p>ok</p>");
    }

    #[test]
    fn test_client_builds_from_config() {
        let config = FetchConfig::default().with_max_body_bytes(1024);
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.max_body_bytes, 1024);
    }
}
