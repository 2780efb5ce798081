//! HTTP Content Client
//!
//! Implements the `BibleClient` port against the content REST API.
//!
//! - `GET {base_url}/v1/bibles/{id}` → [`BibleVersion`] JSON
//! - `GET {base_url}/v1/bibles/{id}/passages/{BOOK.CH}` → passage JSON
//!
//! Status mapping: 401/403 → `NotPermitted`, any other non-success status or
//! transport failure → `CannotDownload`, undecodable body → `InvalidResponse`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::domain::{BibleClient, BibleReference, BibleVersion, VersionId};
use crate::error::{Error, Result};

/// Header carrying the application key
pub const APP_KEY_HEADER: &str = "X-App-Key";

/// Passage payload; only the content is kept
#[derive(Debug, Deserialize)]
struct PassageResponse {
    content: String,
}

/// `BibleClient` backed by `reqwest`.
pub struct HttpBibleClient {
    config: ClientConfig,
    client: Client,
}

impl HttpBibleClient {
    /// Create a new HTTP client
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(Error::Config("content API base URL is empty".into()));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn version_url(&self, id: VersionId) -> String {
        format!("{}/v1/bibles/{}", self.config.base_url.trim_end_matches('/'), id)
    }

    fn passage_url(&self, reference: &BibleReference) -> String {
        format!(
            "{}/passages/{}",
            self.version_url(reference.version_id()),
            urlencoding::encode(&reference.chapter_usfm())
        )
    }

    async fn get(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let mut request = self.client.get(url);
        if let Some(key) = &self.config.app_key {
            request = request.header(APP_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|e| Error::CannotDownload {
            reason: e.to_string(),
        })?;

        check_status(response.status())?;

        response.text().await.map_err(|e| Error::CannotDownload {
            reason: e.to_string(),
        })
    }
}

impl std::fmt::Debug for HttpBibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBibleClient")
            .field("base_url", &self.config.base_url)
            .field("request_timeout", &self.config.request_timeout)
            .finish()
    }
}

/// Map a response status onto the network error taxonomy.
fn check_status(status: StatusCode) -> Result<()> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::NotPermitted),
        s => Err(Error::CannotDownload {
            reason: format!("server returned {}", s),
        }),
    }
}

fn decode_version(body: &str) -> Result<BibleVersion> {
    serde_json::from_str(body).map_err(|e| Error::InvalidResponse(e.to_string()))
}

fn decode_passage(body: &str) -> Result<String> {
    serde_json::from_str::<PassageResponse>(body)
        .map(|passage| passage.content)
        .map_err(|e| Error::InvalidResponse(e.to_string()))
}

#[async_trait]
impl BibleClient for HttpBibleClient {
    #[instrument(skip(self))]
    async fn fetch_version(&self, id: VersionId) -> Result<BibleVersion> {
        let body = self.get(&self.version_url(id)).await?;
        decode_version(&body)
    }

    #[instrument(skip(self, reference), fields(reference = %reference))]
    async fn fetch_chapter(&self, reference: &BibleReference) -> Result<String> {
        let body = self.get(&self.passage_url(reference)).await?;
        decode_passage(&body)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::time::Duration;

    fn make_client(base_url: &str) -> HttpBibleClient {
        HttpBibleClient::new(ClientConfig {
            base_url: base_url.to_string(),
            app_key: Some("key".into()),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let config = ClientConfig {
            base_url: String::new(),
            ..ClientConfig::default()
        };
        assert_matches!(HttpBibleClient::new(config), Err(Error::Config(_)));
    }

    #[test]
    fn test_urls() {
        let client = make_client("https://api.example.com/");
        assert_eq!(client.version_url(111), "https://api.example.com/v1/bibles/111");

        let reference = BibleReference::parse(111, "JHN.3.16").unwrap();
        assert_eq!(
            client.passage_url(&reference),
            "https://api.example.com/v1/bibles/111/passages/JHN.3"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert_matches!(check_status(StatusCode::UNAUTHORIZED), Err(Error::NotPermitted));
        assert_matches!(check_status(StatusCode::FORBIDDEN), Err(Error::NotPermitted));
        assert_matches!(
            check_status(StatusCode::NOT_FOUND),
            Err(Error::CannotDownload { .. })
        );
        assert_matches!(
            check_status(StatusCode::SERVICE_UNAVAILABLE),
            Err(Error::CannotDownload { .. })
        );
    }

    #[test]
    fn test_decode_version() {
        let body = r#"{
            "id": 111,
            "abbreviation": "NIV",
            "title": "New International Version",
            "languageTag": "en",
            "copyright": "Biblica",
            "books": [{"usfm": "GEN", "title": "Genesis", "chapters": ["1", "2"]}]
        }"#;
        let version = decode_version(body).unwrap();
        assert_eq!(version.id, 111);
        assert_eq!(version.books[0].chapters.len(), 2);

        assert_matches!(decode_version("{\"id\": \"x\"}"), Err(Error::InvalidResponse(_)));
    }

    #[test]
    fn test_decode_passage() {
        let body = r#"{"id": "JHN.3", "content": "For God so loved the world"}"#;
        assert_eq!(decode_passage(body).unwrap(), "For God so loved the world");
        assert_matches!(decode_passage("<html>"), Err(Error::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_cannot_download() {
        // Port 9 (discard) on localhost is closed on test machines
        let client = make_client("http://127.0.0.1:9");
        assert_matches!(
            client.fetch_version(1).await,
            Err(Error::CannotDownload { .. })
        );
    }
}
