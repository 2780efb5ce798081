//! In-Memory Content Client
//!
//! Implements the `BibleClient` port from a preloaded catalogue. Used for
//! tests and offline runs; supports failure injection.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::domain::{BibleClient, BibleReference, BibleVersion, ChapterKey, VersionId};
use crate::error::{Error, Result};

/// Network failure to inject into every subsequent fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFailure {
    NotPermitted,
    CannotDownload,
    InvalidResponse,
}

impl NetworkFailure {
    fn to_error(self) -> Error {
        match self {
            NetworkFailure::NotPermitted => Error::NotPermitted,
            NetworkFailure::CannotDownload => Error::CannotDownload {
                reason: "injected failure".into(),
            },
            NetworkFailure::InvalidResponse => Error::InvalidResponse("injected failure".into()),
        }
    }
}

/// Content client serving from memory.
///
/// Unknown ids and chapters fail with [`Error::CannotDownload`], the way a
/// 404 from the content API does.
#[derive(Debug, Default)]
pub struct InMemoryBibleClient {
    versions: DashMap<VersionId, BibleVersion>,
    chapters: DashMap<ChapterKey, String>,
    failure: RwLock<Option<NetworkFailure>>,
    version_fetches: AtomicU64,
    chapter_fetches: AtomicU64,
}

impl InMemoryBibleClient {
    /// Create an empty client
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a version in the catalogue
    pub fn insert_version(&self, version: BibleVersion) {
        self.versions.insert(version.id, version);
    }

    /// Add or replace a chapter in the catalogue
    pub fn insert_chapter(&self, reference: &BibleReference, content: impl Into<String>) {
        self.chapters.insert(reference.chapter_key(), content.into());
    }

    /// Make every fetch fail until [`recover`](Self::recover) is called
    pub fn fail_with(&self, failure: NetworkFailure) {
        *self.failure.write() = Some(failure);
    }

    /// Stop injecting failures
    pub fn recover(&self) {
        *self.failure.write() = None;
    }

    /// Number of `fetch_version` calls, successful or not
    pub fn version_fetches(&self) -> u64 {
        self.version_fetches.load(Ordering::Relaxed)
    }

    /// Number of `fetch_chapter` calls, successful or not
    pub fn chapter_fetches(&self) -> u64 {
        self.chapter_fetches.load(Ordering::Relaxed)
    }

    fn injected(&self) -> Result<()> {
        match *self.failure.read() {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BibleClient for InMemoryBibleClient {
    async fn fetch_version(&self, id: VersionId) -> Result<BibleVersion> {
        self.version_fetches.fetch_add(1, Ordering::Relaxed);
        self.injected()?;
        self.versions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::CannotDownload {
                reason: format!("version {} not found", id),
            })
    }

    async fn fetch_chapter(&self, reference: &BibleReference) -> Result<String> {
        self.chapter_fetches.fetch_add(1, Ordering::Relaxed);
        self.injected()?;
        self.chapters
            .get(&reference.chapter_key())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::CannotDownload {
                reason: format!("chapter {} not found", reference.chapter_key()),
            })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn make_version(id: VersionId) -> BibleVersion {
        BibleVersion {
            id,
            abbreviation: "KJV".into(),
            title: "King James Version".into(),
            language_tag: "en".into(),
            copyright: String::new(),
            books: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_serves_catalogue() {
        let client = InMemoryBibleClient::new();
        client.insert_version(make_version(1));
        let reference = BibleReference::chapter(1, "GEN", 1).unwrap();
        client.insert_chapter(&reference, "In the beginning");

        assert_eq!(client.fetch_version(1).await.unwrap(), make_version(1));
        assert_eq!(client.fetch_chapter(&reference).await.unwrap(), "In the beginning");
        assert_eq!(client.version_fetches(), 1);
        assert_eq!(client.chapter_fetches(), 1);
    }

    #[tokio::test]
    async fn test_unknown_is_cannot_download() {
        let client = InMemoryBibleClient::new();
        assert_matches!(
            client.fetch_version(404).await,
            Err(Error::CannotDownload { .. })
        );
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let client = InMemoryBibleClient::new();
        client.insert_version(make_version(1));

        client.fail_with(NetworkFailure::NotPermitted);
        assert_matches!(client.fetch_version(1).await, Err(Error::NotPermitted));

        client.fail_with(NetworkFailure::InvalidResponse);
        assert_matches!(client.fetch_version(1).await, Err(Error::InvalidResponse(_)));

        client.recover();
        assert!(client.fetch_version(1).await.is_ok());
        assert_eq!(client.version_fetches(), 3);
    }
}
