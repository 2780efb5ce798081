//! Memory Tier - In-Process Cache
//!
//! Fastest and least durable tier. Contents are lost when the process exits.
//!
//! # Design
//!
//! - Two maps (versions, chapters), each behind its own `RwLock`
//! - No operation suspends; locks are never held across an `.await`
//! - Never returns an error

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{BibleVersionCache, CacheTier};
use crate::domain::{BibleReference, BibleVersion, ChapterKey, VersionId};
use crate::error::Result;

/// Memory tier backed by two independently locked hash maps.
#[derive(Debug, Default)]
pub struct MemoryCache {
    versions: RwLock<HashMap<VersionId, BibleVersion>>,
    chapters: RwLock<HashMap<ChapterKey, String>>,
}

impl MemoryCache {
    /// Create an empty memory cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached versions
    pub fn len(&self) -> usize {
        self.versions.read().len()
    }

    /// Check if no versions are cached
    pub fn is_empty(&self) -> bool {
        self.versions.read().is_empty()
    }

    /// Number of cached chapters across all versions
    pub fn chapter_count(&self) -> usize {
        self.chapters.read().len()
    }

    /// Drop everything
    pub fn clear(&self) {
        self.versions.write().clear();
        self.chapters.write().clear();
    }
}

#[async_trait]
impl BibleVersionCache for MemoryCache {
    fn tier(&self) -> CacheTier {
        CacheTier::Memory
    }

    async fn stored_version_ids(&self) -> Result<HashSet<VersionId>> {
        Ok(self.versions.read().keys().copied().collect())
    }

    async fn version(&self, id: VersionId) -> Result<Option<BibleVersion>> {
        Ok(self.versions.read().get(&id).cloned())
    }

    async fn chapter_content(&self, reference: &BibleReference) -> Result<Option<String>> {
        Ok(self.chapters.read().get(&reference.chapter_key()).cloned())
    }

    async fn put_version(&self, version: &BibleVersion) -> Result<()> {
        self.versions.write().insert(version.id, version.clone());
        Ok(())
    }

    async fn put_chapter_content(&self, content: &str, reference: &BibleReference) -> Result<()> {
        self.chapters
            .write()
            .insert(reference.chapter_key(), content.to_string());
        Ok(())
    }

    async fn remove_version(&self, id: VersionId) -> Result<()> {
        self.versions.write().remove(&id);
        Ok(())
    }

    async fn remove_version_chapters(&self, id: VersionId) -> Result<()> {
        self.chapters.write().retain(|key, _| key.version_id != id);
        Ok(())
    }

    // Single write lock instead of the list-then-remove default.
    async fn remove_unpermitted_versions(&self, permitted: &HashSet<VersionId>) -> Result<()> {
        self.versions.write().retain(|id, _| permitted.contains(id));
        Ok(())
    }

    async fn is_version_present(&self, id: VersionId) -> Result<bool> {
        Ok(self.versions.read().contains_key(&id))
    }

    async fn are_chapters_present(&self, id: VersionId) -> Result<bool> {
        Ok(self.chapters.read().keys().any(|key| key.version_id == id))
    }
}

// =============================================================================
// Tests
// =============================================================================
