//! Version/Chapter Repository
//!
//! Single entry point for Bible versions and chapter text. Reads go
//! Memory → Temporary → Persistent → network and stop at the first hit; the
//! value is then written into every faster tier that lacked it.
//!
//! Tier failures are logged and treated as misses. Only a total miss
//! followed by a network failure reaches the caller, with the network error
//! passed through unchanged. The repository never retries.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::cache::{BibleVersionCache, CacheMetrics, CacheTier, MetricsSnapshot};
use crate::domain::{BibleClient, BibleReference, BibleVersion, VersionId};
use crate::error::Result;

/// Where a looked-up value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    Tier(CacheTier),
    Network,
}

impl std::fmt::Display for ContentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentSource::Tier(tier) => write!(f, "{} tier", tier),
            ContentSource::Network => write!(f, "network"),
        }
    }
}

/// Lookup result with provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<T> {
    pub value: T,
    pub source: ContentSource,
}

impl<T> Lookup<T> {
    fn new(value: T, source: ContentSource) -> Self {
        Self { value, source }
    }
}

/// Read-through repository over the three cache tiers and the network.
#[derive(Clone)]
pub struct BibleVersionRepository {
    memory: Arc<dyn BibleVersionCache>,
    temporary: Arc<dyn BibleVersionCache>,
    persistent: Arc<dyn BibleVersionCache>,
    client: Arc<dyn BibleClient>,
    metrics: Arc<CacheMetrics>,
}

impl BibleVersionRepository {
    /// Create a repository with its own metrics collector
    pub fn new(
        memory: Arc<dyn BibleVersionCache>,
        temporary: Arc<dyn BibleVersionCache>,
        persistent: Arc<dyn BibleVersionCache>,
        client: Arc<dyn BibleClient>,
    ) -> Self {
        Self::with_metrics(
            memory,
            temporary,
            persistent,
            client,
            Arc::new(CacheMetrics::new()),
        )
    }

    /// Create a repository recording into a shared metrics collector
    pub fn with_metrics(
        memory: Arc<dyn BibleVersionCache>,
        temporary: Arc<dyn BibleVersionCache>,
        persistent: Arc<dyn BibleVersionCache>,
        client: Arc<dyn BibleClient>,
        metrics: Arc<CacheMetrics>,
    ) -> Self {
        Self {
            memory,
            temporary,
            persistent,
            client,
            metrics,
        }
    }

    // =========================================================================
    // Read path
    // =========================================================================

    /// Resolve a version, fetching it from the network on a total miss.
    pub async fn version(&self, id: VersionId) -> Result<BibleVersion> {
        Ok(self.lookup_version(id).await?.value)
    }

    /// Resolve a version and report which source answered.
    #[instrument(skip(self), fields(version_id = id))]
    pub async fn lookup_version(&self, id: VersionId) -> Result<Lookup<BibleVersion>> {
        if let Some(version) = self.read_version(self.memory.as_ref(), id).await {
            return Ok(Lookup::new(version, ContentSource::Tier(CacheTier::Memory)));
        }

        if let Some(version) = self.read_version(self.temporary.as_ref(), id).await {
            self.promote_version(self.memory.as_ref(), &version).await;
            return Ok(Lookup::new(version, ContentSource::Tier(CacheTier::Temporary)));
        }

        if let Some(version) = self.read_version(self.persistent.as_ref(), id).await {
            self.promote_version(self.memory.as_ref(), &version).await;
            self.promote_version(self.temporary.as_ref(), &version).await;
            return Ok(Lookup::new(version, ContentSource::Tier(CacheTier::Persistent)));
        }

        self.metrics.record_network_fetch();
        let version = self.client.fetch_version(id).await.map_err(|e| {
            self.metrics.record_network_failure();
            warn!(version_id = id, error = %e, "Version fetch failed");
            e
        })?;
        debug!(version_id = id, "Fetched version from network");

        self.promote_version(self.memory.as_ref(), &version).await;
        self.promote_version(self.temporary.as_ref(), &version).await;
        self.promote_version(self.persistent.as_ref(), &version).await;
        Ok(Lookup::new(version, ContentSource::Network))
    }

    /// Resolve the text of the chapter `reference` points into.
    pub async fn chapter_content(&self, reference: &BibleReference) -> Result<String> {
        Ok(self.lookup_chapter(reference).await?.value)
    }

    /// Resolve chapter text and report which source answered.
    #[instrument(skip(self, reference), fields(version_id = reference.version_id(), chapter = %reference.chapter_usfm()))]
    pub async fn lookup_chapter(&self, reference: &BibleReference) -> Result<Lookup<String>> {
        if let Some(content) = self.read_chapter(self.memory.as_ref(), reference).await {
            return Ok(Lookup::new(content, ContentSource::Tier(CacheTier::Memory)));
        }

        if let Some(content) = self.read_chapter(self.temporary.as_ref(), reference).await {
            self.promote_chapter(self.memory.as_ref(), &content, reference).await;
            return Ok(Lookup::new(content, ContentSource::Tier(CacheTier::Temporary)));
        }

        if let Some(content) = self.read_chapter(self.persistent.as_ref(), reference).await {
            self.promote_chapter(self.memory.as_ref(), &content, reference).await;
            self.promote_chapter(self.temporary.as_ref(), &content, reference).await;
            return Ok(Lookup::new(content, ContentSource::Tier(CacheTier::Persistent)));
        }

        self.metrics.record_network_fetch();
        let content = self.client.fetch_chapter(reference).await.map_err(|e| {
            self.metrics.record_network_failure();
            warn!(reference = %reference, error = %e, "Chapter fetch failed");
            e
        })?;
        debug!(reference = %reference, "Fetched chapter from network");

        self.promote_chapter(self.memory.as_ref(), &content, reference).await;
        self.promote_chapter(self.temporary.as_ref(), &content, reference).await;
        self.promote_chapter(self.persistent.as_ref(), &content, reference).await;
        Ok(Lookup::new(content, ContentSource::Network))
    }

    async fn read_version(&self, cache: &dyn BibleVersionCache, id: VersionId) -> Option<BibleVersion> {
        let tier = cache.tier();
        match cache.version(id).await {
            Ok(Some(version)) => {
                self.metrics.record_hit(tier);
                Some(version)
            }
            Ok(None) => {
                self.metrics.record_miss(tier);
                None
            }
            Err(e) => {
                self.metrics.record_error(tier);
                warn!(tier = %tier, version_id = id, error = %e, "Tier read failed, treating as miss");
                None
            }
        }
    }

    async fn read_chapter(
        &self,
        cache: &dyn BibleVersionCache,
        reference: &BibleReference,
    ) -> Option<String> {
        let tier = cache.tier();
        match cache.chapter_content(reference).await {
            Ok(Some(content)) => {
                self.metrics.record_hit(tier);
                Some(content)
            }
            Ok(None) => {
                self.metrics.record_miss(tier);
                None
            }
            Err(e) => {
                self.metrics.record_error(tier);
                warn!(tier = %tier, reference = %reference, error = %e, "Tier read failed, treating as miss");
                None
            }
        }
    }

    /// Write `version` into `cache` unless the tier already holds it.
    async fn promote_version(&self, cache: &dyn BibleVersionCache, version: &BibleVersion) {
        let tier = cache.tier();
        match cache.is_version_present(version.id).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                self.metrics.record_error(tier);
                warn!(tier = %tier, version_id = version.id, error = %e, "Presence probe failed, skipping promotion");
                return;
            }
        }

        match cache.put_version(version).await {
            Ok(()) => {
                self.metrics.record_promotion(tier);
                debug!(tier = %tier, version_id = version.id, "Promoted version");
            }
            Err(e) => {
                self.metrics.record_error(tier);
                warn!(tier = %tier, version_id = version.id, error = %e, "Version promotion failed");
            }
        }
    }

    /// Write chapter text into a tier that just missed it.
    async fn promote_chapter(
        &self,
        cache: &dyn BibleVersionCache,
        content: &str,
        reference: &BibleReference,
    ) {
        let tier = cache.tier();
        match cache.put_chapter_content(content, reference).await {
            Ok(()) => {
                self.metrics.record_promotion(tier);
                debug!(tier = %tier, reference = %reference, "Promoted chapter");
            }
            Err(e) => {
                self.metrics.record_error(tier);
                warn!(tier = %tier, reference = %reference, error = %e, "Chapter promotion failed");
            }
        }
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    /// Drop every cached version whose id is not in `permitted`.
    ///
    /// Applied to each tier independently. Every tier is attempted; if any
    /// fail, the first error is returned after the others have run.
    #[instrument(skip(self, permitted), fields(permitted = permitted.len()))]
    pub async fn remove_unpermitted_versions(&self, permitted: &HashSet<VersionId>) -> Result<()> {
        let results = join_all(
            self.tiers()
                .map(|cache| async move { (cache.tier(), cache.remove_unpermitted_versions(permitted).await) }),
        )
        .await;
        info!("Removed unpermitted versions");
        self.first_error(results, "remove unpermitted versions")
    }

    /// Drop all cached chapters of `version_id` from every tier.
    #[instrument(skip(self))]
    pub async fn remove_version_chapters(&self, version_id: VersionId) -> Result<()> {
        let results = join_all(
            self.tiers()
                .map(|cache| async move { (cache.tier(), cache.remove_version_chapters(version_id).await) }),
        )
        .await;
        info!(version_id, "Removed version chapters");
        self.first_error(results, "remove version chapters")
    }

    /// Drop the version entry from every tier. Chapters are kept.
    #[instrument(skip(self))]
    pub async fn remove_version(&self, version_id: VersionId) -> Result<()> {
        let results = join_all(
            self.tiers()
                .map(|cache| async move { (cache.tier(), cache.remove_version(version_id).await) }),
        )
        .await;
        info!(version_id, "Removed version");
        self.first_error(results, "remove version")
    }

    fn first_error(&self, results: Vec<(CacheTier, Result<()>)>, operation: &str) -> Result<()> {
        let mut first = None;
        for (tier, result) in results {
            if let Err(e) = result {
                self.metrics.record_error(tier);
                warn!(tier = %tier, error = %e, "Failed to {}", operation);
                first.get_or_insert(e);
            }
        }
        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Union of version ids resident in any tier. Failing tiers are skipped.
    pub async fn stored_version_ids(&self) -> HashSet<VersionId> {
        let mut ids = HashSet::new();
        for cache in self.tiers() {
            match cache.stored_version_ids().await {
                Ok(tier_ids) => ids.extend(tier_ids),
                Err(e) => {
                    self.metrics.record_error(cache.tier());
                    warn!(tier = %cache.tier(), error = %e, "Failed to list stored versions");
                }
            }
        }
        ids
    }

    /// True if any tier holds the version. Failing tiers count as absent.
    pub async fn is_version_cached(&self, id: VersionId) -> bool {
        for cache in self.tiers() {
            if let Ok(true) = cache.is_version_present(id).await {
                return true;
            }
        }
        false
    }

    /// The cache serving `tier`
    pub fn tier(&self, tier: CacheTier) -> &dyn BibleVersionCache {
        match tier {
            CacheTier::Memory => self.memory.as_ref(),
            CacheTier::Temporary => self.temporary.as_ref(),
            CacheTier::Persistent => self.persistent.as_ref(),
        }
    }

    fn tiers(&self) -> impl Iterator<Item = &dyn BibleVersionCache> {
        CacheTier::ALL.into_iter().map(move |tier| self.tier(tier))
    }

    /// Get metrics snapshot
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl std::fmt::Debug for BibleVersionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BibleVersionRepository")
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
