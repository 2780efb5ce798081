//! Reader Context
//!
//! Owns the long-lived pieces of the caching stack: the three tiers, the
//! network client, key/value storage and shared metrics. The host builds one
//! context at startup and hands out repositories from it.

use std::sync::Arc;

use tracing::info;

use crate::cache::{BibleVersionCache, CacheMetrics, DiskCache, MemoryCache, MetricsSnapshot};
use crate::config::CacheConfig;
use crate::domain::{BibleClient, Storage};
use crate::error::Result;
use crate::repository::BibleVersionRepository;

/// Shared state behind every repository handed out.
#[derive(Clone)]
pub struct ReaderContext {
    memory: Arc<dyn BibleVersionCache>,
    temporary: Arc<dyn BibleVersionCache>,
    persistent: Arc<dyn BibleVersionCache>,
    client: Arc<dyn BibleClient>,
    storage: Arc<dyn Storage>,
    metrics: Arc<CacheMetrics>,
}

impl ReaderContext {
    /// Build a context with a fresh memory tier and disk tiers under the
    /// configured directories.
    pub fn new(
        config: &CacheConfig,
        client: Arc<dyn BibleClient>,
        storage: Arc<dyn Storage>,
    ) -> Result<Self> {
        let temporary = DiskCache::temporary(&config.temporary_dir)?;
        let persistent = DiskCache::persistent(&config.persistent_dir)?;

        info!(
            temporary = %config.temporary_dir.display(),
            persistent = %config.persistent_dir.display(),
            "Cache tiers ready"
        );

        Ok(Self::from_parts(
            Arc::new(MemoryCache::new()),
            Arc::new(temporary),
            Arc::new(persistent),
            client,
            storage,
        ))
    }

    /// Build a context from caller-supplied tiers.
    pub fn from_parts(
        memory: Arc<dyn BibleVersionCache>,
        temporary: Arc<dyn BibleVersionCache>,
        persistent: Arc<dyn BibleVersionCache>,
        client: Arc<dyn BibleClient>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            memory,
            temporary,
            persistent,
            client,
            storage,
            metrics: Arc::new(CacheMetrics::new()),
        }
    }

    /// A repository over this context's tiers. Repositories share tiers
    /// and metrics.
    pub fn repository(&self) -> BibleVersionRepository {
        BibleVersionRepository::with_metrics(
            self.memory.clone(),
            self.temporary.clone(),
            self.persistent.clone(),
            self.client.clone(),
            self.metrics.clone(),
        )
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl std::fmt::Debug for ReaderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderContext")
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryBibleClient, InMemoryStorage};
    use crate::cache::CacheTier;
    use crate::domain::BibleVersion;
    use crate::repository::ContentSource;

    fn make_version(id: u32) -> BibleVersion {
        BibleVersion {
            id,
            abbreviation: "ESV".into(),
            title: "English Standard Version".into(),
            language_tag: "en".into(),
            copyright: String::new(),
            books: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_repositories_share_tiers_and_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let config = CacheConfig {
            temporary_dir: dir.path().join("tmp"),
            persistent_dir: dir.path().join("data"),
        };
        let client = Arc::new(InMemoryBibleClient::new());
        client.insert_version(make_version(59));

        let context =
            ReaderContext::new(&config, client.clone(), Arc::new(InMemoryStorage::new())).unwrap();

        let first = context.repository().lookup_version(59).await.unwrap();
        assert_eq!(first.source, ContentSource::Network);

        let second = context.repository().lookup_version(59).await.unwrap();
        assert_eq!(second.source, ContentSource::Tier(CacheTier::Memory));

        assert_eq!(client.version_fetches(), 1);
        assert_eq!(context.metrics().network_fetches, 1);
        assert!(config.persistent_dir.join("versions").join("59.json").exists());
    }

    #[tokio::test]
    async fn test_persistent_tier_survives_new_context() {
        let dir = tempfile::tempdir().unwrap();
        let config = CacheConfig {
            temporary_dir: dir.path().join("tmp"),
            persistent_dir: dir.path().join("data"),
        };
        let client = Arc::new(InMemoryBibleClient::new());
        client.insert_version(make_version(1));

        let storage = Arc::new(InMemoryStorage::new());
        let context = ReaderContext::new(&config, client.clone(), storage.clone()).unwrap();
        context.repository().version(1).await.unwrap();
        drop(context);

        let context = ReaderContext::new(&config, client.clone(), storage).unwrap();
        let lookup = context.repository().lookup_version(1).await.unwrap();
        assert_eq!(lookup.source, ContentSource::Tier(CacheTier::Temporary));
        assert_eq!(client.version_fetches(), 1);
    }

    #[test]
    fn test_storage_accessor() {
        let context = ReaderContext::from_parts(
            Arc::new(MemoryCache::new()),
            Arc::new(MemoryCache::new()),
            Arc::new(MemoryCache::new()),
            Arc::new(InMemoryBibleClient::new()),
            Arc::new(InMemoryStorage::new()),
        );
        context.storage().set_int("last_version_id", 1);
        assert_eq!(context.storage().get_int("last_version_id"), Some(1));
    }
}
