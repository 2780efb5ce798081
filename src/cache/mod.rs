//! Three-Tiered Bible Content Cache
//!
//! Version metadata and chapter text cached in Memory, Temporary (disk,
//! evictable) and Persistent (disk, durable) tiers behind one contract.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                     BibleVersionRepository                                │
//! ├──────────────────────────────────────────────────────────────────────────┤
//! │  Memory              │ Temporary            │ Persistent                  │
//! │  ┌────────────────┐  │ ┌────────────────┐   │ ┌────────────────────┐      │
//! │  │ RwLock<HashMap>│  │ │ DiskCache      │   │ │ DiskCache          │      │
//! │  │ x2 (versions,  │  │ │ (OS may evict) │   │ │ (durable)          │      │
//! │  │     chapters)  │  │ └────────────────┘   │ └────────────────────┘      │
//! │  └────────────────┘  │         │            │           │                 │
//! │         └────────────┴─────────┴────────────┴───────────┘                 │
//! │                              │                                            │
//! │                  Read-through + upward promotion                          │
//! │                              │                                            │
//! │                        BibleClient (network)                              │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tier keeps two logical maps, version id → [`BibleVersion`] and
//! [`ChapterKey`] → chapter text, each behind its own lock so version and
//! chapter operations never block each other. Tiers never call each other.
//!
//! [`ChapterKey`]: crate::domain::ChapterKey

mod disk;
mod memory;
mod metrics;

pub use disk::DiskCache;
pub use memory::MemoryCache;
pub use metrics::{CacheMetrics, MetricsSnapshot, TierSnapshot};

use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;

use crate::domain::{BibleReference, BibleVersion, VersionId};
use crate::error::Result;

/// Cache tier, ordered fastest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheTier {
    /// In-process, volatile
    Memory,
    /// Disk, evictable under storage pressure
    Temporary,
    /// Disk, durable
    Persistent,
}

impl CacheTier {
    /// All tiers in lookup order.
    pub const ALL: [CacheTier; 3] = [CacheTier::Memory, CacheTier::Temporary, CacheTier::Persistent];

    /// Position in lookup order (0 = fastest).
    pub fn index(self) -> usize {
        match self {
            CacheTier::Memory => 0,
            CacheTier::Temporary => 1,
            CacheTier::Persistent => 2,
        }
    }
}

impl fmt::Display for CacheTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheTier::Memory => write!(f, "Memory"),
            CacheTier::Temporary => write!(f, "Temporary"),
            CacheTier::Persistent => write!(f, "Persistent"),
        }
    }
}

/// Contract shared by every cache tier.
///
/// Absence is a normal outcome (`Ok(None)` / `Ok(false)`), never an error.
/// An `Err` means the tier itself could not answer; the memory tier never
/// returns one. Puts are upserts that replace the whole entry, removals of
/// absent entries are no-ops, and removing a version never removes its
/// chapters.
#[async_trait]
pub trait BibleVersionCache: Send + Sync {
    /// Which tier this cache serves as.
    fn tier(&self) -> CacheTier;

    /// Snapshot of resident version ids. No ordering.
    async fn stored_version_ids(&self) -> Result<HashSet<VersionId>>;

    async fn version(&self, id: VersionId) -> Result<Option<BibleVersion>>;

    async fn chapter_content(&self, reference: &BibleReference) -> Result<Option<String>>;

    async fn put_version(&self, version: &BibleVersion) -> Result<()>;

    async fn put_chapter_content(&self, content: &str, reference: &BibleReference) -> Result<()>;

    async fn remove_version(&self, id: VersionId) -> Result<()>;

    /// Remove every chapter entry belonging to `id`.
    async fn remove_version_chapters(&self, id: VersionId) -> Result<()>;

    /// Remove every version entry whose id is not in `permitted`.
    ///
    /// The default walks [`stored_version_ids`](Self::stored_version_ids)
    /// and removes entries one at a time.
    async fn remove_unpermitted_versions(&self, permitted: &HashSet<VersionId>) -> Result<()> {
        for id in self.stored_version_ids().await? {
            if !permitted.contains(&id) {
                self.remove_version(id).await?;
            }
        }
        Ok(())
    }

    /// Cheap probe, no deserialization.
    async fn is_version_present(&self, id: VersionId) -> Result<bool>;

    /// True if at least one chapter of `id` is cached.
    async fn are_chapters_present(&self, id: VersionId) -> Result<bool>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_order() {
        assert!(CacheTier::Memory < CacheTier::Temporary);
        assert!(CacheTier::Temporary < CacheTier::Persistent);
        for (i, tier) in CacheTier::ALL.iter().enumerate() {
            assert_eq!(tier.index(), i);
        }
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(format!("{}", CacheTier::Memory), "Memory");
        assert_eq!(format!("{}", CacheTier::Temporary), "Temporary");
        assert_eq!(format!("{}", CacheTier::Persistent), "Persistent");
    }
}
