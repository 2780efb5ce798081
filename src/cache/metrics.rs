//! Cache Metrics Collection
//!
//! Per-tier lookup counters plus promotion and network statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::CacheTier;

/// Lock-free counters for a single tier
#[derive(Debug, Default)]
struct TierCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
    /// Entries written into this tier by promotion
    promotions: AtomicU64,
}

impl TierCounters {
    fn snapshot(&self) -> TierSnapshot {
        TierSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
        self.promotions.store(0, Ordering::Relaxed);
    }
}

/// Cache metrics collector
#[derive(Debug, Default)]
pub struct CacheMetrics {
    tiers: [TierCounters; 3],
    network_fetches: AtomicU64,
    network_failures: AtomicU64,
}

impl CacheMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    fn counters(&self, tier: CacheTier) -> &TierCounters {
        &self.tiers[tier.index()]
    }

    pub fn record_hit(&self, tier: CacheTier) {
        self.counters(tier).hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self, tier: CacheTier) {
        self.counters(tier).misses.fetch_add(1, Ordering::Relaxed);
    }

    /// A tier failed and was treated as a miss
    pub fn record_error(&self, tier: CacheTier) {
        self.counters(tier).errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_promotion(&self, into: CacheTier) {
        self.counters(into).promotions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_network_fetch(&self) {
        self.network_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_network_failure(&self) {
        self.network_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self, tier: CacheTier) -> u64 {
        self.counters(tier).hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self, tier: CacheTier) -> u64 {
        self.counters(tier).misses.load(Ordering::Relaxed)
    }

    pub fn network_fetches(&self) -> u64 {
        self.network_fetches.load(Ordering::Relaxed)
    }

    /// Share of lookups answered by any tier without going to the network
    pub fn overall_hit_ratio(&self) -> f64 {
        let hits: u64 = CacheTier::ALL.iter().map(|t| self.hits(*t)).sum();
        let total = hits + self.network_fetches();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            memory: self.counters(CacheTier::Memory).snapshot(),
            temporary: self.counters(CacheTier::Temporary).snapshot(),
            persistent: self.counters(CacheTier::Persistent).snapshot(),
            network_fetches: self.network_fetches(),
            network_failures: self.network_failures.load(Ordering::Relaxed),
            overall_hit_ratio: self.overall_hit_ratio(),
        }
    }

    /// Reset all metrics
    pub fn reset(&self) {
        for counters in &self.tiers {
            counters.reset();
        }
        self.network_fetches.store(0, Ordering::Relaxed);
        self.network_failures.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time counters for one tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
    pub promotions: u64,
}

/// Snapshot of all cache metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub memory: TierSnapshot,
    pub temporary: TierSnapshot,
    pub persistent: TierSnapshot,
    pub network_fetches: u64,
    pub network_failures: u64,
    pub overall_hit_ratio: f64,
}

impl MetricsSnapshot {
    pub fn tier(&self, tier: CacheTier) -> &TierSnapshot {
        match tier {
            CacheTier::Memory => &self.memory,
            CacheTier::Temporary => &self.temporary,
            CacheTier::Persistent => &self.persistent,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = CacheMetrics::new();
        for tier in CacheTier::ALL {
            assert_eq!(metrics.hits(tier), 0);
            assert_eq!(metrics.misses(tier), 0);
        }
        assert_eq!(metrics.overall_hit_ratio(), 0.0);
    }

    #[test]
    fn test_per_tier_tracking() {
        let metrics = CacheMetrics::new();
        metrics.record_miss(CacheTier::Memory);
        metrics.record_miss(CacheTier::Temporary);
        metrics.record_error(CacheTier::Temporary);
        metrics.record_hit(CacheTier::Persistent);
        metrics.record_promotion(CacheTier::Memory);
        metrics.record_promotion(CacheTier::Temporary);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.memory.misses, 1);
        assert_eq!(snapshot.memory.promotions, 1);
        assert_eq!(snapshot.temporary.errors, 1);
        assert_eq!(snapshot.tier(CacheTier::Persistent).hits, 1);
        assert_eq!(snapshot.persistent.promotions, 0);
    }

    #[test]
    fn test_overall_hit_ratio() {
        let metrics = CacheMetrics::new();
        metrics.record_hit(CacheTier::Memory);
        metrics.record_hit(CacheTier::Memory);
        metrics.record_hit(CacheTier::Temporary);
        metrics.record_network_fetch();

        assert_eq!(metrics.overall_hit_ratio(), 0.75);
    }

    #[test]
    fn test_snapshot_json() {
        let metrics = CacheMetrics::new();
        metrics.record_hit(CacheTier::Temporary);
        metrics.record_promotion(CacheTier::Memory);
        metrics.record_network_fetch();

        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["temporary"]["hits"], 1);
        assert_eq!(json["memory"]["promotions"], 1);
        assert_eq!(json["network_fetches"], 1);
        assert_eq!(json["overall_hit_ratio"], 0.5);
    }

    #[test]
    fn test_reset() {
        let metrics = CacheMetrics::new();
        metrics.record_hit(CacheTier::Memory);
        metrics.record_network_fetch();
        metrics.record_network_failure();

        metrics.reset();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.memory, TierSnapshot::default());
        assert_eq!(snapshot.network_fetches, 0);
        assert_eq!(snapshot.network_failures, 0);
    }
}
