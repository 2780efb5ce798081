//! Scripture Cache - Multi-Tier Bible Content Cache
//!
//! Caches Bible version metadata and chapter text across three tiers in
//! front of a network content service, so repeated reads are served locally
//! and content survives restarts and offline use.
//!
//! # Architecture
//!
//! ```text
//! Memory → Temporary (disk) → Persistent (disk) → Network
//! ```
//!
//! Reads stop at the first tier that answers and the value is copied into
//! every faster tier that missed. Invalidation is applied to all tiers.
//!
//! # Modules
//!
//! - [`adapters`] - HTTP and in-memory implementations of the domain ports
//! - [`cache`] - Tier contract, memory and disk tiers, metrics
//! - [`config`] - Configuration structs
//! - [`context`] - Explicitly constructed shared state
//! - [`domain`] - Versions, references and ports
//! - [`error`] - Error types
//! - [`repository`] - Read-through repository

pub mod adapters;
pub mod cache;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod repository;

// Re-export commonly used types
pub use cache::{BibleVersionCache, CacheTier, DiskCache, MemoryCache};
pub use context::ReaderContext;
pub use domain::{BibleReference, BibleVersion, VersionId};
pub use error::{Error, Result};
pub use repository::{BibleVersionRepository, ContentSource, Lookup};
