//! Domain Ports (Port/Adapter Pattern)
//!
//! Abstractions the caching core depends on. Adapters in
//! [`crate::adapters`] provide concrete implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Domain Layer                            │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                    Ports (Traits)                    │    │
//! │  │          BibleClient        │        Storage         │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Infrastructure Layer                       │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                  Adapters (Impls)                    │    │
//! │  │       HttpBibleClient       │    InMemoryStorage     │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use super::models::{BibleReference, BibleVersion, VersionId};
use crate::error::Result;

// =============================================================================
// Network Port
// =============================================================================

/// Port for the authoritative content source.
///
/// Implementations fail only with [`Error::NotPermitted`],
/// [`Error::CannotDownload`] or [`Error::InvalidResponse`]. Retrying is the
/// implementation's business; callers never retry.
///
/// [`Error::NotPermitted`]: crate::error::Error::NotPermitted
/// [`Error::CannotDownload`]: crate::error::Error::CannotDownload
/// [`Error::InvalidResponse`]: crate::error::Error::InvalidResponse
#[async_trait]
pub trait BibleClient: Send + Sync {
    /// Fetch version metadata.
    async fn fetch_version(&self, id: VersionId) -> Result<BibleVersion>;

    /// Fetch the text of the chapter `reference` points into.
    async fn fetch_chapter(&self, reference: &BibleReference) -> Result<String>;
}

// =============================================================================
// Storage Port
// =============================================================================

/// Typed key/value persistence used for settings and session state.
///
/// Reads return `None` when the key is absent or holds a value of another
/// type.
pub trait Storage: Send + Sync {
    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&self, key: &str, value: &str);

    fn get_int(&self, key: &str) -> Option<i32>;
    fn set_int(&self, key: &str, value: i32);

    fn get_float(&self, key: &str) -> Option<f32>;
    fn set_float(&self, key: &str, value: f32);

    fn get_long(&self, key: &str) -> Option<i64>;
    fn set_long(&self, key: &str, value: i64);

    /// Remove a key of any type. Absent keys are a no-op.
    fn remove(&self, key: &str);
}
