//! Configuration
//!
//! Plain structs with defaults. The binary fills them from CLI flags and
//! environment variables; library hosts build them directly.

use std::path::PathBuf;
use std::time::Duration;

/// Default content API endpoint
pub const DEFAULT_API_URL: &str = "https://api.scripture.example.com";

// =============================================================================
// Cache
// =============================================================================

/// Where the disk tiers live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Root of the Temporary tier; the OS may clear it
    pub temporary_dir: PathBuf,

    /// Root of the Persistent tier
    pub persistent_dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            temporary_dir: std::env::temp_dir().join("scripture-cache"),
            persistent_dir: PathBuf::from(".scripture-cache").join("persistent"),
        }
    }
}

// =============================================================================
// Network
// =============================================================================

/// Configuration for the content API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Content API base URL
    pub base_url: String,

    /// Application key sent with every request
    pub app_key: Option<String>,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            app_key: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

// =============================================================================
// Context
// =============================================================================

/// Everything needed to build a [`ReaderContext`](crate::context::ReaderContext)
#[derive(Debug, Clone, Default)]
pub struct ContextConfig {
    pub cache: CacheConfig,
    pub client: ClientConfig,
}
