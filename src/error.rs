//! Error types for the scripture cache

use thiserror::Error;

use crate::cache::CacheTier;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving Bible content
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Network Errors (passed through the repository verbatim)
    // =========================================================================
    /// Credentials or entitlements rejected by the content API
    #[error("Not permitted to access the requested content")]
    NotPermitted,

    /// Content API reachable but returned a non-success result
    #[error("Cannot download content: {reason}")]
    CannotDownload { reason: String },

    /// Content API payload could not be decoded
    #[error("Invalid response from content API: {0}")]
    InvalidResponse(String),

    // =========================================================================
    // Tier Errors
    // =========================================================================
    /// A disk tier could not service the request
    #[error("{tier} tier unavailable: {reason}")]
    TierUnavailable { tier: CacheTier, reason: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // =========================================================================
    // Input / Setup Errors
    // =========================================================================
    /// Malformed Bible reference
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a `TierUnavailable` from any displayable cause.
    pub fn tier(tier: CacheTier, reason: impl std::fmt::Display) -> Self {
        Error::TierUnavailable {
            tier,
            reason: reason.to_string(),
        }
    }

    /// True for the network taxonomy surfaced to callers.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Error::NotPermitted | Error::CannotDownload { .. } | Error::InvalidResponse(_)
        )
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::CannotDownload { .. } | Error::TierUnavailable { .. }
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
