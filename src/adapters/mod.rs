//! Infrastructure Adapters
//!
//! Concrete implementations of the domain ports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Layer                              │
//! │  ┌────────────────────────────────────────────────────────────┐ │
//! │  │                    Ports (Traits)                           │ │
//! │  │            BibleClient          │          Storage          │ │
//! │  └────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters (This Module)                       │
//! │  ┌────────────────────────────────────────────────────────────┐ │
//! │  │ HttpBibleClient │ InMemoryBibleClient │ InMemoryStorage    │ │
//! │  └────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use scripture_cache::adapters::HttpBibleClient;
//! use scripture_cache::config::ClientConfig;
//! use scripture_cache::domain::BibleClient;
//!
//! let client = HttpBibleClient::new(ClientConfig::default())?;
//! let version = client.fetch_version(111).await?;
//! ```

mod http_client;
mod memory_client;
mod memory_storage;

pub use http_client::{HttpBibleClient, APP_KEY_HEADER};
pub use memory_client::{InMemoryBibleClient, NetworkFailure};
pub use memory_storage::InMemoryStorage;
