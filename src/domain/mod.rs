//! Domain Layer
//!
//! Value objects and the ports the caching core depends on.
//!
//! - **Models** (`models.rs`) - Bible versions, references, chapter keys
//! - **Ports** (`ports.rs`) - Network and key/value storage abstractions
//! - **Abbreviation** (`abbreviation.rs`) - Version abbreviation helpers
//!
//! # Usage
//!
//! ```ignore
//! use scripture_cache::domain::{BibleClient, BibleReference};
//!
//! async fn first_chapter<C: BibleClient>(client: &C) -> Result<String> {
//!     let reference = BibleReference::chapter(111, "GEN", 1)?;
//!     client.fetch_chapter(&reference).await
//! }
//! ```

pub mod abbreviation;
pub mod models;
pub mod ports;

pub use abbreviation::split_abbreviation;
pub use models::{BibleBook, BibleReference, BibleVersion, ChapterKey, VersionId};
pub use ports::{BibleClient, Storage};
