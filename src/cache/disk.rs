//! Disk Tier - File-Backed Cache
//!
//! Serves as either the Temporary or the Persistent tier; the two differ only
//! in where their root directory lives.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   versions/<id>.json                 serde_json encoded BibleVersion
//!   chapters/<id>/<BOOK.CH>.txt        chapter text
//! ```
//!
//! # Design
//!
//! - One `tokio::sync::Mutex` per logical map, so version and chapter
//!   operations never wait on each other
//! - Writes go to a uniquely named sibling `.tmp` file and are renamed into
//!   place
//! - Missing files are misses; the Temporary root may be purged by the OS
//!   at any time

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::{BibleVersionCache, CacheTier};
use crate::domain::{BibleReference, BibleVersion, VersionId};
use crate::error::{Error, Result};

const VERSIONS_DIR: &str = "versions";
const CHAPTERS_DIR: &str = "chapters";
const VERSION_EXT: &str = "json";
const CHAPTER_EXT: &str = "txt";
const TEMP_EXT: &str = "tmp";

/// File-backed cache tier.
#[derive(Debug)]
pub struct DiskCache {
    tier: CacheTier,
    root: PathBuf,
    versions_lock: Mutex<()>,
    chapters_lock: Mutex<()>,
}

impl DiskCache {
    /// Create a disk tier rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for the memory tier or when `root` exists but
    /// is not a directory, and [`Error::TierUnavailable`] when it cannot be
    /// created.
    pub fn new(tier: CacheTier, root: impl AsRef<Path>) -> Result<Self> {
        if tier == CacheTier::Memory {
            return Err(Error::Config(
                "a disk cache cannot serve as the memory tier".into(),
            ));
        }

        let root = root.as_ref().to_path_buf();
        if root.exists() {
            if !root.is_dir() {
                return Err(Error::Config(format!(
                    "{} cache root {} is not a directory",
                    tier,
                    root.display()
                )));
            }
        } else {
            // Only happens once at startup, not worth an async constructor.
            std::fs::create_dir_all(&root).map_err(|e| Error::tier(tier, e))?;
        }

        Ok(Self {
            tier,
            root,
            versions_lock: Mutex::new(()),
            chapters_lock: Mutex::new(()),
        })
    }

    /// Temporary tier rooted at `root`
    pub fn temporary(root: impl AsRef<Path>) -> Result<Self> {
        Self::new(CacheTier::Temporary, root)
    }

    /// Persistent tier rooted at `root`
    pub fn persistent(root: impl AsRef<Path>) -> Result<Self> {
        Self::new(CacheTier::Persistent, root)
    }

    /// Root directory of this tier
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove every cached version and chapter.
    pub async fn clear(&self) -> Result<()> {
        let _versions = self.versions_lock.lock().await;
        let _chapters = self.chapters_lock.lock().await;
        self.remove_dir(&self.root.join(VERSIONS_DIR)).await?;
        self.remove_dir(&self.root.join(CHAPTERS_DIR)).await
    }

    fn version_path(&self, id: VersionId) -> PathBuf {
        self.root
            .join(VERSIONS_DIR)
            .join(format!("{}.{}", id, VERSION_EXT))
    }

    fn chapters_dir(&self, id: VersionId) -> PathBuf {
        self.root.join(CHAPTERS_DIR).join(id.to_string())
    }

    fn chapter_path(&self, reference: &BibleReference) -> Result<PathBuf> {
        self.chapter_file(reference.version_id(), &reference.chapter_usfm())
    }

    /// Path of a chapter entry. `chapter_usfm` becomes a file name, so only
    /// `[A-Z0-9.]` is accepted and the path always stays under the root.
    fn chapter_file(&self, id: VersionId, chapter_usfm: &str) -> Result<PathBuf> {
        let valid = !chapter_usfm.is_empty()
            && !chapter_usfm.starts_with('.')
            && chapter_usfm
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.');
        if !valid {
            return Err(Error::tier(
                self.tier,
                format!("refusing chapter key '{}'", chapter_usfm),
            ));
        }
        Ok(self
            .chapters_dir(id)
            .join(format!("{}.{}", chapter_usfm, CHAPTER_EXT)))
    }

    fn map_io_error(&self, e: std::io::Error, path: &Path) -> Error {
        Error::tier(self.tier, format!("{}: {}", path.display(), e))
    }

    async fn read_optional(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.map_io_error(e, path)),
        }
    }

    async fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.map_io_error(e, parent))?;
        }
        let tmp = temp_sibling(path);
        fs::write(&tmp, data)
            .await
            .map_err(|e| self.map_io_error(e, &tmp))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| self.map_io_error(e, path))
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.map_io_error(e, path)),
        }
    }

    async fn remove_dir(&self, path: &Path) -> Result<()> {
        match fs::remove_dir_all(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.map_io_error(e, path)),
        }
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path)
            .await
            .map_err(|e| self.map_io_error(e, path))
    }
}

/// Unique scratch name next to `path`. Several `DiskCache` instances, in this
/// process or another, may share a root.
fn temp_sibling(path: &Path) -> PathBuf {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(
        ".{}.{}.{}.{}",
        name,
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed),
        TEMP_EXT
    ))
}

#[async_trait]
impl BibleVersionCache for DiskCache {
    fn tier(&self) -> CacheTier {
        self.tier
    }

    async fn stored_version_ids(&self) -> Result<HashSet<VersionId>> {
        let _guard = self.versions_lock.lock().await;
        let dir = self.root.join(VERSIONS_DIR);

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => return Err(self.map_io_error(e, &dir)),
        };

        let mut ids = HashSet::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| self.map_io_error(e, &dir))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(VERSION_EXT) {
                continue;
            }
            // Stray files that are not `<id>.json` are ignored
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<VersionId>().ok())
            {
                ids.insert(id);
            }
        }
        Ok(ids)
    }

    async fn version(&self, id: VersionId) -> Result<Option<BibleVersion>> {
        let _guard = self.versions_lock.lock().await;
        let path = self.version_path(id);
        match self.read_optional(&path).await? {
            Some(data) => {
                let version = serde_json::from_slice(&data)
                    .map_err(|e| Error::tier(self.tier, format!("corrupt entry {}: {}", path.display(), e)))?;
                Ok(Some(version))
            }
            None => Ok(None),
        }
    }

    async fn chapter_content(&self, reference: &BibleReference) -> Result<Option<String>> {
        let _guard = self.chapters_lock.lock().await;
        let path = self.chapter_path(reference)?;
        match self.read_optional(&path).await? {
            Some(data) => String::from_utf8(data)
                .map(Some)
                .map_err(|e| Error::tier(self.tier, format!("corrupt entry {}: {}", path.display(), e))),
            None => Ok(None),
        }
    }

    async fn put_version(&self, version: &BibleVersion) -> Result<()> {
        let data = serde_json::to_vec(version)?;
        let _guard = self.versions_lock.lock().await;
        self.write_atomic(&self.version_path(version.id), &data).await?;
        debug!(tier = %self.tier, version_id = version.id, "Stored version");
        Ok(())
    }

    async fn put_chapter_content(&self, content: &str, reference: &BibleReference) -> Result<()> {
        let _guard = self.chapters_lock.lock().await;
        let path = self.chapter_path(reference)?;
        self.write_atomic(&path, content.as_bytes()).await?;
        debug!(tier = %self.tier, version_id = reference.version_id(), chapter = %reference.chapter_usfm(), "Stored chapter");
        Ok(())
    }

    async fn remove_version(&self, id: VersionId) -> Result<()> {
        let _guard = self.versions_lock.lock().await;
        self.remove_file(&self.version_path(id)).await
    }

    async fn remove_version_chapters(&self, id: VersionId) -> Result<()> {
        let _guard = self.chapters_lock.lock().await;
        self.remove_dir(&self.chapters_dir(id)).await
    }

    async fn is_version_present(&self, id: VersionId) -> Result<bool> {
        let _guard = self.versions_lock.lock().await;
        self.exists(&self.version_path(id)).await
    }

    async fn are_chapters_present(&self, id: VersionId) -> Result<bool> {
        let _guard = self.chapters_lock.lock().await;
        let dir = self.chapters_dir(id);

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(self.map_io_error(e, &dir)),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| self.map_io_error(e, &dir))?
        {
            if entry.path().extension().and_then(|ext| ext.to_str()) == Some(CHAPTER_EXT) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

// =============================================================================
// Tests
// =============================================================================
