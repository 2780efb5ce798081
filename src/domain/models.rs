//! Domain Value Objects
//!
//! Bible versions, scripture references and the composite key that
//! addresses cached chapter text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Server-assigned Bible version identifier.
pub type VersionId = u32;

// =============================================================================
// Bible Version
// =============================================================================

/// A book of a Bible version together with its chapter labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BibleBook {
    /// Canonical 3-letter USFM code (e.g. `GEN`, `JHN`)
    pub usfm: String,
    /// Localized book title
    pub title: String,
    /// Chapter labels in reading order (usually `"1"`, `"2"`, ...)
    #[serde(default)]
    pub chapters: Vec<String>,
}

/// A Bible translation.
///
/// Immutable once fetched. `id` is the only identity across cache tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BibleVersion {
    pub id: VersionId,
    pub abbreviation: String,
    pub title: String,
    /// BCP-47 language tag
    pub language_tag: String,
    #[serde(default)]
    pub copyright: String,
    #[serde(default)]
    pub books: Vec<BibleBook>,
}

impl BibleVersion {
    /// Look up a book by USFM code (case-insensitive).
    pub fn book(&self, usfm: &str) -> Option<&BibleBook> {
        self.books
            .iter()
            .find(|book| book.usfm.eq_ignore_ascii_case(usfm))
    }

    /// All chapter USFM keys of this version, in book order.
    pub fn chapter_usfms(&self) -> Vec<String> {
        self.books
            .iter()
            .flat_map(|book| {
                book.chapters
                    .iter()
                    .map(move |label| format!("{}.{}", book.usfm, label))
            })
            .collect()
    }

    /// Split the abbreviation into its letter and number parts.
    pub fn abbreviation_parts(&self) -> (String, String) {
        super::abbreviation::split_abbreviation(&self.abbreviation)
    }
}

// =============================================================================
// Bible Reference
// =============================================================================

/// Length of a canonical USFM book code (`GEN`, `1JN`, ...)
pub const USFM_BOOK_LEN: usize = 3;

/// A pointer into scripture content.
///
/// Fields are private so every instance, including deserialized ones, has
/// passed [`BibleReference::new`]: a 3-character upper-case alphanumeric
/// book code, chapter >= 1, and `verse_end >= verse_start` when present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawReference")]
pub struct BibleReference {
    version_id: VersionId,
    book_usfm: String,
    chapter: u32,
    verse_start: Option<u32>,
    verse_end: Option<u32>,
}

/// Unvalidated wire shape of [`BibleReference`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReference {
    version_id: VersionId,
    book_usfm: String,
    chapter: u32,
    #[serde(default)]
    verse_start: Option<u32>,
    #[serde(default)]
    verse_end: Option<u32>,
}

impl TryFrom<RawReference> for BibleReference {
    type Error = Error;

    fn try_from(raw: RawReference) -> Result<Self> {
        Self::new(
            raw.version_id,
            raw.book_usfm,
            raw.chapter,
            raw.verse_start,
            raw.verse_end,
        )
    }
}

impl BibleReference {
    /// Reference to a whole chapter.
    pub fn chapter(version_id: VersionId, book_usfm: impl Into<String>, chapter: u32) -> Result<Self> {
        Self::new(version_id, book_usfm, chapter, None, None)
    }

    /// Create a validated reference.
    pub fn new(
        version_id: VersionId,
        book_usfm: impl Into<String>,
        chapter: u32,
        verse_start: Option<u32>,
        verse_end: Option<u32>,
    ) -> Result<Self> {
        let book_usfm = book_usfm.into().trim().to_ascii_uppercase();

        if book_usfm.len() != USFM_BOOK_LEN || !book_usfm.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidReference(format!(
                "invalid book code '{}'",
                book_usfm
            )));
        }
        if chapter == 0 {
            return Err(Error::InvalidReference("chapter must be >= 1".into()));
        }
        if verse_start == Some(0) || verse_end == Some(0) {
            return Err(Error::InvalidReference("verses must be >= 1".into()));
        }
        match (verse_start, verse_end) {
            (None, Some(_)) => {
                return Err(Error::InvalidReference(
                    "verse end given without verse start".into(),
                ))
            }
            (Some(start), Some(end)) if end < start => {
                return Err(Error::InvalidReference(format!(
                    "verse range {}-{} is reversed",
                    start, end
                )))
            }
            _ => {}
        }

        Ok(Self {
            version_id,
            book_usfm,
            chapter,
            verse_start,
            verse_end,
        })
    }

    /// Parse `BOOK.CH`, `BOOK.CH.V` or `BOOK.CH.V-V`.
    pub fn parse(version_id: VersionId, usfm: &str) -> Result<Self> {
        let invalid = || Error::InvalidReference(format!("cannot parse '{}'", usfm));

        let mut parts = usfm.trim().split('.');
        let book = parts.next().filter(|b| !b.is_empty()).ok_or_else(invalid)?;
        let chapter = parts
            .next()
            .and_then(|c| c.parse::<u32>().ok())
            .ok_or_else(invalid)?;

        let (verse_start, verse_end) = match parts.next() {
            None => (None, None),
            Some(verses) => match verses.split_once('-') {
                Some((start, end)) => (
                    Some(start.parse::<u32>().map_err(|_| invalid())?),
                    Some(end.parse::<u32>().map_err(|_| invalid())?),
                ),
                None => (Some(verses.parse::<u32>().map_err(|_| invalid())?), None),
            },
        };

        if parts.next().is_some() {
            return Err(invalid());
        }

        Self::new(version_id, book, chapter, verse_start, verse_end)
    }

    pub fn version_id(&self) -> VersionId {
        self.version_id
    }

    /// Upper-case USFM book code
    pub fn book_usfm(&self) -> &str {
        &self.book_usfm
    }

    pub fn chapter_number(&self) -> u32 {
        self.chapter
    }

    pub fn verse_start(&self) -> Option<u32> {
        self.verse_start
    }

    pub fn verse_end(&self) -> Option<u32> {
        self.verse_end
    }

    /// `BOOK.CH`, the address of the chapter's cached text.
    pub fn chapter_usfm(&self) -> String {
        format!("{}.{}", self.book_usfm, self.chapter)
    }

    /// Composite cache key for this reference's chapter.
    pub fn chapter_key(&self) -> ChapterKey {
        ChapterKey::new(self.version_id, self.chapter_usfm())
    }
}

impl fmt::Display for BibleReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.chapter_usfm())?;
        match (self.verse_start, self.verse_end) {
            (Some(start), Some(end)) => write!(f, ".{}-{}", start, end)?,
            (Some(start), None) => write!(f, ".{}", start)?,
            _ => {}
        }
        write!(f, " (version {})", self.version_id)
    }
}

// =============================================================================
// Chapter Key
// =============================================================================

/// Composite key `(version_id, chapter_usfm)` addressing cached chapter text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChapterKey {
    pub version_id: VersionId,
    pub chapter_usfm: String,
}

impl ChapterKey {
    pub fn new(version_id: VersionId, chapter_usfm: impl Into<String>) -> Self {
        Self {
            version_id,
            chapter_usfm: chapter_usfm.into(),
        }
    }
}

impl fmt::Display for ChapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.version_id, self.chapter_usfm)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn sample_version() -> BibleVersion {
        BibleVersion {
            id: 111,
            abbreviation: "NIV2011".into(),
            title: "New International Version".into(),
            language_tag: "en".into(),
            copyright: "Biblica".into(),
            books: vec![
                BibleBook {
                    usfm: "GEN".into(),
                    title: "Genesis".into(),
                    chapters: vec!["1".into(), "2".into()],
                },
                BibleBook {
                    usfm: "JHN".into(),
                    title: "John".into(),
                    chapters: vec!["1".into()],
                },
            ],
        }
    }

    #[test]
    fn test_chapter_usfm_and_key() {
        let reference = BibleReference::new(1, "jhn", 3, Some(16), Some(18)).unwrap();
        assert_eq!(reference.book_usfm(), "JHN");
        assert_eq!(reference.chapter_usfm(), "JHN.3");
        assert_eq!(reference.chapter_key(), ChapterKey::new(1, "JHN.3"));
    }

    #[test]
    fn test_verse_range_does_not_change_chapter_key() {
        let whole = BibleReference::chapter(1, "JHN", 3).unwrap();
        let verse = BibleReference::new(1, "JHN", 3, Some(16), None).unwrap();
        assert_ne!(whole, verse);
        assert_eq!(whole.chapter_key(), verse.chapter_key());
    }

    #[test]
    fn test_reference_validation() {
        assert_matches!(
            BibleReference::chapter(1, "JHN", 0),
            Err(Error::InvalidReference(_))
        );
        assert_matches!(
            BibleReference::new(1, "JHN", 3, Some(0), None),
            Err(Error::InvalidReference(_))
        );
        assert_matches!(
            BibleReference::new(1, "JHN", 3, Some(18), Some(16)),
            Err(Error::InvalidReference(_))
        );
        assert_matches!(
            BibleReference::new(1, "JHN", 3, None, Some(16)),
            Err(Error::InvalidReference(_))
        );
        assert_matches!(
            BibleReference::chapter(1, "", 1),
            Err(Error::InvalidReference(_))
        );
        assert!(BibleReference::new(1, "JHN", 3, Some(16), Some(16)).is_ok());
    }

    #[test]
    fn test_book_code_is_three_alphanumerics() {
        assert!(BibleReference::chapter(1, "1jn", 1).is_ok());
        assert_matches!(
            BibleReference::chapter(1, "JOHN", 1),
            Err(Error::InvalidReference(_))
        );
        assert_matches!(
            BibleReference::chapter(1, "JN", 1),
            Err(Error::InvalidReference(_))
        );
        assert_matches!(
            BibleReference::chapter(1, "../", 1),
            Err(Error::InvalidReference(_))
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let json = serde_json::json!({
            "versionId": 1,
            "bookUsfm": "../../../escaped",
            "chapter": 0,
        });
        let err = serde_json::from_value::<BibleReference>(json).unwrap_err();
        assert!(err.to_string().contains("Invalid reference"));

        let json = serde_json::json!({
            "versionId": 1,
            "bookUsfm": "jhn",
            "chapter": 3,
            "verseStart": 16,
        });
        let reference: BibleReference = serde_json::from_value(json).unwrap();
        assert_eq!(reference, BibleReference::new(1, "JHN", 3, Some(16), None).unwrap());
    }

    #[test]
    fn test_serde_roundtrip_keeps_shape() {
        let reference = BibleReference::parse(7, "GEN.1.1-3").unwrap();
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json["bookUsfm"], "GEN");
        assert_eq!(serde_json::from_value::<BibleReference>(json).unwrap(), reference);
    }

    #[test]
    fn test_parse_reference() {
        let r = BibleReference::parse(12, "GEN.1").unwrap();
        assert_eq!((r.chapter_number(), r.verse_start(), r.verse_end()), (1, None, None));

        let r = BibleReference::parse(12, "jhn.3.16").unwrap();
        assert_eq!(r.book_usfm(), "JHN");
        assert_eq!((r.chapter_number(), r.verse_start(), r.verse_end()), (3, Some(16), None));

        let r = BibleReference::parse(12, "JHN.3.16-18").unwrap();
        assert_eq!(r.version_id(), 12);
        assert_eq!((r.verse_start(), r.verse_end()), (Some(16), Some(18)));

        assert!(BibleReference::parse(12, "JHN").is_err());
        assert!(BibleReference::parse(12, "JHN.x").is_err());
        assert!(BibleReference::parse(12, "JHN.3.16.1").is_err());
    }

    #[test]
    fn test_reference_display() {
        let r = BibleReference::parse(12, "JHN.3.16-18").unwrap();
        assert_eq!(r.to_string(), "JHN.3.16-18 (version 12)");
    }

    #[test]
    fn test_version_books() {
        let version = sample_version();
        assert_eq!(version.book("jhn").map(|b| b.title.as_str()), Some("John"));
        assert!(version.book("REV").is_none());
        assert_eq!(version.chapter_usfms(), vec!["GEN.1", "GEN.2", "JHN.1"]);
        assert_eq!(
            version.abbreviation_parts(),
            ("NIV".to_string(), "2011".to_string())
        );
    }

    #[test]
    fn test_version_json_shape() {
        let json = serde_json::json!({
            "id": 1,
            "abbreviation": "KJV",
            "title": "King James Version",
            "languageTag": "en",
        });
        let version: BibleVersion = serde_json::from_value(json).unwrap();
        assert_eq!(version.language_tag, "en");
        assert!(version.books.is_empty());
        assert!(version.copyright.is_empty());
    }
}
