mod repo;

pub use repo::Repository;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Book record from the Calibre metadata store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Calibre primary key.
    pub id: i64,
    /// Book title.
    pub title: String,
    /// Last modification time from the store.
    pub last_modified: DateTime<Utc>,
    /// Authors in link-table order; the first one is the primary author.
    /// May be empty for books with no author record.
    pub authors: Vec<Author>,
    /// Stored files, at most one per format.
    pub files: Vec<FileRef>,
}

impl Book {
    /// Primary author, if the book has any.
    pub fn primary_author(&self) -> Option<&Author> {
        self.authors.first()
    }
}

/// Author record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    /// Calibre primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// Reference to a stored book file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRef {
    /// Format code, canonical upper-case (e.g. "EPUB").
    pub format: String,
    /// Filename stem on disk, without extension. Never shown to clients.
    pub name: String,
}

/// One page of a paginated listing, with look-ahead flags.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Page content, at most `page_size` items.
    pub items: Vec<T>,
    /// Whether a previous page exists (offset > 0).
    pub has_previous: bool,
    /// Whether strictly more rows exist beyond this page.
    pub has_next: bool,
}

/// Recognized book listing orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Lexicographic by title.
    ByTitle,
    /// By last modification time.
    ByNewest,
}

impl FromStr for SortKey {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s {
            "by_title" => Ok(SortKey::ByTitle),
            "by_newest" => Ok(SortKey::ByNewest),
            other => Err(crate::error::AppError::InvalidArgument(format!(
                "Invalid sort key: {}",
                other
            ))),
        }
    }
}

/// Parse a Calibre `last_modified` value.
///
/// Calibre stores timestamps as text, usually `2024-03-01 10:11:12.123456+00:00`
/// but RFC 3339 and offset-less values occur in old libraries. Unparseable
/// values map to the Unix epoch rather than failing the whole listing.
pub fn parse_modified(raw: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return dt.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return naive.and_utc();
    }
    DateTime::UNIX_EPOCH
}
