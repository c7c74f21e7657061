use crate::config::SortDirection;
use crate::db::{Author, Book, FileRef, Page, SortKey, parse_modified};
use crate::error::{AppError, Result};
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params, params_from_iter};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only repository over a Calibre metadata store.
///
/// Holds a single pooled read-only connection; the store is never written
/// to, so concurrent readers need no coordination beyond the connection
/// mutex. All listing operations use look-ahead pagination: `page_size + 1`
/// rows are fetched and the extra row only sets `has_next`.
#[derive(Clone)]
pub struct Repository {
    conn: Arc<Mutex<Connection>>,
    library_root: PathBuf,
    newest_order: SortDirection,
}

/// Raw book row before association loading.
struct BookRow {
    id: i64,
    title: String,
    last_modified: String,
}

impl Repository {
    /// Open the metadata store of the Calibre library at `library_root`.
    ///
    /// Fails with a configuration error when `metadata.db` is missing;
    /// a broken store is fatal at startup, not a per-request condition.
    pub fn open(library_root: &Path, newest_order: SortDirection) -> Result<Self> {
        let db_path = library_root.join("metadata.db");
        if !db_path.exists() {
            return Err(AppError::Config(format!(
                "Calibre metadata.db not found in {}",
                library_root.display()
            )));
        }

        let conn = Connection::open_with_flags(
            &db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            library_root: library_root.to_path_buf(),
            newest_order,
        })
    }

    /// Open an in-memory store with the Calibre schema subset (for testing).
    pub fn open_memory(library_root: &Path, newest_order: SortDirection) -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        conn.execute_batch(
            r#"
            CREATE TABLE books (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                sort TEXT NOT NULL,
                path TEXT NOT NULL DEFAULT '',
                last_modified TEXT NOT NULL
            );
            CREATE TABLE authors (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                sort TEXT NOT NULL
            );
            CREATE TABLE books_authors_link (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                book INTEGER NOT NULL,
                author INTEGER NOT NULL
            );
            CREATE TABLE data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                book INTEGER NOT NULL,
                format TEXT NOT NULL,
                name TEXT NOT NULL
            );
            "#,
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            library_root: library_root.to_path_buf(),
            newest_order,
        })
    }

    /// Direct connection access for test fixtures.
    #[cfg(test)]
    pub(crate) fn connection(&self) -> parking_lot::MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    /// List books ordered by the given sort key.
    pub fn list_books(&self, sort: SortKey, page: u32, page_size: u32) -> Result<Page<Book>> {
        let order_by = match sort {
            SortKey::ByTitle => "title ASC".to_string(),
            SortKey::ByNewest => format!("last_modified {}", self.newest_order.as_sql()),
        };
        let sql = format!(
            "SELECT id, title, last_modified FROM books ORDER BY {} LIMIT ? OFFSET ?",
            order_by
        );

        let offset = offset_for(page, page_size);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![page_size + 1, offset as i64], book_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        self.book_page(&conn, rows, offset, page_size as usize)
    }

    /// List authors ordered by their sort key.
    pub fn list_authors(&self, page: u32, page_size: u32) -> Result<Page<Author>> {
        let offset = offset_for(page, page_size);
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT id, name FROM authors ORDER BY sort LIMIT ? OFFSET ?")?;
        let mut authors = stmt
            .query_map(params![page_size + 1, offset as i64], |row| {
                Ok(Author {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let has_next = authors.len() > page_size as usize;
        authors.truncate(page_size as usize);

        Ok(Page {
            items: authors,
            has_previous: offset > 0,
            has_next,
        })
    }

    /// List the books of one author, ordered by the book sort key.
    ///
    /// An unknown author yields an empty page here; callers that need a 404
    /// resolve the author name first.
    pub fn list_books_by_author(
        &self,
        author_id: i64,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Book>> {
        let offset = offset_for(page, page_size);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT b.id, b.title, b.last_modified
             FROM books b
             JOIN books_authors_link bal ON b.id = bal.book
             WHERE bal.author = ?
             ORDER BY b.sort
             LIMIT ? OFFSET ?",
        )?;
        let rows = stmt
            .query_map(params![author_id, page_size + 1, offset as i64], book_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        self.book_page(&conn, rows, offset, page_size as usize)
    }

    /// Case-insensitive substring search on book titles.
    ///
    /// An empty term is a substring of every title and returns all books.
    pub fn search_books(&self, term: &str, page: u32, page_size: u32) -> Result<Page<Book>> {
        let pattern = format!("%{}%", term);
        let offset = offset_for(page, page_size);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, title, last_modified
             FROM books
             WHERE LOWER(title) LIKE LOWER(?)
             ORDER BY sort
             LIMIT ? OFFSET ?",
        )?;
        let rows = stmt
            .query_map(params![pattern, page_size + 1, offset as i64], book_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        self.book_page(&conn, rows, offset, page_size as usize)
    }

    /// Look up an author's display name.
    pub fn author_name(&self, author_id: i64) -> Result<String> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT name FROM authors WHERE id = ?",
            params![author_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Author not found: {}", author_id)))
    }

    /// Look up a book's title.
    pub fn book_title(&self, book_id: i64) -> Result<String> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT title FROM books WHERE id = ?",
            params![book_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Book not found: {}", book_id)))
    }

    /// Resolve the on-disk path of a book file in the given format.
    ///
    /// A missing book and a missing format are distinct failures: the first
    /// means the id is unknown, the second that the book exists but has no
    /// file stored in that format.
    pub fn book_file_path(&self, book_id: i64, format: &str) -> Result<PathBuf> {
        let canonical = format.trim().to_uppercase();
        let conn = self.conn.lock();

        let folder: String = conn
            .query_row(
                "SELECT path FROM books WHERE id = ?",
                params![book_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| AppError::NotFound(format!("Book not found: {}", book_id)))?;

        let stem: String = conn
            .query_row(
                "SELECT name FROM data WHERE book = ? AND format = ?",
                params![book_id, canonical],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| {
                AppError::NotFound(format!("No {} file for book {}", canonical, book_id))
            })?;

        let filename = format!("{}.{}", stem, canonical.to_lowercase());
        Ok(self.library_root.join(folder).join(filename))
    }

    /// Resolve the on-disk path of a book's cover image.
    ///
    /// Cover existence is only checked here, at download time; feeds link
    /// covers unconditionally.
    pub fn cover_path(&self, book_id: i64) -> Result<PathBuf> {
        let conn = self.conn.lock();
        let folder: String = conn
            .query_row(
                "SELECT path FROM books WHERE id = ?",
                params![book_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| AppError::NotFound(format!("Book not found: {}", book_id)))?;
        drop(conn);

        let cover = self.library_root.join(folder).join("cover.jpg");
        if !cover.exists() {
            return Err(AppError::NotFound(format!(
                "Cover not found for book {}",
                book_id
            )));
        }
        Ok(cover)
    }

    /// Apply look-ahead truncation and batch-load associations.
    fn book_page(
        &self,
        conn: &Connection,
        mut rows: Vec<BookRow>,
        offset: usize,
        page_size: usize,
    ) -> Result<Page<Book>> {
        let has_next = rows.len() > page_size;
        rows.truncate(page_size);

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut authors_by_book = load_authors(conn, &ids)?;
        let mut files_by_book = load_files(conn, &ids)?;

        let items = rows
            .into_iter()
            .map(|row| Book {
                id: row.id,
                title: row.title,
                last_modified: parse_modified(&row.last_modified),
                authors: authors_by_book.remove(&row.id).unwrap_or_default(),
                files: files_by_book.remove(&row.id).unwrap_or_default(),
            })
            .collect();

        Ok(Page {
            items,
            has_previous: offset > 0,
            has_next,
        })
    }
}

/// Compute the row offset for a 1-based page number.
fn offset_for(page: u32, page_size: u32) -> usize {
    page.saturating_sub(1) as usize * page_size as usize
}

/// Map a book listing row.
fn book_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BookRow> {
    Ok(BookRow {
        id: row.get(0)?,
        title: row.get(1)?,
        last_modified: row.get(2)?,
    })
}

/// Load authors for all listed books with a single query.
///
/// One `IN (...)` query per page keeps association loading O(1) in the
/// number of books instead of one query per row. Link-table order is
/// preserved so the first author stays the primary one.
fn load_authors(conn: &Connection, book_ids: &[i64]) -> Result<HashMap<i64, Vec<Author>>> {
    let mut by_book: HashMap<i64, Vec<Author>> = HashMap::new();
    if book_ids.is_empty() {
        return Ok(by_book);
    }

    let sql = format!(
        "SELECT bal.book, a.id, a.name
         FROM books_authors_link bal
         JOIN authors a ON bal.author = a.id
         WHERE bal.book IN ({})
         ORDER BY bal.id",
        placeholders(book_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(book_ids.iter()), |row| {
        Ok((
            row.get::<_, i64>(0)?,
            Author {
                id: row.get(1)?,
                name: row.get(2)?,
            },
        ))
    })?;

    for row in rows {
        let (book_id, author) = row?;
        by_book.entry(book_id).or_default().push(author);
    }
    Ok(by_book)
}

/// Load file references for all listed books with a single query.
fn load_files(conn: &Connection, book_ids: &[i64]) -> Result<HashMap<i64, Vec<FileRef>>> {
    let mut by_book: HashMap<i64, Vec<FileRef>> = HashMap::new();
    if book_ids.is_empty() {
        return Ok(by_book);
    }

    let sql = format!(
        "SELECT book, format, name FROM data WHERE book IN ({}) ORDER BY format",
        placeholders(book_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(book_ids.iter()), |row| {
        Ok((
            row.get::<_, i64>(0)?,
            FileRef {
                format: row.get(1)?,
                name: row.get(2)?,
            },
        ))
    })?;

    for row in rows {
        let (book_id, file) = row?;
        by_book.entry(book_id).or_default().push(file);
    }
    Ok(by_book)
}

/// Comma-separated `?` placeholders for an `IN` clause.
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}
