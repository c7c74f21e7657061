use crate::config::{BookFormat, Config, SortDirection};
use crate::db::{Repository, SortKey, parse_modified};
use crate::error::AppError;
use crate::opds::{Catalog, book_entry_id, generate_opensearch};
use crate::server::title_to_filename;
use rusqlite::params;
use std::path::Path;
use std::str::FromStr;

fn test_repo() -> Repository {
    test_repo_with(SortDirection::Ascending)
}

fn test_repo_with(newest_order: SortDirection) -> Repository {
    Repository::open_memory(Path::new("/library"), newest_order).unwrap()
}

fn insert_book(repo: &Repository, id: i64, title: &str, modified: &str) {
    let conn = repo.connection();
    conn.execute(
        "INSERT INTO books (id, title, sort, path, last_modified) VALUES (?, ?, ?, ?, ?)",
        params![id, title, title, format!("Folder {}", id), modified],
    )
    .unwrap();
}

fn insert_author(repo: &Repository, id: i64, name: &str, sort: &str) {
    let conn = repo.connection();
    conn.execute(
        "INSERT INTO authors (id, name, sort) VALUES (?, ?, ?)",
        params![id, name, sort],
    )
    .unwrap();
}

fn link_author(repo: &Repository, book_id: i64, author_id: i64) {
    let conn = repo.connection();
    conn.execute(
        "INSERT INTO books_authors_link (book, author) VALUES (?, ?)",
        params![book_id, author_id],
    )
    .unwrap();
}

fn insert_file(repo: &Repository, book_id: i64, format: &str, name: &str) {
    let conn = repo.connection();
    conn.execute(
        "INSERT INTO data (book, format, name) VALUES (?, ?, ?)",
        params![book_id, format, name],
    )
    .unwrap();
}

fn test_catalog(repo: &Repository, page_size: u32) -> Catalog {
    let mut config = Config::default();
    config.catalog.page_size = page_size;
    Catalog::new(repo.clone(), &config)
}

// ============================================================================
// REPOSITORY
// ============================================================================

#[test]
fn repo_pagination_look_ahead() {
    let repo = test_repo();
    for i in 1..=7 {
        insert_book(&repo, i, &format!("Book {:02}", i), "2024-01-01 00:00:00+00:00");
    }

    let page1 = repo.list_books(SortKey::ByTitle, 1, 3).unwrap();
    assert_eq!(page1.items.len(), 3);
    assert!(!page1.has_previous);
    assert!(page1.has_next);

    let page2 = repo.list_books(SortKey::ByTitle, 2, 3).unwrap();
    assert_eq!(page2.items.len(), 3);
    assert!(page2.has_previous);
    assert!(page2.has_next);

    let page3 = repo.list_books(SortKey::ByTitle, 3, 3).unwrap();
    assert_eq!(page3.items.len(), 1);
    assert!(page3.has_previous);
    assert!(!page3.has_next);

    // Past the end: empty but still has_previous
    let page4 = repo.list_books(SortKey::ByTitle, 4, 3).unwrap();
    assert!(page4.items.is_empty());
    assert!(page4.has_previous);
    assert!(!page4.has_next);
}

#[test]
fn repo_exact_page_has_no_next() {
    let repo = test_repo();
    for i in 1..=3 {
        insert_book(&repo, i, &format!("Book {}", i), "2024-01-01 00:00:00+00:00");
    }

    let page = repo.list_books(SortKey::ByTitle, 1, 3).unwrap();
    assert_eq!(page.items.len(), 3);
    assert!(!page.has_next);
}

#[test]
fn repo_sort_by_title() {
    let repo = test_repo();
    insert_book(&repo, 1, "Zebra", "2024-01-01 00:00:00+00:00");
    insert_book(&repo, 2, "Alpha", "2024-01-02 00:00:00+00:00");
    insert_book(&repo, 3, "Mango", "2024-01-03 00:00:00+00:00");

    let page = repo.list_books(SortKey::ByTitle, 1, 10).unwrap();
    let titles: Vec<&str> = page.items.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "Mango", "Zebra"]);
}

#[test]
fn repo_sort_by_newest_ascending() {
    let repo = test_repo_with(SortDirection::Ascending);
    insert_book(&repo, 1, "Newest", "2024-03-01 00:00:00+00:00");
    insert_book(&repo, 2, "Oldest", "2024-01-01 00:00:00+00:00");
    insert_book(&repo, 3, "Middle", "2024-02-01 00:00:00+00:00");

    let page = repo.list_books(SortKey::ByNewest, 1, 10).unwrap();
    let titles: Vec<&str> = page.items.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Oldest", "Middle", "Newest"]);
}

#[test]
fn repo_sort_by_newest_descending() {
    let repo = test_repo_with(SortDirection::Descending);
    insert_book(&repo, 1, "Newest", "2024-03-01 00:00:00+00:00");
    insert_book(&repo, 2, "Oldest", "2024-01-01 00:00:00+00:00");
    insert_book(&repo, 3, "Middle", "2024-02-01 00:00:00+00:00");

    let page = repo.list_books(SortKey::ByNewest, 1, 10).unwrap();
    let titles: Vec<&str> = page.items.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
}

#[test]
fn sort_key_from_str() {
    assert_eq!(SortKey::from_str("by_title").unwrap(), SortKey::ByTitle);
    assert_eq!(SortKey::from_str("by_newest").unwrap(), SortKey::ByNewest);
    assert!(matches!(
        SortKey::from_str("by_rating"),
        Err(AppError::InvalidArgument(_))
    ));
}

#[test]
fn repo_search_case_insensitive() {
    let repo = test_repo();
    insert_book(&repo, 1, "Dune", "2024-01-01 00:00:00+00:00");
    insert_book(&repo, 2, "Dune Messiah", "2024-01-02 00:00:00+00:00");
    insert_book(&repo, 3, "Foundation", "2024-01-03 00:00:00+00:00");

    for term in ["Dune", "dune", "DUNE"] {
        let page = repo.search_books(term, 1, 10).unwrap();
        let ids: Vec<i64> = page.items.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2], "term {:?}", term);
    }
}

#[test]
fn repo_search_substring() {
    let repo = test_repo();
    insert_book(&repo, 1, "The Left Hand of Darkness", "2024-01-01 00:00:00+00:00");
    insert_book(&repo, 2, "Darkness Visible", "2024-01-02 00:00:00+00:00");
    insert_book(&repo, 3, "The Dispossessed", "2024-01-03 00:00:00+00:00");

    let page = repo.search_books("darkness", 1, 10).unwrap();
    assert_eq!(page.items.len(), 2);
}

#[test]
fn repo_search_empty_term_matches_all() {
    let repo = test_repo();
    for i in 1..=4 {
        insert_book(&repo, i, &format!("Book {}", i), "2024-01-01 00:00:00+00:00");
    }

    let page = repo.search_books("", 1, 10).unwrap();
    assert_eq!(page.items.len(), 4);
}

#[test]
fn repo_authors_ordered_by_sort_key() {
    let repo = test_repo();
    insert_author(&repo, 1, "Ursula K. Le Guin", "Le Guin, Ursula K.");
    insert_author(&repo, 2, "Isaac Asimov", "Asimov, Isaac");

    let page = repo.list_authors(1, 10).unwrap();
    let names: Vec<&str> = page.items.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Isaac Asimov", "Ursula K. Le Guin"]);
    assert!(!page.has_previous);
    assert!(!page.has_next);
}

#[test]
fn repo_books_by_author() {
    let repo = test_repo();
    insert_author(&repo, 1, "Frank Herbert", "Herbert, Frank");
    insert_author(&repo, 2, "Someone Else", "Else, Someone");
    insert_book(&repo, 10, "Dune", "2024-01-01 00:00:00+00:00");
    insert_book(&repo, 11, "Dune Messiah", "2024-01-02 00:00:00+00:00");
    insert_book(&repo, 12, "Unrelated", "2024-01-03 00:00:00+00:00");
    link_author(&repo, 10, 1);
    link_author(&repo, 11, 1);
    link_author(&repo, 12, 2);

    let page = repo.list_books_by_author(1, 1, 10).unwrap();
    let ids: Vec<i64> = page.items.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![10, 11]);
}

#[test]
fn repo_batch_loads_authors_and_files() {
    let repo = test_repo();
    insert_author(&repo, 1, "First Author", "First");
    insert_author(&repo, 2, "Second Author", "Second");
    insert_book(&repo, 10, "Collaboration", "2024-01-01 00:00:00+00:00");
    link_author(&repo, 10, 1);
    link_author(&repo, 10, 2);
    insert_file(&repo, 10, "EPUB", "Collaboration - First Author");
    insert_file(&repo, 10, "PDF", "Collaboration - First Author");

    let page = repo.list_books(SortKey::ByTitle, 1, 10).unwrap();
    let book = &page.items[0];

    // Link-table order decides the primary author
    assert_eq!(book.primary_author().unwrap().name, "First Author");
    assert_eq!(book.authors.len(), 2);

    let formats: Vec<&str> = book.files.iter().map(|f| f.format.as_str()).collect();
    assert_eq!(formats, vec!["EPUB", "PDF"]);
}

#[test]
fn repo_book_without_author() {
    let repo = test_repo();
    insert_book(&repo, 1, "Anonymous Work", "2024-01-01 00:00:00+00:00");

    let page = repo.list_books(SortKey::ByTitle, 1, 10).unwrap();
    assert!(page.items[0].primary_author().is_none());
    assert!(page.items[0].authors.is_empty());
}

#[test]
fn repo_author_name_not_found() {
    let repo = test_repo();
    insert_author(&repo, 1, "Known", "Known");

    assert_eq!(repo.author_name(1).unwrap(), "Known");
    assert!(matches!(
        repo.author_name(99),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn repo_book_title_not_found() {
    let repo = test_repo();
    insert_book(&repo, 1, "Known", "2024-01-01 00:00:00+00:00");

    assert_eq!(repo.book_title(1).unwrap(), "Known");
    assert!(matches!(repo.book_title(99), Err(AppError::NotFound(_))));
}

#[test]
fn repo_file_path_resolution() {
    let repo = test_repo();
    insert_book(&repo, 1, "Dune", "2024-01-01 00:00:00+00:00");
    insert_file(&repo, 1, "EPUB", "Dune - Frank Herbert");

    let path = repo.book_file_path(1, "epub").unwrap();
    assert_eq!(
        path,
        Path::new("/library/Folder 1/Dune - Frank Herbert.epub")
    );

    // Format codes are case-insensitive on input
    assert_eq!(repo.book_file_path(1, " EPUB ").unwrap(), path);
}

#[test]
fn repo_missing_book_and_missing_format_are_distinct() {
    let repo = test_repo();
    insert_book(&repo, 1, "Dune", "2024-01-01 00:00:00+00:00");
    insert_file(&repo, 1, "EPUB", "Dune - Frank Herbert");

    let unknown_book = repo.book_file_path(99, "epub").unwrap_err();
    let unknown_format = repo.book_file_path(1, "pdf").unwrap_err();

    match (&unknown_book, &unknown_format) {
        (AppError::NotFound(a), AppError::NotFound(b)) => {
            assert!(a.contains("Book not found"));
            assert!(b.contains("No PDF file"));
        }
        other => panic!("expected NotFound pair, got {:?}", other),
    }
}

#[test]
fn repo_cover_path_checks_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::open_memory(dir.path(), SortDirection::Ascending).unwrap();

    {
        let conn = repo.connection();
        conn.execute(
            "INSERT INTO books (id, title, sort, path, last_modified) VALUES (?, ?, ?, ?, ?)",
            params![1, "Dune", "Dune", "Herbert/Dune (1)", "2024-01-01 00:00:00+00:00"],
        )
        .unwrap();
    }

    // No cover on disk yet
    assert!(matches!(repo.cover_path(1), Err(AppError::NotFound(_))));

    let book_dir = dir.path().join("Herbert/Dune (1)");
    std::fs::create_dir_all(&book_dir).unwrap();
    std::fs::write(book_dir.join("cover.jpg"), b"jpeg").unwrap();

    assert_eq!(repo.cover_path(1).unwrap(), book_dir.join("cover.jpg"));

    // Unknown book stays NotFound regardless of the filesystem
    assert!(matches!(repo.cover_path(99), Err(AppError::NotFound(_))));
}

#[test]
fn repo_open_fails_without_metadata_db() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Repository::open(dir.path(), SortDirection::Ascending),
        Err(AppError::Config(_))
    ));
}

#[test]
fn parse_modified_formats() {
    let calibre = parse_modified("2024-03-01 10:11:12.123456+00:00");
    assert_eq!(calibre.format("%Y-%m-%dT%H:%M:%SZ").to_string(), "2024-03-01T10:11:12Z");

    let rfc3339 = parse_modified("2024-03-01T10:11:12+02:00");
    assert_eq!(rfc3339.format("%H:%M").to_string(), "08:11");

    let naive = parse_modified("2024-03-01 10:11:12");
    assert_eq!(naive.format("%H:%M").to_string(), "10:11");

    assert_eq!(parse_modified("not a date"), chrono::DateTime::UNIX_EPOCH);
}

// ============================================================================
// ENTRY IDS
// ============================================================================

#[test]
fn entry_id_is_stable_and_unique() {
    let id_a = book_entry_id(42);
    let id_b = book_entry_id(42);
    let id_c = book_entry_id(43);

    assert_eq!(id_a, id_b);
    assert_ne!(id_a, id_c);

    let digest = id_a.strip_prefix("calibre-navcatalog:").unwrap();
    assert_eq!(digest.len(), 40);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(digest, digest.to_lowercase());
}

// ============================================================================
// FEEDS
// ============================================================================

#[test]
fn root_feed_lists_three_sections() {
    let repo = test_repo();
    let catalog = test_catalog(&repo, 30);

    let feed = catalog.root_feed();
    assert_eq!(feed.id, "urn:opds-server:main");
    assert_eq!(feed.items.len(), 3);

    let xml = feed.to_xml("/opds");
    assert!(xml.contains("By Newest"));
    assert!(xml.contains("By Title"));
    assert!(xml.contains("By Author"));
    assert!(xml.contains(r#"href="/opds/by-newest""#));
    assert!(xml.contains(r#"rel="start""#));
    assert!(xml.contains(r#"rel="search""#));
    assert!(xml.contains("opensearch.xml"));
}

#[test]
fn book_feed_contains_acquisition_and_cover_links() {
    let repo = test_repo();
    insert_author(&repo, 1, "Frank Herbert", "Herbert, Frank");
    insert_book(&repo, 10, "Dune", "2024-03-01 10:11:12+00:00");
    link_author(&repo, 10, 1);
    insert_file(&repo, 10, "EPUB", "Dune - Frank Herbert");

    let catalog = test_catalog(&repo, 30);
    let feed = catalog.title_feed(1).unwrap();
    let xml = feed.to_xml("/opds");

    assert!(xml.contains(r#"href="/opds/book/10/file/epub""#));
    assert!(xml.contains("application/epub+zip"));
    assert!(xml.contains(r#"href="/opds/book/10/cover""#));
    assert!(xml.contains("image/jpeg"));
    assert!(xml.contains("<name>Frank Herbert</name>"));
    assert!(xml.contains("<uri>/opds/author/1</uri>"));
    assert!(xml.contains("<updated>2024-03-01T10:11:12Z</updated>"));
    assert!(xml.contains(&book_entry_id(10)));
}

#[test]
fn book_without_author_has_no_author_block() {
    let repo = test_repo();
    insert_book(&repo, 1, "Anonymous Work", "2024-01-01 00:00:00+00:00");

    let catalog = test_catalog(&repo, 30);
    let xml = catalog.title_feed(1).unwrap().to_xml("/opds");

    assert!(xml.contains("Anonymous Work"));
    assert!(!xml.contains("<uri>"));
    // Only the feed-level author block is present
    assert_eq!(xml.matches("<author>").count(), 1);
}

#[test]
fn feed_escapes_reserved_characters() {
    let repo = test_repo();
    insert_author(&repo, 1, "A & B <Collective>", "A");
    insert_book(&repo, 1, r#"Dune & "Friends" <Vol 1>"#, "2024-01-01 00:00:00+00:00");
    link_author(&repo, 1, 1);

    let catalog = test_catalog(&repo, 30);
    let xml = catalog.title_feed(1).unwrap().to_xml("/opds");

    assert!(xml.contains("Dune &amp;"));
    assert!(xml.contains("&lt;Vol 1&gt;"));
    assert!(xml.contains("A &amp; B &lt;Collective&gt;"));
    assert!(!xml.contains("<Vol 1>"));
    assert!(!xml.contains("<Collective>"));
}

#[test]
fn search_feed_carries_term_in_pagination_links() {
    let repo = test_repo();
    for i in 1..=5 {
        insert_book(&repo, i, &format!("Dune {}", i), "2024-01-01 00:00:00+00:00");
    }

    let catalog = test_catalog(&repo, 2);
    let feed = catalog.search_feed("dune", 2).unwrap();
    assert!(feed.has_previous);
    assert!(feed.has_next);

    let xml = feed.to_xml("/opds");
    assert!(xml.contains(r#"rel="self" href="/opds/search?page=2&amp;q=dune""#));
    assert!(xml.contains(r#"rel="first" href="/opds/search?page=1&amp;q=dune""#));
    assert!(xml.contains(r#"rel="previous" href="/opds/search?page=1&amp;q=dune""#));
    assert!(xml.contains(r#"rel="next" href="/opds/search?page=3&amp;q=dune""#));
}

#[test]
fn search_feed_encodes_term_in_links() {
    let repo = test_repo();
    insert_book(&repo, 1, "War and Peace", "2024-01-01 00:00:00+00:00");

    let catalog = test_catalog(&repo, 30);
    let xml = catalog.search_feed("war & peace", 1).unwrap().to_xml("/opds");

    assert!(xml.contains("q=war%20%26%20peace"));
    // The raw term appears only as escaped text (feed id and title)
    assert!(xml.contains("search:war &amp; peace"));
}

#[test]
fn first_page_never_has_previous_link() {
    let repo = test_repo();
    for i in 1..=5 {
        insert_book(&repo, i, &format!("Book {}", i), "2024-01-01 00:00:00+00:00");
    }

    let catalog = test_catalog(&repo, 2);
    let xml = catalog.title_feed(1).unwrap().to_xml("/opds");
    assert!(!xml.contains(r#"rel="previous""#));
    assert!(xml.contains(r#"rel="next""#));
}

#[test]
fn authors_feed_links_to_author_books() {
    let repo = test_repo();
    insert_author(&repo, 7, "Frank Herbert", "Herbert, Frank");

    let catalog = test_catalog(&repo, 30);
    let feed = catalog.authors_feed(1).unwrap();
    assert_eq!(feed.items.len(), 1);
    assert_eq!(feed.items[0].id, "urn:opds-server:author:7");

    let xml = feed.to_xml("/opds");
    assert!(xml.contains(r#"href="/opds/author/7""#));
}

#[test]
fn author_books_feed_titled_after_author() {
    let repo = test_repo();
    insert_author(&repo, 1, "Frank Herbert", "Herbert, Frank");
    insert_book(&repo, 10, "Dune", "2024-01-01 00:00:00+00:00");
    link_author(&repo, 10, 1);

    let catalog = test_catalog(&repo, 30);
    let feed = catalog.author_books_feed(1, 1).unwrap();
    assert_eq!(feed.title, "Books by Frank Herbert");
    assert_eq!(feed.items.len(), 1);
}

#[test]
fn author_books_feed_unknown_author_is_not_found() {
    let repo = test_repo();
    let catalog = test_catalog(&repo, 30);

    assert!(matches!(
        catalog.author_books_feed(99, 1),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn opensearch_has_search_template() {
    let xml = generate_opensearch("/opds");
    assert!(xml.contains("OpenSearchDescription"));
    assert!(xml.contains("/opds/search?q={searchTerms}"));
}

// ============================================================================
// FORMATS AND FILENAMES
// ============================================================================

#[test]
fn book_format_mime_table() {
    assert_eq!(BookFormat::mime_for_extension("epub"), "application/epub+zip");
    assert_eq!(BookFormat::mime_for_extension("pdf"), "application/pdf");
    assert_eq!(
        BookFormat::mime_for_extension("mobi"),
        "application/x-mobipocket-ebook"
    );
    assert_eq!(
        BookFormat::mime_for_extension("fb2"),
        "application/x-fictionbook+xml"
    );
    assert_eq!(BookFormat::mime_for_extension("djvu"), "image/vnd.djvu");
    assert_eq!(
        BookFormat::mime_for_extension("azw3"),
        "application/vnd.amazon.ebook"
    );
    assert_eq!(
        BookFormat::mime_for_extension("azw"),
        "application/vnd.amazon.ebook"
    );
    assert_eq!(BookFormat::mime_for_extension("cbz"), "application/x-cbz");
    assert_eq!(BookFormat::mime_for_extension("cbr"), "application/x-cbr");
    assert_eq!(
        BookFormat::mime_for_extension("txt"),
        "text/plain; charset=utf-8"
    );
    assert_eq!(BookFormat::mime_for_extension("rtf"), "application/rtf");
    assert_eq!(
        BookFormat::mime_for_extension("xyz"),
        "application/octet-stream"
    );
}

#[test]
fn book_format_case_insensitive() {
    assert_eq!(BookFormat::from_extension("EPUB"), Some(BookFormat::Epub));
    assert_eq!(BookFormat::from_extension("Pdf"), Some(BookFormat::Pdf));
    assert_eq!(BookFormat::from_extension("doc"), None);
}

#[test]
fn filename_sanitization() {
    assert_eq!(title_to_filename("Dune", "EPUB"), "Dune.epub");
    assert_eq!(
        title_to_filename(r#"What/If: A "Question"?"#, "pdf"),
        "What_If_ A _Question__.pdf"
    );
    assert_eq!(title_to_filename("  Spaced    Out  ", "txt"), "Spaced Out.txt");
    assert_eq!(title_to_filename("Trailing dots...", "epub"), "Trailing dots.epub");
    assert_eq!(title_to_filename("???", "epub"), "___.epub");
    assert_eq!(title_to_filename("", "epub"), "book.epub");

    let long = "x".repeat(300);
    let name = title_to_filename(&long, "epub");
    assert_eq!(name.len(), 100 + ".epub".len());
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn config_parse_toml() {
    let toml = r#"
[server]
bind = "127.0.0.1:9090"
title = "Test Catalog"

[library]
path = "/mnt/calibre"

[catalog]
prefix = "/books"
page_size = 10
newest_order = "descending"
"#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.server.bind.port(), 9090);
    assert_eq!(config.server.title, "Test Catalog");
    assert_eq!(config.library.path, Path::new("/mnt/calibre"));
    assert_eq!(config.catalog.prefix, "/books");
    assert_eq!(config.catalog.page_size, 10);
    assert_eq!(config.catalog.newest_order, SortDirection::Descending);
    config.validate().unwrap();
}

#[test]
fn config_default_values() {
    let config = Config::default();
    assert_eq!(config.server.bind.port(), 8080);
    assert_eq!(config.catalog.prefix, "/opds");
    assert_eq!(config.catalog.page_size, 30);
    assert_eq!(config.catalog.newest_order, SortDirection::Ascending);
    config.validate().unwrap();
}

#[test]
fn config_rejects_bad_prefix_and_page_size() {
    let mut config = Config::default();
    config.catalog.prefix = "opds".to_string();
    assert!(config.validate().is_err());

    config.catalog.prefix = "/opds/".to_string();
    assert!(config.validate().is_err());

    config.catalog.prefix = "/opds".to_string();
    config.catalog.page_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn sort_direction_from_str() {
    assert_eq!(
        SortDirection::from_str("ascending").unwrap(),
        SortDirection::Ascending
    );
    assert_eq!(
        SortDirection::from_str("descending").unwrap(),
        SortDirection::Descending
    );
    assert!(SortDirection::from_str("sideways").is_err());
}

#[test]
fn default_config_content_parses() {
    let config: Config = toml::from_str(&Config::generate_default()).unwrap();
    config.validate().unwrap();
    assert_eq!(config.catalog.prefix, "/opds");
}
