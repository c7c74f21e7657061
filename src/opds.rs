//! OPDS catalog generation.
//!
//! The [`Catalog`] builds transient [`Feed`] values from repository results;
//! [`Feed::to_xml`] renders them as Atom. All free text goes through the
//! quick-xml writer, so titles and search terms can never break the
//! document structure.

use crate::config::{BookFormat, Config};
use crate::db::{Book, Repository, SortKey};
use crate::error::Result;
use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use sha1::{Digest, Sha1};
use std::io::Cursor;

/// Link type for navigation feeds.
const ATOM_NAV: &str = "application/atom+xml;profile=opds-catalog";
/// Link type for feed documents referenced from navigation entries.
const ATOM_FEED: &str = "application/atom+xml;type=feed;profile=opds-catalog";
/// Link type for the OpenSearch description.
const OPENSEARCH_TYPE: &str = "application/opensearchdescription+xml";
/// Relation for book file downloads.
const REL_ACQUISITION: &str = "http://opds-spec.org/acquisition";
/// Relation for cover images.
const REL_IMAGE: &str = "http://opds-spec.org/image";
/// Relation for sorted listing entries in the root feed.
const REL_SORT: &str = "http://opds-spec.org/sort";

/// OPDS feed link.
#[derive(Debug, Clone)]
pub struct Link {
    /// Link relation type (e.g. "self", "next", acquisition).
    pub rel: String,
    /// URL of the linked resource.
    pub href: String,
    /// MIME type of the linked resource.
    pub link_type: String,
    /// Optional title for the link.
    pub title: Option<String>,
}

/// Author block of a feed item.
#[derive(Debug, Clone)]
pub struct ItemAuthor {
    /// Display name.
    pub name: String,
    /// Author id, when the name links to an author feed.
    pub id: Option<i64>,
}

/// OPDS feed entry, built fresh per request.
#[derive(Debug, Clone)]
pub struct Item {
    /// Stable unique identifier.
    pub id: String,
    /// Entry title.
    pub title: String,
    /// Last update timestamp.
    pub updated: DateTime<Utc>,
    /// Primary author, absent for authorless books and navigation entries.
    pub author: Option<ItemAuthor>,
    /// Acquisition, cover and navigation links.
    pub links: Vec<Link>,
    /// Short summary text.
    pub summary: Option<String>,
}

/// OPDS feed, built fresh per request and discarded after serialization.
#[derive(Debug, Clone)]
pub struct Feed {
    /// Stable feed identifier (URN).
    pub id: String,
    /// Feed title.
    pub title: String,
    /// Generation timestamp.
    pub updated: DateTime<Utc>,
    /// Feed-level author name (the catalog itself).
    pub author: String,
    /// Endpoint path used for pagination links.
    pub endpoint: String,
    /// 1-based page number.
    pub page: u32,
    /// Whether a previous page exists; page 1 never has one.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
    /// Query parameters carried into every pagination link.
    pub query: Vec<(String, String)>,
    /// Feed entries.
    pub items: Vec<Item>,
}

impl Feed {
    /// Pagination and fixed links for this feed.
    ///
    /// `start` and `search` are always present, as are `self` and `first`;
    /// `previous`/`next` only when the corresponding page exists. Every
    /// pagination link carries the feed's query parameters.
    fn links(&self, prefix: &str) -> Vec<Link> {
        let mut links = vec![
            Link {
                rel: "start".to_string(),
                href: prefix.to_string(),
                link_type: format!("{};kind=navigation", ATOM_NAV),
                title: None,
            },
            Link {
                rel: "search".to_string(),
                href: format!("{}/opensearch.xml", prefix),
                link_type: OPENSEARCH_TYPE.to_string(),
                title: Some("Search".to_string()),
            },
            self.nav_link("self", self.page),
            self.nav_link("first", 1),
        ];

        if self.has_previous {
            links.push(self.nav_link("previous", self.page - 1));
        }
        if self.has_next {
            links.push(self.nav_link("next", self.page + 1));
        }

        links
    }

    /// Uniform pagination link to a page of this feed.
    fn nav_link(&self, rel: &str, page: u32) -> Link {
        let mut href = format!("{}?page={}", self.endpoint, page);
        for (key, value) in &self.query {
            href.push('&');
            href.push_str(key);
            href.push('=');
            href.push_str(&urlencoding::encode(value));
        }

        Link {
            rel: rel.to_string(),
            href,
            link_type: ATOM_NAV.to_string(),
            title: None,
        }
    }

    /// Render the feed as an Atom document.
    pub fn to_xml(&self, prefix: &str) -> String {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        // Writing to Vec can't fail
        let _ = writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)));

        let mut feed = BytesStart::new("feed");
        feed.push_attribute(("xmlns", "http://www.w3.org/2005/Atom"));
        let _ = writer.write_event(Event::Start(feed));

        write_text_element(&mut writer, "title", &self.title);
        write_text_element(&mut writer, "id", &self.id);
        write_text_element(&mut writer, "updated", &format_timestamp(self.updated));

        let _ = writer.write_event(Event::Start(BytesStart::new("author")));
        write_text_element(&mut writer, "name", &self.author);
        let _ = writer.write_event(Event::End(BytesEnd::new("author")));

        for link in self.links(prefix) {
            write_link(&mut writer, &link);
        }

        for item in &self.items {
            write_item(&mut writer, item, prefix);
        }

        let _ = writer.write_event(Event::End(BytesEnd::new("feed")));

        String::from_utf8(writer.into_inner().into_inner()).unwrap_or_default()
    }
}

/// Write a simple text element.
fn write_text_element<W: std::io::Write>(writer: &mut Writer<W>, name: &str, text: &str) {
    let _ = writer.write_event(Event::Start(BytesStart::new(name)));
    let _ = writer.write_event(Event::Text(BytesText::new(text)));
    let _ = writer.write_event(Event::End(BytesEnd::new(name)));
}

/// Write a link element.
fn write_link<W: std::io::Write>(writer: &mut Writer<W>, link: &Link) {
    let mut elem = BytesStart::new("link");
    elem.push_attribute(("rel", link.rel.as_str()));
    elem.push_attribute(("href", link.href.as_str()));
    elem.push_attribute(("type", link.link_type.as_str()));
    if let Some(title) = &link.title {
        elem.push_attribute(("title", title.as_str()));
    }
    let _ = writer.write_event(Event::Empty(elem));
}

/// Write an entry element.
fn write_item<W: std::io::Write>(writer: &mut Writer<W>, item: &Item, prefix: &str) {
    let _ = writer.write_event(Event::Start(BytesStart::new("entry")));

    write_text_element(writer, "title", &item.title);
    write_text_element(writer, "id", &item.id);
    write_text_element(writer, "updated", &format_timestamp(item.updated));

    if let Some(author) = &item.author {
        let _ = writer.write_event(Event::Start(BytesStart::new("author")));
        write_text_element(writer, "name", &author.name);
        if let Some(id) = author.id {
            write_text_element(writer, "uri", &format!("{}/author/{}", prefix, id));
        }
        let _ = writer.write_event(Event::End(BytesEnd::new("author")));
    }

    for link in &item.links {
        write_link(writer, link);
    }

    if let Some(summary) = &item.summary {
        let mut elem = BytesStart::new("summary");
        elem.push_attribute(("type", "text"));
        let _ = writer.write_event(Event::Start(elem));
        let _ = writer.write_event(Event::Text(BytesText::new(summary)));
        let _ = writer.write_event(Event::End(BytesEnd::new("summary")));
    }

    let _ = writer.write_event(Event::End(BytesEnd::new("entry")));
}

/// Format a timestamp as an Atom-compliant UTC value.
fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Stable entry id for a book.
///
/// Reproduces the historical derivation byte for byte so entry ids stay
/// identical for clients that bookmarked feeds from earlier deployments:
/// `calibre-navcatalog:` followed by the hex SHA-1 of the decimal book id.
pub fn book_entry_id(book_id: i64) -> String {
    let digest = Sha1::digest(book_id.to_string().trim().as_bytes());
    format!("calibre-navcatalog:{}", hex::encode(digest))
}

/// Feed builder over the repository.
///
/// Holds the injected catalog settings; nothing here is process-global.
#[derive(Clone)]
pub struct Catalog {
    repo: Repository,
    title: String,
    prefix: String,
    page_size: u32,
}

impl Catalog {
    /// Create a catalog over a repository with settings from the config.
    pub fn new(repo: Repository, config: &Config) -> Self {
        Self {
            repo,
            title: config.server.title.clone(),
            prefix: config.catalog.prefix.clone(),
            page_size: config.catalog.page_size,
        }
    }

    /// URL prefix all catalog routes live under.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Static root navigation feed.
    pub fn root_feed(&self) -> Feed {
        let updated = Utc::now();

        let nav = |title: &str, slug: &str, summary: &str| Item {
            id: format!("urn:opds-server:{}:", slug),
            title: title.to_string(),
            updated,
            author: None,
            links: vec![Link {
                rel: REL_SORT.to_string(),
                href: format!("{}/{}", self.prefix, slug),
                link_type: ATOM_FEED.to_string(),
                title: None,
            }],
            summary: Some(summary.to_string()),
        };

        Feed {
            id: "urn:opds-server:main".to_string(),
            title: self.title.clone(),
            updated,
            author: self.title.clone(),
            endpoint: self.prefix.clone(),
            page: 1,
            has_previous: false,
            has_next: false,
            query: Vec::new(),
            items: vec![
                nav("By Newest", "by-newest", "Books sorted by date"),
                nav("By Title", "by-title", "Books sorted by title"),
                nav("By Author", "by-author", "Books sorted by author"),
            ],
        }
    }

    /// Books ordered by modification time.
    pub fn newest_feed(&self, page: u32) -> Result<Feed> {
        let books = self.repo.list_books(SortKey::ByNewest, page, self.page_size)?;

        Ok(Feed {
            id: "urn:opds-server:by-newest".to_string(),
            title: self.title.clone(),
            updated: Utc::now(),
            author: self.title.clone(),
            endpoint: format!("{}/by-newest", self.prefix),
            page,
            has_previous: books.has_previous,
            has_next: books.has_next,
            query: Vec::new(),
            items: self.book_items(books.items),
        })
    }

    /// Books ordered by title.
    pub fn title_feed(&self, page: u32) -> Result<Feed> {
        let books = self.repo.list_books(SortKey::ByTitle, page, self.page_size)?;

        Ok(Feed {
            id: "urn:opds-server:by-title".to_string(),
            title: self.title.clone(),
            updated: Utc::now(),
            author: self.title.clone(),
            endpoint: format!("{}/by-title", self.prefix),
            page,
            has_previous: books.has_previous,
            has_next: books.has_next,
            query: Vec::new(),
            items: self.book_items(books.items),
        })
    }

    /// Navigation feed listing authors.
    pub fn authors_feed(&self, page: u32) -> Result<Feed> {
        let authors = self.repo.list_authors(page, self.page_size)?;
        let updated = Utc::now();

        let items = authors
            .items
            .into_iter()
            .map(|author| Item {
                id: format!("urn:opds-server:author:{}", author.id),
                title: author.name,
                updated,
                author: None,
                links: vec![Link {
                    rel: "subsection".to_string(),
                    href: format!("{}/author/{}", self.prefix, author.id),
                    link_type: ATOM_NAV.to_string(),
                    title: None,
                }],
                summary: None,
            })
            .collect();

        Ok(Feed {
            id: "urn:opds-server:by-author".to_string(),
            title: "By Authors".to_string(),
            updated,
            author: self.title.clone(),
            endpoint: format!("{}/by-author", self.prefix),
            page,
            has_previous: authors.has_previous,
            has_next: authors.has_next,
            query: Vec::new(),
            items,
        })
    }

    /// Books by one author; fails with NotFound for an unknown author id.
    pub fn author_books_feed(&self, author_id: i64, page: u32) -> Result<Feed> {
        // Resolves the name first so an unknown author 404s instead of
        // serving an empty feed.
        let name = self.repo.author_name(author_id)?;
        let books = self
            .repo
            .list_books_by_author(author_id, page, self.page_size)?;

        Ok(Feed {
            id: format!("urn:opds-server:author:{}", author_id),
            title: format!("Books by {}", name),
            updated: Utc::now(),
            author: self.title.clone(),
            endpoint: format!("{}/author/{}", self.prefix, author_id),
            page,
            has_previous: books.has_previous,
            has_next: books.has_next,
            query: Vec::new(),
            items: self.book_items(books.items),
        })
    }

    /// Title search results; the term rides along in every pagination link.
    pub fn search_feed(&self, term: &str, page: u32) -> Result<Feed> {
        let books = self.repo.search_books(term, page, self.page_size)?;

        Ok(Feed {
            id: format!("urn:opds-server:search:{}", term),
            title: format!("Search results for '{}'", term),
            updated: Utc::now(),
            author: self.title.clone(),
            endpoint: format!("{}/search", self.prefix),
            page,
            has_previous: books.has_previous,
            has_next: books.has_next,
            query: vec![("q".to_string(), term.to_string())],
            items: self.book_items(books.items),
        })
    }

    /// Map repository books to acquisition items.
    fn book_items(&self, books: Vec<Book>) -> Vec<Item> {
        books.into_iter().map(|b| self.book_item(b)).collect()
    }

    /// Build one acquisition item from a book.
    ///
    /// The cover link is unconditional; existence is only verified when the
    /// cover is actually downloaded.
    fn book_item(&self, book: Book) -> Item {
        let mut links: Vec<Link> = book
            .files
            .iter()
            .map(|file| {
                let ext = file.format.to_lowercase();
                Link {
                    rel: REL_ACQUISITION.to_string(),
                    href: format!("{}/book/{}/file/{}", self.prefix, book.id, ext),
                    link_type: BookFormat::mime_for_extension(&ext).to_string(),
                    title: None,
                }
            })
            .collect();

        links.push(Link {
            rel: REL_IMAGE.to_string(),
            href: format!("{}/book/{}/cover", self.prefix, book.id),
            link_type: "image/jpeg".to_string(),
            title: None,
        });

        let author = book.primary_author().map(|a| ItemAuthor {
            name: a.name.clone(),
            id: Some(a.id),
        });

        Item {
            id: book_entry_id(book.id),
            title: book.title,
            updated: book.last_modified,
            author,
            links,
            summary: None,
        }
    }
}

/// Generate the OpenSearch description document.
pub fn generate_opensearch(prefix: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<OpenSearchDescription xmlns="http://a9.com/-/spec/opensearch/1.1/">
  <ShortName>OPDS Search</ShortName>
  <Description>Search books in the OPDS catalog</Description>
  <InputEncoding>UTF-8</InputEncoding>
  <OutputEncoding>UTF-8</OutputEncoding>
  <Url type="application/atom+xml;profile=opds-catalog;kind=acquisition" template="{}/search?q={{searchTerms}}"/>
</OpenSearchDescription>"#,
        prefix
    )
}
