//! HTTP request handlers.

use crate::config::BookFormat;
use crate::error::{AppError, Result};
use crate::opds;
use crate::server::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

/// Media type for serialized feeds.
const FEED_MIME: &str = "application/atom+xml; charset=utf-8";

/// Build a response, returning 500 on error (which shouldn't happen).
fn build_response(status: StatusCode, content_type: &str, body: impl Into<Body>) -> Response<Body> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .body(body.into())
        .unwrap_or_else(|_| {
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::from("Internal error"))
                .unwrap_or_default()
        })
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// 1-based page number.
    #[serde(default = "default_page")]
    page: u32,
}

fn default_page() -> u32 {
    1
}

/// Search query parameters; `q` is required.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    #[serde(default = "default_page")]
    page: u32,
}

/// Reject page numbers below 1.
fn validate_page(page: u32) -> Result<u32> {
    if page == 0 {
        return Err(AppError::InvalidArgument(
            "Page number must be at least 1".to_string(),
        ));
    }
    Ok(page)
}

// ============================================================================
// FEEDS
// ============================================================================

/// Root navigation feed.
pub async fn catalog_root(State(state): State<AppState>) -> impl IntoResponse {
    let xml = state.catalog.root_feed().to_xml(state.catalog.prefix());
    build_response(StatusCode::OK, FEED_MIME, xml)
}

/// Books by modification time.
pub async fn catalog_by_newest(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Result<Response<Body>> {
    let page = validate_page(params.page)?;
    let feed = state.catalog.newest_feed(page)?;
    Ok(build_response(
        StatusCode::OK,
        FEED_MIME,
        feed.to_xml(state.catalog.prefix()),
    ))
}

/// Books by title.
pub async fn catalog_by_title(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Result<Response<Body>> {
    let page = validate_page(params.page)?;
    let feed = state.catalog.title_feed(page)?;
    Ok(build_response(
        StatusCode::OK,
        FEED_MIME,
        feed.to_xml(state.catalog.prefix()),
    ))
}

/// Author listing.
pub async fn catalog_by_author(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Result<Response<Body>> {
    let page = validate_page(params.page)?;
    let feed = state.catalog.authors_feed(page)?;
    Ok(build_response(
        StatusCode::OK,
        FEED_MIME,
        feed.to_xml(state.catalog.prefix()),
    ))
}

/// Books of one author.
pub async fn catalog_author_books(
    State(state): State<AppState>,
    Path(author_id): Path<i64>,
    Query(params): Query<PageQuery>,
) -> Result<Response<Body>> {
    let page = validate_page(params.page)?;
    let feed = state.catalog.author_books_feed(author_id, page)?;
    Ok(build_response(
        StatusCode::OK,
        FEED_MIME,
        feed.to_xml(state.catalog.prefix()),
    ))
}

/// Title search.
pub async fn catalog_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Response<Body>> {
    let page = validate_page(params.page)?;
    let feed = state.catalog.search_feed(&params.q, page)?;
    Ok(build_response(
        StatusCode::OK,
        FEED_MIME,
        feed.to_xml(state.catalog.prefix()),
    ))
}

/// OpenSearch description.
pub async fn opensearch(State(state): State<AppState>) -> impl IntoResponse {
    let xml = opds::generate_opensearch(state.catalog.prefix());
    build_response(
        StatusCode::OK,
        "application/opensearchdescription+xml; charset=utf-8",
        xml,
    )
}

// ============================================================================
// DOWNLOADS
// ============================================================================

/// Book file download.
pub async fn book_file(
    State(state): State<AppState>,
    Path((book_id, format)): Path<(i64, String)>,
) -> Result<Response<Body>> {
    let path = state.repo.book_file_path(book_id, &format)?;
    let title = state.repo.book_title(book_id)?;

    let ext = format.to_lowercase();
    let filename = title_to_filename(&title, &ext);
    let disposition = format!("attachment; filename=\"{}\"", filename);

    let file = open_stored_file(&path).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, BookFormat::mime_for_extension(&ext))
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(body)
        .unwrap_or_else(|_| Response::default()))
}

/// Book cover download.
pub async fn book_cover(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> Result<Response<Body>> {
    let path = state.repo.cover_path(book_id)?;

    let file = open_stored_file(&path).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/jpeg")
        .body(body)
        .unwrap_or_else(|_| Response::default()))
}

/// Open a stored file, mapping a missing file to NotFound.
///
/// The store can reference a file that was removed from disk; that is a
/// client-visible 404, not an internal error. The error text never includes
/// the path.
async fn open_stored_file(path: &std::path::Path) -> Result<tokio::fs::File> {
    tokio::fs::File::open(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound("File not found".to_string())
        } else {
            AppError::Io(e)
        }
    })
}

/// Derive a safe download filename from a book title.
pub fn title_to_filename(title: &str, extension: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();

    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let stem: String = collapsed
        .trim_matches(|c| c == ' ' || c == '.')
        .chars()
        .take(100)
        .collect();

    let stem = if stem.is_empty() {
        "book".to_string()
    } else {
        stem
    };

    format!("{}.{}", stem, extension.to_lowercase())
}
