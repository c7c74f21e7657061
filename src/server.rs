//! HTTP server and routes.

mod handlers;
mod state;

pub use handlers::title_to_filename;
pub use state::AppState;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the application router.
///
/// All catalog routes live under the configured URL prefix.
pub fn create_router(state: AppState) -> Router {
    let prefix = state.config.catalog.prefix.clone();

    let catalog_routes = Router::new()
        .route("/", get(handlers::catalog_root))
        .route("/by-newest", get(handlers::catalog_by_newest))
        .route("/by-title", get(handlers::catalog_by_title))
        .route("/by-author", get(handlers::catalog_by_author))
        .route("/author/{author_id}", get(handlers::catalog_author_books))
        .route("/search", get(handlers::catalog_search))
        .route("/opensearch.xml", get(handlers::opensearch))
        .route("/book/{book_id}/file/{format}", get(handlers::book_file))
        .route("/book/{book_id}/cover", get(handlers::book_cover));

    Router::new()
        .nest(&prefix, catalog_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
