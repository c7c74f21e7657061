//! Application state shared across handlers.

use crate::config::Config;
use crate::db::Repository;
use crate::opds::Catalog;
use std::sync::Arc;

/// Shared application state.
///
/// Everything here is immutable for the lifetime of the process; requests
/// share the read-only repository and the catalog settings.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Metadata store access.
    pub repo: Repository,
    /// Feed builder.
    pub catalog: Catalog,
}

impl AppState {
    /// Create new application state around an opened repository.
    pub fn new(config: Config, repo: Repository) -> Self {
        let catalog = Catalog::new(repo.clone(), &config);
        Self {
            config: Arc::new(config),
            repo,
            catalog,
        }
    }
}
