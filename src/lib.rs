//! calibre-opds: a read-only OPDS catalog server for Calibre libraries.
//!
//! This crate serves an existing Calibre library (its `metadata.db` and book
//! folders) as an OPDS 1.x catalog consumable by e-readers like KOReader.
//! The library is never written to; every request is a read against the
//! metadata store followed by transient feed generation.
//!
//! # Features
//!
//! - Navigation feed with By Newest / By Title / By Author listings
//! - Offset pagination with look-ahead "has more" detection
//! - Case-insensitive title search with OpenSearch description
//! - Book file downloads with correct MIME types
//! - Cover image downloads
//! - Stable per-book entry ids compatible with existing bookmarked feeds

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Configuration and CLI.
pub mod config;
/// Calibre metadata store access.
pub mod db;
/// Error types.
pub mod error;
/// OPDS feed generation.
pub mod opds;
/// HTTP server.
pub mod server;

#[cfg(test)]
mod tests;

pub use config::{Cli, Command, Config};
pub use db::Repository;
pub use error::{AppError, Result};
pub use opds::Catalog;
pub use server::AppState;
