use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Read-only OPDS catalog server for Calibre libraries.
#[derive(Parser, Debug, Clone)]
#[command(name = "calibre-opds")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file.
    #[arg(short, long, env = "CALIBRE_OPDS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the server (default if no command given).
    Serve {
        /// Address to bind the server to.
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Path to the Calibre library directory (overrides config).
        #[arg(short, long, env = "CALIBRE_LIBRARY_PATH")]
        library: Option<PathBuf>,
    },

    /// Create a default config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}

/// Main configuration from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Calibre library configuration.
    #[serde(default)]
    pub library: LibraryConfig,

    /// Catalog configuration.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Catalog title shown to clients.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            title: default_title(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::new(
        std::net::IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        8080,
    )
}

fn default_title() -> String {
    "Calibre OPDS Catalog".to_string()
}

/// Calibre library configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Path to the Calibre library directory (containing metadata.db).
    #[serde(default = "default_library_path")]
    pub path: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: default_library_path(),
        }
    }
}

fn default_library_path() -> PathBuf {
    PathBuf::from("/books")
}

/// Catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// URL prefix for all catalog routes.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Number of entries per feed page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Sort direction for the "By Newest" feed.
    ///
    /// Historical behavior is ascending by modification time; set to
    /// "descending" to list the most recently modified books first.
    #[serde(default)]
    pub newest_order: SortDirection,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            page_size: default_page_size(),
            newest_order: SortDirection::default(),
        }
    }
}

fn default_prefix() -> String {
    "/opds".to_string()
}

fn default_page_size() -> u32 {
    30
}

/// Sort direction for a book listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending by the sort field.
    #[default]
    Ascending,
    /// Descending by the sort field.
    Descending,
}

impl SortDirection {
    /// SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s {
            "ascending" => Ok(SortDirection::Ascending),
            "descending" => Ok(SortDirection::Descending),
            other => Err(crate::error::AppError::InvalidArgument(format!(
                "Invalid sort direction: {}",
                other
            ))),
        }
    }
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &PathBuf) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde defaults cannot enforce.
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.catalog.prefix.starts_with('/') || self.catalog.prefix.ends_with('/') {
            return Err(crate::error::AppError::Config(format!(
                "Catalog prefix must start with '/' and not end with '/': {}",
                self.catalog.prefix
            )));
        }
        if self.catalog.page_size == 0 {
            return Err(crate::error::AppError::Config(
                "Catalog page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Find config file in default locations.
    pub fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            PathBuf::from("config.toml"),
            PathBuf::from("calibre-opds.toml"),
            dirs::config_dir()
                .map(|p| p.join("calibre-opds").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/calibre-opds/config.toml"),
        ];

        candidates.into_iter().find(|p| p.exists())
    }

    /// Generate default config file content.
    pub fn generate_default() -> String {
        r#"# calibre-opds configuration

[server]
bind = "0.0.0.0:8080"
title = "Calibre OPDS Catalog"

[library]
# Directory containing the Calibre metadata.db and book folders
path = "/books"

[catalog]
# URL prefix for all catalog routes
prefix = "/opds"
# Entries per feed page
page_size = 30
# "By Newest" direction: "ascending" or "descending" by modification time
newest_order = "ascending"
"#
        .to_string()
    }
}

/// Book file formats with a known MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookFormat {
    /// EPUB format (Electronic Publication).
    Epub,
    /// PDF format (Portable Document Format).
    Pdf,
    /// MOBI format (Mobipocket eBook).
    Mobi,
    /// FB2 format (FictionBook).
    Fb2,
    /// DjVu format.
    Djvu,
    /// AZW3 format (Kindle).
    Azw3,
    /// AZW format (Kindle).
    Azw,
    /// CBZ format (Comic Book ZIP archive).
    Cbz,
    /// CBR format (Comic Book RAR archive).
    Cbr,
    /// Plain text format.
    Txt,
    /// RTF format (Rich Text Format).
    Rtf,
}

impl BookFormat {
    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            BookFormat::Epub => "application/epub+zip",
            BookFormat::Pdf => "application/pdf",
            BookFormat::Mobi => "application/x-mobipocket-ebook",
            BookFormat::Fb2 => "application/x-fictionbook+xml",
            BookFormat::Djvu => "image/vnd.djvu",
            BookFormat::Azw3 | BookFormat::Azw => "application/vnd.amazon.ebook",
            BookFormat::Cbz => "application/x-cbz",
            BookFormat::Cbr => "application/x-cbr",
            BookFormat::Txt => "text/plain; charset=utf-8",
            BookFormat::Rtf => "application/rtf",
        }
    }

    /// Try to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "epub" => Some(BookFormat::Epub),
            "pdf" => Some(BookFormat::Pdf),
            "mobi" => Some(BookFormat::Mobi),
            "fb2" => Some(BookFormat::Fb2),
            "djvu" => Some(BookFormat::Djvu),
            "azw3" => Some(BookFormat::Azw3),
            "azw" => Some(BookFormat::Azw),
            "cbz" => Some(BookFormat::Cbz),
            "cbr" => Some(BookFormat::Cbr),
            "txt" => Some(BookFormat::Txt),
            "rtf" => Some(BookFormat::Rtf),
            _ => None,
        }
    }

    /// MIME type for an arbitrary extension, falling back to octet-stream.
    pub fn mime_for_extension(ext: &str) -> &'static str {
        Self::from_extension(ext)
            .map(|f| f.mime_type())
            .unwrap_or("application/octet-stream")
    }
}
