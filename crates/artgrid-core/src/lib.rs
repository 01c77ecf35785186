use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod bulk;
pub mod cache;
pub mod config_file;
pub mod controller;
pub mod selection;
pub mod source;

// Re-export for convenience
pub use bulk::{BulkPlan, BulkReport, parse_bulk_count, select_first};
pub use cache::{PageCache, PageCaches};
pub use controller::{FetchCommand, Notice, RequestToken, TableController, TableMessage, ViewState};
pub use selection::SelectionSet;
pub use source::{CatalogSource, artic::ArticClient};

/// Placeholder shown when the catalog has no inscription text for an artwork.
pub const INSCRIPTION_PLACEHOLDER: &str = "-";

/// Default API root of the Art Institute of Chicago public API.
pub const DEFAULT_BASE_URL: &str = "https://api.artic.edu/api/v1";

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// A single artwork from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub title: String,
    pub place_of_origin: Option<String>,
    pub artist_display: Option<String>,
    /// Never empty: [`INSCRIPTION_PLACEHOLDER`] when the source has none.
    pub inscriptions: String,
    pub date_start: Option<i32>,
    pub date_end: Option<i32>,
}

/// An ordered slice of the catalog retrieved in one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page index.
    pub index: u32,
    pub size: usize,
    pub records: Vec<Record>,
}

impl Page {
    pub fn new(index: u32, size: usize, records: Vec<Record>) -> Self {
        Self {
            index,
            size,
            records,
        }
    }

    /// Placeholder shown before the first page arrives.
    pub fn empty(size: usize) -> Self {
        Self::new(1, size, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Normalized response of one [`CatalogSource::fetch_page`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub records: Vec<Record>,
    /// Total number of records in the catalog, as reported by the server.
    pub total: u64,
}

/// Failure of the remote fetch adapter.
///
/// Cloneable so it can travel inside completion messages; the underlying
/// transport error is kept as text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("invalid page request (page {page}, page size {page_size})")]
    InvalidRequest { page: u32, page_size: usize },
    #[error("request timed out")]
    Timeout,
    #[error("HTTP request error: {0}")]
    Http(String),
    #[error("server returned HTTP {0}")]
    Status(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

/// Rejected bulk-select input. Raised before any fetch is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a number greater than or equal to 1")]
    Empty,
    #[error("Please enter a number greater than or equal to 1")]
    NotANumber(String),
    #[error("Please enter a number greater than or equal to 1")]
    BelowMinimum,
}

/// Resolved runtime configuration (config file merged over defaults).
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub timeout_secs: u64,
    pub page_size: usize,
    /// Page sizes offered by the paginator, in cycling order.
    pub page_size_options: Vec<usize>,
    /// Upper bound on concurrent page fetches during a bulk select.
    pub max_concurrent_fetches: usize,
    pub theme: String,
    pub tick_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: vec![12, 25, 50, 100],
            max_concurrent_fetches: 8,
            theme: "hacker".to_string(),
            tick_ms: 100,
        }
    }
}

impl Config {
    /// Apply the values present in a config file over the defaults.
    pub fn from_file(file: &config_file::ConfigFile) -> Self {
        let mut config = Config::default();
        if let Some(api) = &file.api {
            if let Some(url) = &api.base_url {
                config.base_url = url.trim_end_matches('/').to_string();
            }
            if let Some(secs) = api.timeout_secs {
                config.timeout_secs = secs.max(1);
            }
            if let Some(n) = api.max_concurrent_fetches {
                config.max_concurrent_fetches = n.max(1);
            }
        }
        if let Some(table) = &file.table {
            if let Some(options) = &table.page_size_options {
                let options: Vec<usize> = options.iter().copied().filter(|&s| s > 0).collect();
                if !options.is_empty() {
                    config.page_size_options = options;
                }
            }
            if let Some(size) = table.page_size.filter(|&s| s > 0) {
                config.page_size = size;
            }
        }
        if let Some(display) = &file.display {
            if let Some(theme) = &display.theme {
                config.theme = theme.clone();
            }
            if let Some(ms) = display.tick_ms {
                config.tick_ms = ms.max(10);
            }
        }
        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
