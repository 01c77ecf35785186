use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;

use super::{CatalogSource, check_request};
use crate::{Config, FetchError, FetchedPage, INSCRIPTION_PLACEHOLDER, Record};

/// HTTP client for the Art Institute of Chicago `/artworks` listing.
pub struct ArticClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    data: Vec<ApiArtwork>,
    #[serde(default)]
    pagination: Option<ApiPagination>,
}

#[derive(Debug, Deserialize)]
struct ApiPagination {
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiArtwork {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    place_of_origin: Option<String>,
    #[serde(default)]
    artist_display: Option<String>,
    #[serde(default)]
    inscriptions: Option<String>,
    #[serde(default)]
    date_start: Option<i32>,
    #[serde(default)]
    date_end: Option<i32>,
}

impl From<ApiArtwork> for Record {
    fn from(item: ApiArtwork) -> Self {
        Record {
            id: item.id,
            title: item.title.unwrap_or_default(),
            place_of_origin: item.place_of_origin,
            artist_display: item.artist_display,
            inscriptions: item
                .inscriptions
                .unwrap_or_else(|| INSCRIPTION_PLACEHOLDER.to_string()),
            date_start: item.date_start,
            date_end: item.date_end,
        }
    }
}

/// Decode a listing body into a normalized page.
///
/// A missing `pagination.total` falls back to the number of records received.
pub(crate) fn parse_listing(body: &str) -> Result<FetchedPage, FetchError> {
    let response: ApiResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    let records: Vec<Record> = response.data.into_iter().map(Record::from).collect();
    let total = response
        .pagination
        .and_then(|p| p.total)
        .unwrap_or(records.len() as u64);
    Ok(FetchedPage { records, total })
}

impl ArticClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("artgrid/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn listing_url(&self, page: u32, page_size: usize) -> String {
        format!(
            "{}/artworks?page={}&limit={}",
            self.base_url, page, page_size
        )
    }
}

impl CatalogSource for ArticClient {
    fn name(&self) -> &str {
        "artic"
    }

    fn fetch_page<'a>(
        &'a self,
        page: u32,
        page_size: usize,
    ) -> Pin<Box<dyn Future<Output = Result<FetchedPage, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            check_request(page, page_size)?;
            let url = self.listing_url(page, page_size);
            tracing::debug!(%url, "fetching page");

            let resp = self
                .client
                .get(&url)
                .timeout(self.timeout)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            let body = resp.text().await?;
            let fetched = parse_listing(&body)?;
            tracing::debug!(
                page,
                page_size,
                records = fetched.records.len(),
                total = fetched.total,
                "page fetched"
            );
            Ok(fetched)
        })
    }
}
