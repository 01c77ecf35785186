//! "Select the first N rows" across pages that may not be loaded yet.
//!
//! The operation is split in two so it can run either inline
//! ([`select_first`]) or from an event loop that owns the cache and hands
//! fetches to a background task ([`BulkPlan`] + [`fetch_pages`]):
//!
//! 1. plan which of pages `1..=ceil(N / page_size)` are missing from the cache,
//! 2. fetch the missing pages concurrently, failing fast on the first error,
//! 3. store them, re-plan, and once nothing is missing assemble pages in index
//!    order, truncate to N and de-duplicate by id.
//!
//! When the catalog total is known the page range is clamped to the pages that
//! exist. When it is not, page 1 is fetched alone first to learn it.

use futures_util::stream::{self, StreamExt, TryStreamExt};

use crate::cache::PageCache;
use crate::selection::SelectionSet;
use crate::source::CatalogSource;
use crate::{FetchError, FetchedPage, ValidationError};

/// Validate the text typed into the row-selector input.
pub fn parse_bulk_count(input: &str) -> Result<usize, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    let n: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))?;
    if n < 1 {
        return Err(ValidationError::BelowMinimum);
    }
    usize::try_from(n).map_err(|_| ValidationError::NotANumber(trimmed.to_string()))
}

/// Number of pages of `page_size` needed to cover `count` records.
pub fn pages_for(count: u64, page_size: usize) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(count.div_ceil(page_size as u64)).unwrap_or(u32::MAX)
}

/// Which pages a bulk select of `count` rows still has to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkPlan {
    pub count: usize,
    pub page_size: usize,
    /// Pages `1..=pages_needed` make up the result (after clamping to the total).
    pub pages_needed: u32,
    /// Pages in `1..=pages_needed` not yet cached, ascending.
    pub missing: Vec<u32>,
}

impl BulkPlan {
    pub fn new(count: usize, cache: &PageCache) -> Self {
        let page_size = cache.page_size();
        let mut pages_needed = pages_for(count as u64, page_size);

        match cache.total() {
            Some(total) => {
                pages_needed = pages_needed.min(pages_for(total, page_size));
            }
            None if pages_needed > 1 && !cache.contains(1) => {
                // Learn the total before fanning out.
                return Self {
                    count,
                    page_size,
                    pages_needed,
                    missing: vec![1],
                };
            }
            None => {}
        }

        let missing = (1..=pages_needed).filter(|p| !cache.contains(*p)).collect();
        Self {
            count,
            page_size,
            pages_needed,
            missing,
        }
    }

    /// Nothing left to fetch.
    pub fn is_ready(&self) -> bool {
        self.missing.is_empty()
    }

    /// Concatenate pages `1..=pages_needed` in index order, keep the first
    /// `count` records and de-duplicate by id (first occurrence wins).
    pub fn assemble(&self, cache: &PageCache) -> SelectionSet {
        let records = (1..=self.pages_needed)
            .filter_map(|p| cache.get(p))
            .flat_map(|page| page.records.iter().cloned())
            .take(self.count);
        SelectionSet::from_records(records)
    }
}

/// Fetch `pages` with at most `concurrency` requests in flight.
///
/// Fails with the first error; results are returned sorted by page index
/// regardless of completion order.
pub async fn fetch_pages(
    source: &dyn CatalogSource,
    pages: &[u32],
    page_size: usize,
    concurrency: usize,
) -> Result<Vec<(u32, FetchedPage)>, FetchError> {
    let mut fetched: Vec<(u32, FetchedPage)> = stream::iter(pages.iter().copied())
        .map(|page| async move {
            source
                .fetch_page(page, page_size)
                .await
                .map(|fetched| (page, fetched))
        })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;
    fetched.sort_by_key(|(page, _)| *page);
    Ok(fetched)
}

/// Write fetched pages into `cache`. Returns the indices that were new.
pub fn store_pages(cache: &mut PageCache, fetched: Vec<(u32, FetchedPage)>) -> Vec<u32> {
    let mut stored = Vec::with_capacity(fetched.len());
    for (page, data) in fetched {
        if cache.put_fetched(page, data) {
            stored.push(page);
        }
    }
    stored
}

/// Outcome of a successful bulk select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkReport {
    pub requested: usize,
    pub selected: usize,
    /// Pages fetched from the source during this call, ascending.
    pub fetched_pages: Vec<u32>,
    pub total: Option<u64>,
}

/// Replace `selection` with the first `count` records of the catalog.
///
/// On error nothing is committed to `selection`. Pages fetched before the
/// failure stay in the cache; they are valid data.
pub async fn select_first(
    source: &dyn CatalogSource,
    count: usize,
    cache: &mut PageCache,
    selection: &mut SelectionSet,
    concurrency: usize,
) -> Result<BulkReport, FetchError> {
    let mut fetched_pages = Vec::new();
    loop {
        let plan = BulkPlan::new(count, cache);
        if plan.is_ready() {
            let result = plan.assemble(cache);
            let report = BulkReport {
                requested: count,
                selected: result.len(),
                fetched_pages,
                total: cache.total(),
            };
            *selection = result;
            tracing::info!(
                source = source.name(),
                requested = count,
                selected = report.selected,
                fetched = report.fetched_pages.len(),
                "bulk select complete"
            );
            return Ok(report);
        }

        tracing::debug!(missing = ?plan.missing, page_size = plan.page_size, "fetching pages for bulk select");
        let fetched = match fetch_pages(source, &plan.missing, plan.page_size, concurrency).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(source = source.name(), requested = count, error = %e, "bulk select failed");
                return Err(e);
            }
        };
        let mut stored = store_pages(cache, fetched);
        fetched_pages.append(&mut stored);
        fetched_pages.sort_unstable();
    }
}
