//! In-memory catalog source for tests and offline demos.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{CatalogSource, check_request};
use crate::{FetchError, FetchedPage, INSCRIPTION_PLACEHOLDER, Record};

/// First id handed out by [`MockSource`]; record `n` (0-based) gets `ID_BASE + n`.
pub const ID_BASE: u64 = 1000;

/// Build the record a [`MockSource`] serves at 0-based catalog position `n`.
pub fn mock_record(n: u64) -> Record {
    Record {
        id: ID_BASE + n,
        title: format!("Artwork {n}"),
        place_of_origin: Some("Chicago".to_string()),
        artist_display: Some(format!("Artist {}", n % 7)),
        inscriptions: INSCRIPTION_PLACEHOLDER.to_string(),
        date_start: Some(1900 + (n % 100) as i32),
        date_end: Some(1901 + (n % 100) as i32),
    }
}

/// A hand-rolled [`CatalogSource`] serving a synthetic catalog of `total` records.
///
/// Supports:
/// - Failing specific pages with a chosen error.
/// - Overriding the records of a page (e.g. to inject duplicate ids).
/// - Optional per-call latency.
/// - Call counting and a log of requested pages.
pub struct MockSource {
    total: u64,
    failing: Mutex<HashMap<u32, FetchError>>,
    overrides: HashMap<u32, Vec<Record>>,
    delay: Option<Duration>,
    call_count: AtomicUsize,
    requested: Mutex<Vec<u32>>,
}

impl MockSource {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            failing: Mutex::new(HashMap::new()),
            overrides: HashMap::new(),
            delay: None,
            call_count: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Make every request for `page` fail with `error`.
    pub fn failing_page(self, page: u32, error: FetchError) -> Self {
        self.set_failing(page, error);
        self
    }

    /// Toggle failure of `page` on an existing source.
    pub fn set_failing(&self, page: u32, error: FetchError) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(page, error);
        }
    }

    /// Stop failing `page`.
    pub fn heal(&self, page: u32) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.remove(&page);
        }
    }

    /// Serve `records` for `page` instead of the synthetic slice.
    pub fn with_page(mut self, page: u32, records: Vec<Record>) -> Self {
        self.overrides.insert(page, records);
        self
    }

    /// Set simulated network latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `fetch_page()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Pages requested so far, in call order.
    pub fn requested_pages(&self) -> Vec<u32> {
        self.requested
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Distinct pages requested so far.
    pub fn distinct_pages(&self) -> HashSet<u32> {
        self.requested_pages().into_iter().collect()
    }

    fn slice(&self, page: u32, page_size: usize) -> Vec<Record> {
        if let Some(records) = self.overrides.get(&page) {
            return records.clone();
        }
        let start = u64::from(page - 1) * page_size as u64;
        let end = (start + page_size as u64).min(self.total);
        (start..end).map(mock_record).collect()
    }
}

impl CatalogSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch_page<'a>(
        &'a self,
        page: u32,
        page_size: usize,
    ) -> Pin<Box<dyn Future<Output = Result<FetchedPage, FetchError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(page);
        }
        let failure = self
            .failing
            .lock()
            .ok()
            .and_then(|f| f.get(&page).cloned());
        let delay = self.delay;

        Box::pin(async move {
            check_request(page, page_size)?;
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            if let Some(err) = failure {
                return Err(err);
            }
            Ok(FetchedPage {
                records: self.slice(page, page_size),
                total: self.total,
            })
        })
    }
}
