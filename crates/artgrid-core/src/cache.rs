//! Session-scoped page cache.
//!
//! Pages are write-once: the first page stored under an index stays there for
//! the rest of the session and is never evicted. A page index only means
//! something together with its page size, so [`PageCaches`] keeps one
//! [`PageCache`] per page size.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{FetchedPage, Page};

/// Pages of one page size, keyed by 1-based page index.
#[derive(Debug)]
pub struct PageCache {
    page_size: usize,
    pages: HashMap<u32, Page>,
    /// Most recent catalog total reported alongside a stored page.
    total: Option<u64>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PageCache {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            pages: HashMap::new(),
            total: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Look up a page. Counts towards [`hits`](Self::hits) / [`misses`](Self::misses).
    pub fn get(&self, index: u32) -> Option<&Page> {
        let page = self.pages.get(&index);
        if page.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(page = index, page_size = self.page_size, "page cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        page
    }

    /// Presence check that does not touch the hit/miss counters.
    pub fn contains(&self, index: u32) -> bool {
        self.pages.contains_key(&index)
    }

    /// Store a page. Returns `false` (and keeps the existing page) when the
    /// index is already occupied.
    pub fn put(&mut self, index: u32, page: Page) -> bool {
        debug_assert_eq!(page.size, self.page_size);
        if self.pages.contains_key(&index) {
            tracing::trace!(page = index, "page already cached, keeping first copy");
            return false;
        }
        self.pages.insert(index, page);
        true
    }

    /// Store a fetch response and remember the total it reported.
    pub fn put_fetched(&mut self, index: u32, fetched: FetchedPage) -> bool {
        self.total = Some(fetched.total);
        let page = Page::new(index, self.page_size, fetched.records);
        self.put(index, page)
    }

    /// Catalog total reported by the most recent stored fetch, if any.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

/// One [`PageCache`] per page size.
#[derive(Debug, Default)]
pub struct PageCaches {
    by_size: BTreeMap<usize, PageCache>,
}

impl PageCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache for `page_size`, created empty on first use.
    pub fn for_size(&mut self, page_size: usize) -> &mut PageCache {
        self.by_size
            .entry(page_size)
            .or_insert_with(|| PageCache::new(page_size))
    }

    pub fn get(&self, page_size: usize) -> Option<&PageCache> {
        self.by_size.get(&page_size)
    }

    /// Total number of cached pages across all page sizes.
    pub fn page_count(&self) -> usize {
        self.by_size.values().map(PageCache::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::mock::mock_record;

    fn page(index: u32, size: usize) -> Page {
        let start = u64::from(index - 1) * size as u64;
        Page::new(index, size, (start..start + size as u64).map(mock_record).collect())
    }

    #[test]
    fn miss_on_empty() {
        let cache = PageCache::new(12);
        assert!(cache.get(1).is_none());
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn hit_returns_exact_page() {
        let mut cache = PageCache::new(12);
        let stored = page(3, 12);
        assert!(cache.put(3, stored.clone()));
        assert_eq!(cache.get(3), Some(&stored));
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn put_is_write_once() {
        let mut cache = PageCache::new(2);
        let first = Page::new(1, 2, vec![mock_record(0), mock_record(1)]);
        let second = Page::new(1, 2, vec![mock_record(8), mock_record(9)]);
        assert!(cache.put(1, first.clone()));
        assert!(!cache.put(1, second));
        assert_eq!(cache.get(1), Some(&first));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_fetched_records_total() {
        let mut cache = PageCache::new(12);
        assert_eq!(cache.total(), None);
        cache.put_fetched(
            1,
            FetchedPage {
                records: vec![mock_record(0)],
                total: 1,
            },
        );
        assert_eq!(cache.total(), Some(1));
        assert_eq!(cache.get(1).unwrap().index, 1);
    }

    #[test]
    fn contains_does_not_count() {
        let mut cache = PageCache::new(12);
        cache.put(1, page(1, 12));
        assert!(cache.contains(1));
        assert!(!cache.contains(2));
        assert_eq!(cache.hits() + cache.misses(), 0);
    }

    #[test]
    fn caches_are_separate_per_page_size() {
        let mut caches = PageCaches::new();
        caches.for_size(12).put(1, page(1, 12));
        assert!(caches.for_size(25).get(1).is_none());
        assert_eq!(caches.get(12).unwrap().len(), 1);
        assert_eq!(caches.page_count(), 1);
    }
}
