//! Remote fetch adapter trait and implementations for loading catalog pages.

pub mod artic;
pub mod mock;

use std::future::Future;
use std::pin::Pin;

use crate::{FetchError, FetchedPage};

/// A paginated source of catalog records.
///
/// Implementations do not retry; callers decide what a failure means.
pub trait CatalogSource: Send + Sync {
    /// Short human-readable name used in logs (e.g., "artic").
    fn name(&self) -> &str;

    /// Fetch the 1-based `page` of `page_size` records.
    fn fetch_page<'a>(
        &'a self,
        page: u32,
        page_size: usize,
    ) -> Pin<Box<dyn Future<Output = Result<FetchedPage, FetchError>> + Send + 'a>>;
}

/// Reject page 0 and empty pages before any I/O happens.
pub(crate) fn check_request(page: u32, page_size: usize) -> Result<(), FetchError> {
    if page == 0 || page_size == 0 {
        return Err(FetchError::InvalidRequest { page, page_size });
    }
    Ok(())
}
