//! Pagination helpers for the listings endpoint
//!
//! The listings endpoint is offset-based: `start` is 1-indexed and `limit`
//! caps the page at 5000 entries.

/// Maximum page size supported by the listings endpoint.
pub const MAX_PAGE_SIZE: usize = 5000;

/// Number of pages fetched for a full catalog refresh.
pub const CATALOG_PAGE_COUNT: usize = 2;

/// One offset-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-indexed offset of the first entry
    pub start: usize,
    /// Number of entries to return
    pub limit: usize,
}

impl PageRequest {
    /// Create a page request
    pub fn new(start: usize, limit: usize) -> Self {
        Self { start, limit }
    }

    /// Convert to query string parameters.
    ///
    /// Always requests USD quotes.
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("start", self.start.to_string()),
            ("limit", self.limit.to_string()),
            ("convert", "USD".to_string()),
        ]
    }
}

/// Page requests covering the first `page_count * page_size` entries.
///
/// # Example
/// ```ignore
/// let pages = catalog_pages(5000, 2);
/// assert_eq!(pages[1].start, 5001);
/// ```
pub fn catalog_pages(page_size: usize, page_count: usize) -> Vec<PageRequest> {
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    (0..page_count)
        .map(|i| PageRequest::new(i * page_size + 1, page_size))
        .collect()
}
