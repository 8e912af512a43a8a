//! Parallel fetching utilities for paginated API requests.
//!
//! Fans out a fixed set of page requests and joins them back in request
//! order, regardless of which page finishes first.

use std::future::Future;
use std::pin::Pin;

use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;

use crate::error::Result;

/// Type alias for boxed futures used in parallel fetching
type PageFuture<T> = Pin<Box<dyn Future<Output = (usize, Result<Vec<T>>)> + Send>>;

/// Fetch all pages in parallel and concatenate them in page order.
///
/// At most `max_concurrent` requests are outstanding at a time. The first
/// failing page aborts the whole fetch; pages still in flight are dropped.
///
/// # Arguments
///
/// * `pages` - Page descriptors, in the order their items should appear
/// * `fetch_page` - Async function that fetches a single page
/// * `max_concurrent` - Maximum number of concurrent requests
///
/// # Example
///
/// ```ignore
/// let tokens = fetch_pages_ordered(
///     catalog_pages(5000, 2),
///     move |page| {
///         let api = api.clone();
///         async move { api.list_tokens(page).await }
///     },
///     2,
/// ).await?;
/// ```
pub async fn fetch_pages_ordered<P, T, F, Fut>(
    pages: Vec<P>,
    fetch_page: F,
    max_concurrent: usize,
) -> Result<Vec<T>>
where
    P: Send + 'static,
    T: Send + 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    if pages.is_empty() {
        return Ok(Vec::new());
    }

    let total = pages.len();
    let max_concurrent = max_concurrent.max(1);
    debug!(
        "Fetching {} pages with max {} concurrent",
        total, max_concurrent
    );

    let mut slots: Vec<Option<Vec<T>>> = (0..total).map(|_| None).collect();
    let mut futures: FuturesUnordered<PageFuture<T>> = FuturesUnordered::new();
    let mut pending_pages = pages.into_iter().enumerate();

    // Helper to create a boxed future tagged with its slot
    let make_future = |index: usize, page: P, f: &F| -> PageFuture<T> {
        let fut = f(page);
        Box::pin(async move {
            let result = fut.await;
            (index, result)
        })
    };

    // Seed initial batch up to max_concurrent
    for (index, page) in pending_pages.by_ref().take(max_concurrent) {
        debug!("Spawning initial request for page {}", index + 1);
        futures.push(make_future(index, page, &fetch_page));
    }

    // Collect results and keep the window full
    while let Some((index, result)) = futures.next().await {
        let items = result?;
        debug!("Page {} returned {} items", index + 1, items.len());
        slots[index] = Some(items);

        if let Some((next_index, next_page)) = pending_pages.next() {
            debug!("Spawning request for page {}", next_index + 1);
            futures.push(make_future(next_index, next_page, &fetch_page));
        }
    }

    let all_items: Vec<T> = slots.into_iter().flatten().flatten().collect();
    debug!("Fetched {} total items", all_items.len());
    Ok(all_items)
}
