use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tracing::warn;

use cineteca_model::PageEntry;

use crate::error::Result;

/// Window size for bulk reads. The backing query engine caps row counts
/// per request, so the accessor pages through the table in fixed windows
/// of this size.
pub const BATCH_SIZE: i64 = 1000;

/// Read-only port over the `generated_pages` table. This subsystem never
/// mutates visit counters; the page-serving collaborator owns those writes
/// (see [`super::visits::PageVisitStore`]).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TrackedPageStore: Send + Sync {
    /// Exact count of tracked records. There is no fallback: a run cannot
    /// proceed without its denominator.
    async fn count_all(&self) -> Result<i64>;

    /// One fixed-window read in ascending id order.
    async fn fetch_batch(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PageEntry>>;
}

/// Retrieve the complete tracked-page set in strictly increasing offset
/// order, `total` acting as the scan bound.
///
/// A failed window is logged and skipped rather than aborting the scan:
/// partial sitemap data beats total failure, and the shortfall surfaces to
/// operators as `records scanned < total`. A short successful batch ends
/// the scan early.
pub async fn fetch_all_pages(
    store: &dyn TrackedPageStore,
    total: i64,
) -> Vec<PageEntry> {
    let mut pages = Vec::with_capacity(total.max(0) as usize);
    let mut offset = 0i64;

    while offset < total {
        match store.fetch_batch(offset, BATCH_SIZE).await {
            Ok(batch) => {
                let fetched = batch.len() as i64;
                pages.extend(batch);
                if fetched < BATCH_SIZE {
                    break;
                }
            }
            Err(err) => {
                warn!(offset, error = %err, "batch read failed, skipping window");
            }
        }
        offset += BATCH_SIZE;
    }

    pages
}
