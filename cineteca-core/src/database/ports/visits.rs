use async_trait::async_trait;

use cineteca_model::TrackedPage;

use crate::error::Result;

/// Write surface owned by the page-serving collaborator: one row per page
/// ever served, created on first generation and bumped on every visit.
///
/// `(page_type, slug)` uniqueness is expected but not enforced at the
/// store level; concurrent first visits can insert twice. The sitemap
/// pipeline detects and reports that anomaly rather than preventing it.
#[async_trait]
pub trait PageVisitStore: Send + Sync {
    /// Insert-on-first-generation, increment-on-visit.
    async fn record_visit(
        &self,
        page_type: &str,
        slug: &str,
    ) -> Result<TrackedPage>;

    async fn get(
        &self,
        page_type: &str,
        slug: &str,
    ) -> Result<Option<TrackedPage>>;
}
