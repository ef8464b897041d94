use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use cineteca_model::SitemapStats;

use crate::error::Result;

/// Single-row upsert port for the `sitemap_stats` record (id = 1).
///
/// Single-writer by contract: only the generation pipeline calls the two
/// write methods; dashboards read.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SitemapStatsStore: Send + Sync {
    async fn read(&self) -> Result<Option<SitemapStats>>;

    /// Upsert the row with fresh counts and `is_error = false`.
    async fn record_success(&self, stats: SitemapStats) -> Result<()>;

    /// Upsert the failure flag pair. Count fields are left untouched so
    /// they keep reflecting the last successful run.
    async fn record_failure(
        &self,
        message: &str,
        at: DateTime<Utc>,
    ) -> Result<()>;
}
