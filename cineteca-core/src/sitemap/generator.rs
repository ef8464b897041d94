//! The generation run: count, scan, partition, render, publish, record.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use cineteca_model::SitemapStats;

use crate::database::{
    RunLock, SitemapStatsStore, TrackedPageStore, fetch_all_pages,
};
use crate::error::{Result, SitemapError};

use super::builder::{UrlCounts, build_sitemap};
use super::publish::ArtifactStore;
use super::reconcile::PartitionedPages;

/// Outcome of one successful generation run, shaped for the JSON trigger
/// surface.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub record_count: i64,
    pub url_count: u64,
    pub film_count: u64,
    pub serie_count: u64,
    pub person_count: u64,
    pub public_url: String,
}

/// Orchestrates the sequential pipeline. One instance per process; the
/// run lock makes concurrent invocations (scheduler racing an operator
/// trigger, or two replicas) mutually exclusive.
pub struct SitemapGenerator {
    pages: Arc<dyn TrackedPageStore>,
    stats: Arc<dyn SitemapStatsStore>,
    artifacts: Arc<dyn ArtifactStore>,
    lock: Arc<dyn RunLock>,
    base_url: String,
    backup_keep: usize,
}

impl SitemapGenerator {
    pub fn new(
        pages: Arc<dyn TrackedPageStore>,
        stats: Arc<dyn SitemapStatsStore>,
        artifacts: Arc<dyn ArtifactStore>,
        lock: Arc<dyn RunLock>,
        base_url: impl Into<String>,
        backup_keep: usize,
    ) -> Self {
        Self {
            pages,
            stats,
            artifacts,
            lock,
            base_url: base_url.into(),
            backup_keep,
        }
    }

    /// Run the pipeline once. Only two failures are fatal by design: an
    /// unavailable record count and a failed write of the canonical
    /// artifact. Everything else degrades, and every failure ends up in
    /// the stats row as `is_error = true` with counts carried forward.
    ///
    /// A run refused because another one holds the lock does NOT touch the
    /// stats row; the in-flight run owns it.
    pub async fn run(&self) -> Result<RunSummary> {
        if !self.lock.try_acquire().await? {
            info!("sitemap generation already in progress, refusing to start");
            return Err(SitemapError::RunInProgress);
        }

        let outcome = self.run_locked().await;

        if let Err(err) = self.lock.release().await {
            warn!(error = %err, "failed to release run lock");
        }

        match outcome {
            Ok(summary) => Ok(summary),
            Err(err) => {
                self.record_failure_best_effort(&err).await;
                Err(err)
            }
        }
    }

    async fn run_locked(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let generated_at = Utc::now();

        let total = self.pages.count_all().await?;
        let entries = fetch_all_pages(self.pages.as_ref(), total).await;
        let scanned = entries.len() as i64;
        if scanned < total {
            warn!(
                total,
                scanned,
                "tracked page scan is incomplete; continuing with partial data"
            );
        }

        let partition = PartitionedPages::partition(entries);
        if partition.missing_type > 0 {
            warn!(
                count = partition.missing_type,
                "tracked pages without a page_type were left out"
            );
        }

        let doc = build_sitemap(&self.base_url, &partition, generated_at);

        match self.artifacts.backup_current(generated_at).await {
            Ok(Some(path)) => {
                info!(backup = %path.display(), "previous sitemap backed up");
            }
            Ok(None) => {}
            Err(err) => {
                warn!(
                    error = %err,
                    "failed to back up previous sitemap; overwriting anyway"
                );
            }
        }

        self.artifacts.write(&doc.xml).await?;

        if let Err(err) = self.artifacts.prune_backups(self.backup_keep).await
        {
            warn!(error = %err, "failed to prune old sitemap backups");
        }

        let generation_ms = started.elapsed().as_millis() as i64;
        let stats = counts_to_stats(&doc.counts, generated_at, generation_ms);
        if let Err(err) = self.stats.record_success(stats).await {
            warn!(
                error = %err,
                "sitemap published but the stats upsert failed"
            );
        }

        let content_urls = doc.counts.total - doc.counts.static_routes;
        info!(
            total,
            scanned,
            urls = doc.counts.total,
            excluded = partition.bucketed_len() as u64 - content_urls,
            missing_type = partition.missing_type,
            generation_ms,
            "sitemap generation complete"
        );

        Ok(RunSummary {
            success: true,
            timestamp: generated_at,
            record_count: total,
            url_count: doc.counts.total,
            film_count: doc.counts.films,
            serie_count: doc.counts.series,
            person_count: doc.counts.person_family_total(),
            public_url: format!("{}/sitemap.xml", self.base_url),
        })
    }

    /// Telemetry of last resort: a failure to record the failure is only
    /// logged, never re-thrown.
    async fn record_failure_best_effort(&self, err: &SitemapError) {
        if let Err(stats_err) = self
            .stats
            .record_failure(&err.to_string(), Utc::now())
            .await
        {
            error!(
                error = %stats_err,
                run_error = %err,
                "failed to record generation failure in the stats row"
            );
        }
    }
}

fn counts_to_stats(
    counts: &UrlCounts,
    at: DateTime<Utc>,
    generation_ms: i64,
) -> SitemapStats {
    let mut stats = SitemapStats {
        last_generation: at,
        urls_count: counts.total as i64,
        film_count: counts.films as i64,
        serie_count: counts.series as i64,
        attore_count: 0,
        regista_count: 0,
        cast_count: 0,
        crew_count: 0,
        person_count: 0,
        other_count: 0,
        generation_ms,
        is_error: false,
        error_message: None,
    };

    for (key, count) in &counts.people {
        let count = *count as i64;
        match key.as_str() {
            "attore" => stats.attore_count += count,
            "regista" => stats.regista_count += count,
            "cast" => stats.cast_count += count,
            "crew" => stats.crew_count += count,
            "person" => stats.person_count += count,
            _ => stats.other_count += count,
        }
    }

    stats
}
