use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use cineteca_config::Config;
use cineteca_core::database::{
    PageVisitStore, PgRunLock, PostgresPageVisitStore,
    PostgresSitemapStatsStore, PostgresTrackedPageStore, RunLock,
    SitemapStatsStore, TrackedPageStore,
};
use cineteca_core::sitemap::{ArtifactStore, FsArtifactStore, SitemapGenerator};

/// Shared handle wired through every route. Stores are held behind their
/// port traits so handlers and tests never depend on PostgreSQL directly.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<SitemapGenerator>,
    pub pages: Arc<dyn TrackedPageStore>,
    pub stats: Arc<dyn SitemapStatsStore>,
    pub visits: Arc<dyn PageVisitStore>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: PgPool, config: Arc<Config>) -> anyhow::Result<Self> {
        let pages: Arc<dyn TrackedPageStore> =
            Arc::new(PostgresTrackedPageStore::new(pool.clone()));
        let stats: Arc<dyn SitemapStatsStore> =
            Arc::new(PostgresSitemapStatsStore::new(pool.clone()));
        let visits: Arc<dyn PageVisitStore> =
            Arc::new(PostgresPageVisitStore::new(pool.clone()));
        let artifacts: Arc<dyn ArtifactStore> =
            Arc::new(FsArtifactStore::new(config.public_dir()));
        let lock: Arc<dyn RunLock> = Arc::new(PgRunLock::new(pool));

        let generator = Arc::new(SitemapGenerator::new(
            pages.clone(),
            stats.clone(),
            artifacts.clone(),
            lock,
            config.site.base_url.clone(),
            config.sitemap.backup_keep,
        ));

        let http = reqwest::Client::builder()
            .timeout(config.sitemap.fetch_timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            config,
            generator,
            pages,
            stats,
            visits,
            artifacts,
            http,
        })
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("base_url", &self.config.site.base_url)
            .finish()
    }
}
