pub mod sources;

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fully composed runtime configuration. Built once by
/// [`ConfigLoader`](crate::ConfigLoader) and shared via `Arc`.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub site: SiteConfig,
    pub sitemap: SitemapConfig,
    pub admin: AdminConfig,
    pub metadata: ConfigMetadata,
}

impl Config {
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.site.public_dir)?;
        std::fs::create_dir_all(self.site.public_dir.join("sitemap-backups"))?;
        Ok(())
    }

    pub fn public_dir(&self) -> &Path {
        &self.site.public_dir
    }

    /// Absolute URL of the published sitemap.
    pub fn sitemap_url(&self) -> String {
        format!("{}/sitemap.xml", self.site.base_url)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub primary_url: Option<String>,
}

/// Site identity: where published URLs point and where artifacts land.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Base URL without a trailing slash, e.g. `https://cineteca.example`.
    pub base_url: String,
    pub public_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SitemapConfig {
    /// How many timestamped backups of the previous document to keep.
    pub backup_keep: usize,
    /// Interval for the scheduled generation job; `None` disables it.
    pub generation_interval: Option<Duration>,
    /// Timeout for the discrepancy-report fetch of the published sitemap.
    pub fetch_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Shared token gating the admin trigger/report routes. When unset,
    /// admin routes refuse every request.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
    /// Which provider in the resolution chain produced the database URL.
    pub database_url_source: Option<crate::db_url::DatabaseUrlSource>,
}
