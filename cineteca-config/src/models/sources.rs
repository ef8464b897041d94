use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub site: FileSiteConfig,
    #[serde(default)]
    pub sitemap: FileSitemapConfig,
    #[serde(default)]
    pub admin: FileAdminConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_file: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileSiteConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileSitemapConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_keep: Option<usize>,
    /// Humantime duration string, e.g. `"6h"` or `"30m"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAdminConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_url_file: Option<PathBuf>,
    pub database_host: Option<String>,
    pub database_port: Option<u16>,
    pub database_user: Option<String>,
    pub database_name: Option<String>,
    pub database_password: Option<String>,
    pub database_password_file: Option<PathBuf>,
    pub site_base_url: Option<String>,
    pub public_dir: Option<PathBuf>,
    pub backup_keep: Option<usize>,
    pub generation_interval: Option<String>,
    pub fetch_timeout: Option<String>,
    pub admin_token: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        let mut env_config = Self::default();

        env_config.config_path =
            std::env::var("CINETECA_CONFIG").ok().map(PathBuf::from);
        env_config.server_host = std::env::var("SERVER_HOST").ok();
        env_config.server_port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|s| s.parse().ok());
        env_config.database_url = std::env::var("DATABASE_URL").ok();
        env_config.database_url_file =
            std::env::var("DATABASE_URL_FILE").ok().map(PathBuf::from);
        env_config.database_host = std::env::var("DATABASE_HOST").ok();
        env_config.database_port = std::env::var("DATABASE_PORT")
            .ok()
            .and_then(|s| s.parse().ok());
        env_config.database_user = std::env::var("DATABASE_USER").ok();
        env_config.database_name = std::env::var("DATABASE_NAME").ok();
        env_config.database_password = std::env::var("DATABASE_PASSWORD").ok();
        env_config.database_password_file =
            std::env::var("DATABASE_PASSWORD_FILE")
                .ok()
                .map(PathBuf::from);
        env_config.site_base_url = std::env::var("SITE_BASE_URL").ok();
        env_config.public_dir =
            std::env::var("PUBLIC_DIR").ok().map(PathBuf::from);
        env_config.backup_keep = std::env::var("SITEMAP_BACKUP_KEEP")
            .ok()
            .and_then(|s| s.parse().ok());
        env_config.generation_interval =
            std::env::var("SITEMAP_INTERVAL").ok();
        env_config.fetch_timeout = std::env::var("SITEMAP_FETCH_TIMEOUT").ok();
        env_config.admin_token = std::env::var("ADMIN_TOKEN").ok();

        env_config
    }
}
