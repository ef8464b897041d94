use std::{fs, path::PathBuf, time::Duration};

use thiserror::Error;
use url::Url;

use crate::db_url::resolve_database_url;
use crate::models::{
    AdminConfig, Config, ConfigMetadata, DatabaseConfig, ServerConfig,
    SiteConfig, SitemapConfig,
    sources::{EnvConfig, FileConfig},
};

const DEFAULT_CONFIG_LOCATIONS: &[&str] =
    &["cineteca.toml", "config/cineteca.toml"];

const DEFAULT_BASE_URL: &str = "https://cineteca.example";
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_BACKUP_KEEP: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("config file not found at {path}")]
    MissingConfig { path: PathBuf },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to load env file")]
    EnvFile(#[from] dotenvy::Error),

    #[error("invalid database URL")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },

    #[error("invalid database username `{username}`")]
    InvalidDatabaseUsername { username: String },

    #[error("invalid database password")]
    InvalidDatabasePassword,

    #[error("failed to read secret file {path}")]
    SecretFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid site base URL `{value}`")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid duration `{value}` for {field}")]
    InvalidDuration {
        field: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("failed to prepare directories")]
    Filesystem {
        #[source]
        source: anyhow::Error,
    },
}

/// Non-fatal findings gathered while composing the configuration.
#[derive(Debug, Default)]
pub struct ConfigWarnings {
    entries: Vec<String>,
}

impl ConfigWarnings {
    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
    }

    pub fn push_with_hint(
        &mut self,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.entries
            .push(format!("{} ({})", message.into(), hint.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let env_config = EnvConfig::gather();
        let (file_config, config_path, config_present) =
            self.load_file_config(&env_config)?;

        self.compose_config(
            file_config,
            env_config,
            config_path,
            env_file_loaded,
            config_present,
        )
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>, bool), ConfigLoadError>
    {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env_config.config_path.clone());

        let (path, is_explicit) = match explicit {
            Some(path) => (Some(path), true),
            None => (
                DEFAULT_CONFIG_LOCATIONS
                    .iter()
                    .map(PathBuf::from)
                    .find(|candidate| candidate.exists()),
                false,
            ),
        };

        let Some(path) = path else {
            return Ok((None, None, false));
        };

        if !path.exists() {
            if is_explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None, false));
        }

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig = toml::from_str(&contents)
            .map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path), true))
    }

    fn compose_config(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
        config_path: Option<PathBuf>,
        env_file_loaded: bool,
        config_present: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if !config_present {
            warnings.push_with_hint(
                "No cineteca.toml detected; falling back to environment variables",
                "create cineteca.toml or set CINETECA_CONFIG",
            );
        }

        let file = file_config.unwrap_or_default();

        let server = ServerConfig {
            host: env
                .server_host
                .clone()
                .or(file.server.host.clone())
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env.server_port.or(file.server.port).unwrap_or(3000),
        };

        let resolved_url = resolve_database_url(&env, &file.database)?;
        let database_url_source = resolved_url.as_ref().map(|(_, source)| *source);
        let database = DatabaseConfig {
            primary_url: resolved_url.map(|(url, _)| url),
        };

        let base_url = env
            .site_base_url
            .clone()
            .or(file.site.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = normalize_base_url(&base_url)?;

        let site = SiteConfig {
            base_url,
            public_dir: env
                .public_dir
                .clone()
                .or(file.site.public_dir.clone())
                .unwrap_or_else(|| PathBuf::from("./public")),
        };

        let sitemap = SitemapConfig {
            backup_keep: env
                .backup_keep
                .or(file.sitemap.backup_keep)
                .unwrap_or(DEFAULT_BACKUP_KEEP),
            generation_interval: parse_duration_opt(
                "sitemap.generation_interval",
                env.generation_interval
                    .as_deref()
                    .or(file.sitemap.generation_interval.as_deref()),
            )?,
            fetch_timeout: parse_duration_opt(
                "sitemap.fetch_timeout",
                env.fetch_timeout
                    .as_deref()
                    .or(file.sitemap.fetch_timeout.as_deref()),
            )?
            .unwrap_or(DEFAULT_FETCH_TIMEOUT),
        };

        let admin = AdminConfig {
            token: env
                .admin_token
                .clone()
                .or(file.admin.token.clone())
                .filter(|token| !token.trim().is_empty()),
        };
        if admin.token.is_none() {
            warnings.push_with_hint(
                "No admin token configured; admin routes will refuse requests",
                "set ADMIN_TOKEN or [admin] token",
            );
        }

        let config = Config {
            server,
            database,
            site,
            sitemap,
            admin,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded,
                database_url_source,
            },
        };

        config
            .ensure_directories()
            .map_err(|source| ConfigLoadError::Filesystem { source })?;

        Ok(ConfigLoad { config, warnings })
    }
}

/// Validate and strip the trailing slash so URL assembly can always use
/// `{base_url}{path}`.
fn normalize_base_url(raw: &str) -> Result<String, ConfigLoadError> {
    let trimmed = raw.trim();
    Url::parse(trimmed).map_err(|source| ConfigLoadError::InvalidBaseUrl {
        value: trimmed.to_string(),
        source,
    })?;
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn parse_duration_opt(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<Duration>, ConfigLoadError> {
    raw.map(|value| {
        humantime::parse_duration(value.trim()).map_err(|source| {
            ConfigLoadError::InvalidDuration {
                field,
                value: value.to_string(),
                source,
            }
        })
    })
    .transpose()
}

impl ConfigLoader {
    /// Compose directly from already-gathered sources, bypassing the
    /// filesystem and process environment. `load` is the production entry
    /// point; this one exists for tooling and tests.
    pub fn compose_from_sources(
        file_config: Option<FileConfig>,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        Self::default().compose_config(file_config, env, None, false, true)
    }
}
