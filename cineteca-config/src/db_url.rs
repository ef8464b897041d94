use std::{fs::read_to_string, path::Path};

use url::Url;

use crate::loader::ConfigLoadError;
use crate::models::sources::{EnvConfig, FileDatabaseConfig};

/// Which provider in the resolution chain produced the effective
/// PostgreSQL connection URL. Logged at startup so operators can tell at
/// a glance where credentials came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseUrlSource {
    /// `DATABASE_URL` environment variable.
    Env,
    /// Secret file named by `DATABASE_URL_FILE`.
    SecretFile,
    /// `[database] url` in the config file, password merged separately.
    File,
    /// Assembled from `DATABASE_HOST` / `DATABASE_USER` / `DATABASE_NAME`
    /// style parts.
    Parts,
}

impl DatabaseUrlSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseUrlSource::Env => "environment",
            DatabaseUrlSource::SecretFile => "secret file",
            DatabaseUrlSource::File => "config file",
            DatabaseUrlSource::Parts => "environment parts",
        }
    }
}

/// Resolve the effective connection URL by walking an ordered provider
/// chain, stopping at the first provider that yields a value.
pub fn resolve_database_url(
    env: &EnvConfig,
    file_database: &FileDatabaseConfig,
) -> Result<Option<(String, DatabaseUrlSource)>, ConfigLoadError> {
    if let Some(url) = env
        .database_url
        .clone()
        .filter(|value| !value.trim().is_empty())
    {
        return Ok(Some((url, DatabaseUrlSource::Env)));
    }

    if let Some(path) = env.database_url_file.as_ref()
        && let Some(url) = read_secret_file(path)?
    {
        return Ok(Some((url, DatabaseUrlSource::SecretFile)));
    }

    if let Some(ref stored_url) = file_database.url {
        let trimmed = stored_url.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let mut parsed = Url::parse(trimmed)
            .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
        if parsed.password().is_none()
            && let Some(password) =
                resolve_database_password(env, file_database)?
        {
            parsed
                .set_password(Some(&password))
                .map_err(|_| ConfigLoadError::InvalidDatabasePassword)?;
        }
        return Ok(Some((parsed.to_string(), DatabaseUrlSource::File)));
    }

    let host = env
        .database_host
        .clone()
        .filter(|value| !value.trim().is_empty());
    let user = env
        .database_user
        .clone()
        .filter(|value| !value.trim().is_empty());
    let name = env
        .database_name
        .clone()
        .filter(|value| !value.trim().is_empty());

    if let (Some(host), Some(user), Some(name)) = (host, user, name) {
        let port = env.database_port.unwrap_or(5432);
        let mut url = Url::parse(&format!("postgresql://{host}:{port}/{name}"))
            .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
        url.set_username(&user).map_err(|_| {
            ConfigLoadError::InvalidDatabaseUsername {
                username: user.clone(),
            }
        })?;
        if let Some(password) = resolve_database_password(env, file_database)? {
            url.set_password(Some(&password))
                .map_err(|_| ConfigLoadError::InvalidDatabasePassword)?;
        }
        return Ok(Some((url.to_string(), DatabaseUrlSource::Parts)));
    }

    Ok(None)
}

fn resolve_database_password(
    env: &EnvConfig,
    file_database: &FileDatabaseConfig,
) -> Result<Option<String>, ConfigLoadError> {
    if let Some(password) = env
        .database_password
        .clone()
        .filter(|value| !value.trim().is_empty())
    {
        return Ok(Some(password));
    }

    for path in [
        env.database_password_file.as_ref(),
        file_database.password_file.as_ref(),
    ]
    .into_iter()
    .flatten()
    {
        if let Some(secret) = read_secret_file(path)?
            && !secret.is_empty()
        {
            return Ok(Some(secret));
        }
    }

    Ok(None)
}

pub fn read_secret_file(
    path: &Path,
) -> Result<Option<String>, ConfigLoadError> {
    let contents =
        read_to_string(path).map_err(|source| ConfigLoadError::SecretFileIo {
            path: path.to_path_buf(),
            source,
        })?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env_with_url(url: &str) -> EnvConfig {
        EnvConfig {
            database_url: Some(url.to_string()),
            ..EnvConfig::default()
        }
    }

    #[test]
    fn env_url_wins_over_everything() {
        let env = EnvConfig {
            database_host: Some("db.internal".into()),
            database_user: Some("cineteca".into()),
            database_name: Some("cineteca".into()),
            ..env_with_url("postgresql://env/cineteca")
        };
        let file = FileDatabaseConfig {
            url: Some("postgresql://file/cineteca".into()),
            password_file: None,
        };

        let (url, source) = resolve_database_url(&env, &file).unwrap().unwrap();
        assert_eq!(url, "postgresql://env/cineteca");
        assert_eq!(source, DatabaseUrlSource::Env);
    }

    #[test]
    fn secret_file_beats_config_file() {
        let mut secret = tempfile::NamedTempFile::new().unwrap();
        writeln!(secret, "postgresql://secret/cineteca").unwrap();

        let env = EnvConfig {
            database_url_file: Some(secret.path().to_path_buf()),
            ..EnvConfig::default()
        };
        let file = FileDatabaseConfig {
            url: Some("postgresql://file/cineteca".into()),
            password_file: None,
        };

        let (url, source) = resolve_database_url(&env, &file).unwrap().unwrap();
        assert_eq!(url, "postgresql://secret/cineteca");
        assert_eq!(source, DatabaseUrlSource::SecretFile);
    }

    #[test]
    fn file_url_gets_password_merged_in() {
        let env = EnvConfig {
            database_password: Some("hunter2".into()),
            ..EnvConfig::default()
        };
        let file = FileDatabaseConfig {
            url: Some("postgresql://cineteca@localhost/cineteca".into()),
            password_file: None,
        };

        let (url, source) = resolve_database_url(&env, &file).unwrap().unwrap();
        assert!(url.contains("hunter2"));
        assert_eq!(source, DatabaseUrlSource::File);
    }

    #[test]
    fn parts_are_the_last_resort() {
        let env = EnvConfig {
            database_host: Some("localhost".into()),
            database_user: Some("cineteca".into()),
            database_name: Some("cineteca".into()),
            ..EnvConfig::default()
        };
        let file = FileDatabaseConfig::default();

        let (url, source) = resolve_database_url(&env, &file).unwrap().unwrap();
        assert_eq!(url, "postgresql://cineteca@localhost:5432/cineteca");
        assert_eq!(source, DatabaseUrlSource::Parts);
    }

    #[test]
    fn empty_chain_resolves_to_none() {
        let resolved = resolve_database_url(
            &EnvConfig::default(),
            &FileDatabaseConfig::default(),
        )
        .unwrap();
        assert!(resolved.is_none());
    }
}
