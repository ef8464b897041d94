//! Durable storage for the published sitemap document.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{Result, SitemapError};

const SITEMAP_FILE: &str = "sitemap.xml";
const BACKUP_DIR: &str = "sitemap-backups";

/// Port over the durable store holding the canonical sitemap artifact and
/// its timestamped backups.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn read_current(&self) -> Result<Option<String>>;

    /// Copy the current document to a timestamped backup key. Returns the
    /// backup location, or `None` when there is nothing to back up.
    async fn backup_current(
        &self,
        at: DateTime<Utc>,
    ) -> Result<Option<PathBuf>>;

    /// Overwrite the canonical key with a freshly built document.
    async fn write(&self, xml: &str) -> Result<()>;

    /// Drop all but the newest `keep` backups. Returns how many were
    /// removed.
    async fn prune_backups(&self, keep: usize) -> Result<usize>;
}

/// Filesystem-backed artifact store rooted at the site's public directory.
#[derive(Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn sitemap_path(&self) -> PathBuf {
        self.root.join(SITEMAP_FILE)
    }

    fn backup_dir(&self) -> PathBuf {
        self.root.join(BACKUP_DIR)
    }

    fn backup_name(at: DateTime<Utc>) -> String {
        format!("sitemap-{}.xml", at.format("%Y%m%d%H%M%S"))
    }
}

impl fmt::Debug for FsArtifactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsArtifactStore")
            .field("root", &self.root)
            .finish()
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn read_current(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.sitemap_path()).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(SitemapError::Artifact(format!(
                "failed to read current sitemap: {err}"
            ))),
        }
    }

    async fn backup_current(
        &self,
        at: DateTime<Utc>,
    ) -> Result<Option<PathBuf>> {
        let current = self.sitemap_path();
        if !current.exists() {
            return Ok(None);
        }

        let dir = self.backup_dir();
        tokio::fs::create_dir_all(&dir).await.map_err(|err| {
            SitemapError::Artifact(format!(
                "failed to create backup directory: {err}"
            ))
        })?;

        let target = dir.join(Self::backup_name(at));
        tokio::fs::copy(&current, &target).await.map_err(|err| {
            SitemapError::Artifact(format!(
                "failed to back up previous sitemap: {err}"
            ))
        })?;

        Ok(Some(target))
    }

    async fn write(&self, xml: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|err| {
            SitemapError::Publish(format!(
                "failed to create public directory: {err}"
            ))
        })?;

        // Temp-and-rename so readers never observe a half-written document.
        let tmp = self.root.join(format!(".{SITEMAP_FILE}.tmp"));
        tokio::fs::write(&tmp, xml).await.map_err(|err| {
            SitemapError::Publish(format!(
                "failed to stage new sitemap: {err}"
            ))
        })?;
        tokio::fs::rename(&tmp, self.sitemap_path())
            .await
            .map_err(|err| {
                SitemapError::Publish(format!(
                    "failed to publish new sitemap: {err}"
                ))
            })?;

        Ok(())
    }

    async fn prune_backups(&self, keep: usize) -> Result<usize> {
        let dir = self.backup_dir();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(0);
            }
            Err(err) => {
                return Err(SitemapError::Artifact(format!(
                    "failed to list backups: {err}"
                )));
            }
        };

        let mut backups: Vec<PathBuf> = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|err| {
            SitemapError::Artifact(format!("failed to list backups: {err}"))
        })? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("sitemap-") && name.ends_with(".xml") {
                backups.push(entry.path());
            }
        }

        // Timestamped names sort lexicographically; newest last.
        backups.sort();
        let excess = backups.len().saturating_sub(keep);
        for stale in &backups[..excess] {
            remove_backup(stale).await?;
        }

        Ok(excess)
    }
}

async fn remove_backup(path: &Path) -> Result<()> {
    tokio::fs::remove_file(path).await.map_err(|err| {
        SitemapError::Artifact(format!(
            "failed to remove stale backup {}: {err}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store(dir: &tempfile::TempDir) -> FsArtifactStore {
        FsArtifactStore::new(dir.path())
    }

    #[tokio::test]
    async fn read_current_is_none_before_first_publish() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store(&dir).read_current().await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.write("<urlset/>").await.unwrap();
        assert_eq!(
            store.read_current().await.unwrap().as_deref(),
            Some("<urlset/>")
        );
    }

    #[tokio::test]
    async fn backup_preserves_the_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.write("old").await.unwrap();

        let at = Utc.with_ymd_and_hms(2026, 8, 7, 10, 0, 0).unwrap();
        let backup = store.backup_current(at).await.unwrap().unwrap();
        store.write("new").await.unwrap();

        assert!(backup.ends_with("sitemap-20260807100000.xml"));
        let backed_up = tokio::fs::read_to_string(&backup).await.unwrap();
        assert_eq!(backed_up, "old");
        assert_eq!(store.read_current().await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn backup_of_nothing_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let backup = store(&dir).backup_current(Utc::now()).await.unwrap();
        assert!(backup.is_none());
    }

    #[tokio::test]
    async fn prune_keeps_only_the_newest() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        for hour in 0..5 {
            store.write(&format!("v{hour}")).await.unwrap();
            let at = Utc.with_ymd_and_hms(2026, 8, 7, hour, 0, 0).unwrap();
            store.backup_current(at).await.unwrap();
        }

        let removed = store.prune_backups(2).await.unwrap();
        assert_eq!(removed, 3);

        let survivors = store.prune_backups(2).await.unwrap();
        assert_eq!(survivors, 0);

        let mut names = Vec::new();
        let mut entries =
            tokio::fs::read_dir(dir.path().join(BACKUP_DIR)).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        assert_eq!(
            names,
            ["sitemap-20260807030000.xml", "sitemap-20260807040000.xml"]
        );
    }
}
