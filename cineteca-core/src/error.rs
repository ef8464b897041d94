use thiserror::Error;

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The denominator of the run. Without it there is no way to bound the
    /// batch scan, so this aborts the whole run.
    #[error("Record count unavailable: {0}")]
    CountUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Artifact store error: {0}")]
    Artifact(String),

    #[error("Sitemap publish failed: {0}")]
    Publish(String),

    #[error("Sitemap fetch failed: {0}")]
    Fetch(String),

    #[error("Another generation run is already in progress")]
    RunInProgress,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SitemapError>;
