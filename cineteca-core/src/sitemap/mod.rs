//! The sitemap pipeline: validation, reconciliation, rendering,
//! publication and the run orchestrator.

pub mod builder;
pub mod discrepancy;
pub mod generator;
pub mod publish;
pub mod reconcile;
pub mod validator;

pub use builder::{SitemapDocument, SitemapHeader, UrlCounts, build_sitemap};
pub use discrepancy::{DiscrepancyReport, reconcile_published};
pub use generator::{RunSummary, SitemapGenerator};
pub use publish::{ArtifactStore, FsArtifactStore};
pub use reconcile::PartitionedPages;
pub use validator::{SlugFrequency, classify_exclusion};
