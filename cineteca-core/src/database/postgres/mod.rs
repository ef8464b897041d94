pub mod run_lock;
pub mod stats;
pub mod tracked_pages;
pub mod visits;

pub use run_lock::PgRunLock;
pub use stats::PostgresSitemapStatsStore;
pub use tracked_pages::PostgresTrackedPageStore;
pub use visits::PostgresPageVisitStore;
