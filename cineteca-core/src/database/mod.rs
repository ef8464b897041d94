//! Store ports and their PostgreSQL implementations.
//!
//! Ports are trait seams in the style of a hexagonal repository layer:
//! the sitemap pipeline depends only on the traits, the server wires in
//! the `postgres` implementations, and tests substitute in-memory fakes.

pub mod ports;
pub mod postgres;

pub use ports::lock::RunLock;
pub use ports::stats::SitemapStatsStore;
pub use ports::tracked_pages::{BATCH_SIZE, TrackedPageStore, fetch_all_pages};
pub use ports::visits::PageVisitStore;
pub use postgres::{
    PgRunLock, PostgresPageVisitStore, PostgresSitemapStatsStore,
    PostgresTrackedPageStore,
};
