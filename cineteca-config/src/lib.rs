//! Shared configuration library for Cineteca.
//!
//! Centralizes config loading and validation so the server binary and any
//! operational tooling agree on defaults, merge order (file < env < CLI)
//! and the database URL resolution chain. Configuration is composed once
//! at process start into an explicit [`Config`] value and passed down by
//! reference; nothing in the workspace reads ambient globals.

pub mod db_url;
pub mod loader;
pub mod models;

pub use db_url::{DatabaseUrlSource, resolve_database_url};
pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigWarnings};
pub use models::{
    AdminConfig, Config, ConfigMetadata, DatabaseConfig, ServerConfig,
    SiteConfig, SitemapConfig,
};
