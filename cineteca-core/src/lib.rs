//! # Cineteca Core
//!
//! Core library for the Cineteca sitemap engine: the subsystem that keeps
//! the published sitemap of a movie/TV metadata site in agreement with the
//! `generated_pages` table tracking every page the site has ever served.
//!
//! ## Overview
//!
//! The pipeline is linear: count the tracked records, bulk-read them in
//! fixed windows, partition them by content family, render the canonical
//! XML document, publish it (backing up the previous version first) and
//! upsert a single-row statistics record.
//!
//! A separate discrepancy engine re-reads an already-published sitemap and
//! classifies every tracked record missing from it, so operators can triage
//! data problems without re-running generation.
//!
//! ## Architecture
//!
//! - [`database`]: store ports and their PostgreSQL implementations
//! - [`sitemap`]: validator, reconciliation, builder, publication and the
//!   run pipeline
//! - [`error`]: the crate-wide error type

pub mod database;
pub mod error;
pub mod sitemap;

pub use error::{Result, SitemapError};
