//! Library surface of the Cineteca sitemap service; the binary in
//! `main.rs` wires these pieces together.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod scheduler;
pub mod state;

pub use errors::{AppError, AppResult};
pub use state::AppState;
