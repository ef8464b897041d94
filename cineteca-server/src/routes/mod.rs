pub mod v1;

use axum::{Router, routing::get};

use crate::AppState;
use crate::handlers::sitemap;

/// Create the main router: the public sitemap artifact plus the versioned
/// API.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/sitemap.xml", get(sitemap::serve_sitemap_handler))
        .nest("/api/v1", v1::create_v1_router(state.clone()))
        .with_state(state)
}
