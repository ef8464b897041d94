use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::AppState;
use crate::handlers::{sitemap, visits};
use crate::middleware::require_admin_token;

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        // Collaborator write surface (public: called by the page-serving path)
        .route("/pages/visit", post(visits::record_visit_handler))
        // Merge admin routes
        .merge(create_admin_routes(state))
}

/// Admin routes gated by the shared token.
fn create_admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/admin/sitemap/generate",
            post(sitemap::generate_sitemap_handler),
        )
        .route("/admin/sitemap/stats", get(sitemap::sitemap_stats_handler))
        .route(
            "/admin/sitemap/discrepancies",
            get(sitemap::sitemap_discrepancies_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            require_admin_token,
        ))
}
