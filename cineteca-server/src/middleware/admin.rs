use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use constant_time_eq::constant_time_eq;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Gate for the admin routes: a shared token compared in constant time.
/// With no token configured the routes refuse every request rather than
/// opening up.
pub async fn require_admin_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.admin.token.as_deref() else {
        warn!("admin route hit but no admin token is configured");
        return Err(AppError::unauthorized("admin access is not configured"));
    };

    let provided = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
        return Err(AppError::unauthorized("invalid admin token"));
    }

    Ok(next.run(request).await)
}
