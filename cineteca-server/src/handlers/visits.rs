use axum::{Json, extract::State};
use serde::Deserialize;

use cineteca_model::TrackedPage;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordVisitRequest {
    pub page_type: String,
    pub slug: String,
}

/// Write surface for the page-serving collaborator: called once per page
/// view, creating the tracked row on the first one.
pub async fn record_visit_handler(
    State(state): State<AppState>,
    Json(request): Json<RecordVisitRequest>,
) -> Result<Json<TrackedPage>, AppError> {
    let page_type = request.page_type.trim();
    let slug = request.slug.trim();
    if page_type.is_empty() || slug.is_empty() {
        return Err(AppError::bad_request(
            "pageType and slug must be non-empty",
        ));
    }

    let page = state.visits.record_visit(page_type, slug).await?;
    Ok(Json(page))
}
