use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, info};

use cineteca_core::SitemapError;
use cineteca_core::database::fetch_all_pages;
use cineteca_core::sitemap::{DiscrepancyReport, reconcile_published};
use cineteca_model::SitemapStats;

use crate::errors::AppError;
use crate::state::AppState;

/// Admin trigger: run the generation pipeline once and report the outcome
/// as the JSON summary consumed by the dashboard.
pub async fn generate_sitemap_handler(
    State(state): State<AppState>,
) -> Response {
    info!("sitemap generation requested");

    match state.generator.run().await {
        Ok(summary) => Json(summary).into_response(),
        Err(err) => {
            let status = match err {
                SitemapError::RunInProgress => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error!(error = %err, "sitemap generation failed");
            (
                status,
                Json(json!({
                    "success": false,
                    "error": err.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// The single-row statistics record, as-is.
pub async fn sitemap_stats_handler(
    State(state): State<AppState>,
) -> Result<Json<SitemapStats>, AppError> {
    match state.stats.read().await? {
        Some(stats) => Ok(Json(stats)),
        None => Err(AppError::not_found("no generation has been recorded yet")),
    }
}

/// Fetch the published sitemap over HTTP (no-cache, bounded by the
/// configured timeout), compare it against the tracked-page store and
/// return the classified discrepancy report.
pub async fn sitemap_discrepancies_handler(
    State(state): State<AppState>,
) -> Result<Json<DiscrepancyReport>, AppError> {
    let url = state.config.sitemap_url();

    let response = state
        .http
        .get(&url)
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::PRAGMA, "no-cache")
        .send()
        .await
        .map_err(|err| {
            AppError::bad_gateway(format!(
                "failed to fetch published sitemap: {err}"
            ))
        })?
        .error_for_status()
        .map_err(|err| {
            AppError::bad_gateway(format!(
                "published sitemap responded with an error: {err}"
            ))
        })?;

    let xml = response.text().await.map_err(|err| {
        AppError::bad_gateway(format!(
            "failed to read published sitemap body: {err}"
        ))
    })?;

    let total = state.pages.count_all().await?;
    let entries = fetch_all_pages(state.pages.as_ref(), total).await;

    let report =
        reconcile_published(&xml, &state.config.site.base_url, entries);
    Ok(Json(report))
}

/// Serve the canonical artifact. Public: this is the URL search engines
/// crawl.
pub async fn serve_sitemap_handler(
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    match state.artifacts.read_current().await? {
        Some(xml) => Ok((
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            xml,
        )
            .into_response()),
        None => Err(AppError::not_found("sitemap has not been generated yet")),
    }
}
