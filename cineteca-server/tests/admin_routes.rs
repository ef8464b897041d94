//! Route-level tests over the real router with in-memory stores.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, Utc};
use tower::ServiceExt;

use cineteca_config::{ConfigLoader, models::sources::EnvConfig};
use cineteca_core::database::{
    PageVisitStore, RunLock, SitemapStatsStore, TrackedPageStore,
};
use cineteca_core::error::Result;
use cineteca_core::sitemap::{FsArtifactStore, SitemapGenerator};
use cineteca_model::{PageEntry, TrackedPage};
use cineteca_server::{AppState, routes};

const ADMIN_TOKEN: &str = "test-admin-token";

struct MemoryPages {
    entries: Vec<PageEntry>,
}

#[async_trait]
impl TrackedPageStore for MemoryPages {
    async fn count_all(&self) -> Result<i64> {
        Ok(self.entries.len() as i64)
    }

    async fn fetch_batch(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PageEntry>> {
        let start = (offset as usize).min(self.entries.len());
        let end = (start + limit as usize).min(self.entries.len());
        Ok(self.entries[start..end].to_vec())
    }
}

#[derive(Default)]
struct MemoryStats {
    row: tokio::sync::Mutex<Option<cineteca_model::SitemapStats>>,
}

#[async_trait]
impl SitemapStatsStore for MemoryStats {
    async fn read(&self) -> Result<Option<cineteca_model::SitemapStats>> {
        Ok(self.row.lock().await.clone())
    }

    async fn record_success(
        &self,
        stats: cineteca_model::SitemapStats,
    ) -> Result<()> {
        *self.row.lock().await = Some(stats);
        Ok(())
    }

    async fn record_failure(
        &self,
        message: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut row = self.row.lock().await;
        if let Some(existing) = row.as_mut() {
            existing.last_generation = at;
            existing.is_error = true;
            existing.error_message = Some(message.to_string());
        }
        Ok(())
    }
}

struct MemoryVisits;

#[async_trait]
impl PageVisitStore for MemoryVisits {
    async fn record_visit(
        &self,
        page_type: &str,
        slug: &str,
    ) -> Result<TrackedPage> {
        Ok(TrackedPage {
            id: 1,
            slug: Some(slug.to_string()),
            page_type: Some(page_type.to_string()),
            first_generated_at: Utc::now(),
            last_visited_at: Some(Utc::now()),
            visit_count: 1,
        })
    }

    async fn get(
        &self,
        _page_type: &str,
        _slug: &str,
    ) -> Result<Option<TrackedPage>> {
        Ok(None)
    }
}

struct FreeLock;

#[async_trait]
impl RunLock for FreeLock {
    async fn try_acquire(&self) -> Result<bool> {
        Ok(true)
    }

    async fn release(&self) -> Result<()> {
        Ok(())
    }
}

fn test_state(dir: &tempfile::TempDir, entries: Vec<PageEntry>) -> AppState {
    let env = EnvConfig {
        public_dir: Some(dir.path().to_path_buf()),
        admin_token: Some(ADMIN_TOKEN.to_string()),
        ..EnvConfig::default()
    };
    let config = Arc::new(
        ConfigLoader::compose_from_sources(None, env)
            .expect("test config")
            .config,
    );

    let pages: Arc<dyn TrackedPageStore> = Arc::new(MemoryPages { entries });
    let stats: Arc<dyn SitemapStatsStore> = Arc::new(MemoryStats::default());
    let visits: Arc<dyn PageVisitStore> = Arc::new(MemoryVisits);
    let artifacts = Arc::new(FsArtifactStore::new(dir.path()));

    let generator = Arc::new(SitemapGenerator::new(
        pages.clone(),
        stats.clone(),
        artifacts.clone(),
        Arc::new(FreeLock),
        config.site.base_url.clone(),
        config.sitemap.backup_keep,
    ));

    AppState {
        config,
        generator,
        pages,
        stats,
        visits,
        artifacts,
        http: reqwest::Client::new(),
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn admin_routes_refuse_requests_without_the_token() {
    let dir = tempfile::tempdir().unwrap();
    let app = routes::create_router(test_state(&dir, Vec::new()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/admin/sitemap/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = routes::create_router(test_state(&dir, Vec::new()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/admin/sitemap/stats")
                .header("x-admin-token", "nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn generate_then_serve_the_published_sitemap() {
    let dir = tempfile::tempdir().unwrap();
    let entries = vec![
        PageEntry::new("film".to_string(), "dune-2021-438631".to_string()),
        PageEntry::new("serie".to_string(), "dark-2017-70523".to_string()),
    ];
    let state = test_state(&dir, entries);
    let app = routes::create_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/admin/sitemap/generate")
                .header("x-admin-token", ADMIN_TOKEN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let summary = body_json(response).await;
    assert_eq!(summary["success"], true);
    assert_eq!(summary["urlCount"], 6);
    assert_eq!(summary["filmCount"], 1);
    assert_eq!(summary["serieCount"], 1);
    assert!(summary["publicUrl"].as_str().unwrap().ends_with("/sitemap.xml"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/sitemap.xml")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("application/xml")
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let xml = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(xml.contains("/film/dune-2021-438631</loc>"));

    // stats row now readable through the admin surface
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/admin/sitemap/stats")
                .header("x-admin-token", ADMIN_TOKEN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    assert_eq!(stats["urlsCount"], 6);
    assert_eq!(stats["isError"], false);
}

#[tokio::test]
async fn sitemap_404_before_first_generation() {
    let dir = tempfile::tempdir().unwrap();
    let app = routes::create_router(test_state(&dir, Vec::new()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/sitemap.xml")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn visit_recording_validates_its_input() {
    let dir = tempfile::tempdir().unwrap();
    let app = routes::create_router(test_state(&dir, Vec::new()));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/pages/visit")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"pageType":"film","slug":"  "}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/pages/visit")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"pageType":"film","slug":"dune-2021-438631"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["visitCount"], 1);
}
