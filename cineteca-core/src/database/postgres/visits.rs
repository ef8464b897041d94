use std::fmt;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use cineteca_model::TrackedPage;

use crate::database::ports::visits::PageVisitStore;
use crate::error::{Result, SitemapError};

#[derive(Clone)]
pub struct PostgresPageVisitStore {
    pool: PgPool,
}

impl PostgresPageVisitStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: &PgRow) -> Result<TrackedPage> {
        let decode = |e: sqlx::Error| {
            SitemapError::Database(format!(
                "failed to decode tracked page row: {e}"
            ))
        };

        Ok(TrackedPage {
            id: row.try_get("id").map_err(decode)?,
            slug: row.try_get("slug").map_err(decode)?,
            page_type: row.try_get("page_type").map_err(decode)?,
            first_generated_at: row
                .try_get("first_generated_at")
                .map_err(decode)?,
            last_visited_at: row.try_get("last_visited_at").map_err(decode)?,
            visit_count: row.try_get("visit_count").map_err(decode)?,
        })
    }
}

impl fmt::Debug for PostgresPageVisitStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresPageVisitStore")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

#[async_trait]
impl PageVisitStore for PostgresPageVisitStore {
    async fn record_visit(
        &self,
        page_type: &str,
        slug: &str,
    ) -> Result<TrackedPage> {
        // Update-then-insert rather than ON CONFLICT: the table carries no
        // unique constraint on (page_type, slug). Concurrent first visits
        // can therefore insert twice; the reconciliation engine reports
        // that as duplicate_in_store instead of this writer preventing it.
        let updated = sqlx::query(
            r#"
            UPDATE generated_pages
            SET visit_count = visit_count + 1, last_visited_at = NOW()
            WHERE page_type = $1 AND slug = $2
            "#,
        )
        .bind(page_type)
        .bind(slug)
        .execute(self.pool())
        .await
        .map_err(|e| {
            SitemapError::Database(format!("failed to record visit: {e}"))
        })?;

        if updated.rows_affected() == 0 {
            sqlx::query(
                r#"
                INSERT INTO generated_pages
                    (slug, page_type, first_generated_at, last_visited_at, visit_count)
                VALUES ($1, $2, NOW(), NOW(), 1)
                "#,
            )
            .bind(slug)
            .bind(page_type)
            .execute(self.pool())
            .await
            .map_err(|e| {
                SitemapError::Database(format!(
                    "failed to track first visit: {e}"
                ))
            })?;
        }

        self.get(page_type, slug).await?.ok_or_else(|| {
            SitemapError::Internal(format!(
                "tracked page vanished after visit: {page_type}/{slug}"
            ))
        })
    }

    async fn get(
        &self,
        page_type: &str,
        slug: &str,
    ) -> Result<Option<TrackedPage>> {
        let row = sqlx::query(
            r#"
            SELECT id, slug, page_type, first_generated_at, last_visited_at, visit_count
            FROM generated_pages
            WHERE page_type = $1 AND slug = $2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(page_type)
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            SitemapError::Database(format!(
                "failed to load tracked page: {e}"
            ))
        })?;

        row.map(|row| Self::map_row(&row)).transpose()
    }
}
