use std::fmt;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use cineteca_model::PageEntry;

use crate::database::ports::tracked_pages::TrackedPageStore;
use crate::error::{Result, SitemapError};

#[derive(Clone)]
pub struct PostgresTrackedPageStore {
    pool: PgPool,
}

impl PostgresTrackedPageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl fmt::Debug for PostgresTrackedPageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresTrackedPageStore")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

#[async_trait]
impl TrackedPageStore for PostgresTrackedPageStore {
    async fn count_all(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM generated_pages")
            .fetch_one(self.pool())
            .await
            .map_err(|e| {
                SitemapError::CountUnavailable(format!(
                    "failed to count tracked pages: {e}"
                ))
            })?;

        row.try_get("total").map_err(|e| {
            SitemapError::CountUnavailable(format!(
                "failed to decode tracked page count: {e}"
            ))
        })
    }

    async fn fetch_batch(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PageEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT slug, page_type
            FROM generated_pages
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            SitemapError::Database(format!(
                "failed to fetch tracked pages at offset {offset}: {e}"
            ))
        })?;

        rows.into_iter()
            .map(|row| {
                Ok(PageEntry {
                    slug: row.try_get("slug").map_err(|e| {
                        SitemapError::Database(format!(
                            "failed to decode slug: {e}"
                        ))
                    })?,
                    page_type: row.try_get("page_type").map_err(|e| {
                        SitemapError::Database(format!(
                            "failed to decode page_type: {e}"
                        ))
                    })?,
                })
            })
            .collect()
    }
}
