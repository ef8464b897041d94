use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use cineteca_model::SitemapStats;

use crate::database::ports::stats::SitemapStatsStore;
use crate::error::{Result, SitemapError};

/// Fixed key of the single logical stats row.
const STATS_ROW_ID: i32 = 1;

#[derive(Clone)]
pub struct PostgresSitemapStatsStore {
    pool: PgPool,
}

impl PostgresSitemapStatsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: &PgRow) -> Result<SitemapStats> {
        let decode = |e: sqlx::Error| {
            SitemapError::Database(format!("failed to decode stats row: {e}"))
        };

        Ok(SitemapStats {
            last_generation: row.try_get("last_generation").map_err(decode)?,
            urls_count: row.try_get("urls_count").map_err(decode)?,
            film_count: row.try_get("film_count").map_err(decode)?,
            serie_count: row.try_get("serie_count").map_err(decode)?,
            attore_count: row.try_get("attore_count").map_err(decode)?,
            regista_count: row.try_get("regista_count").map_err(decode)?,
            cast_count: row.try_get("cast_count").map_err(decode)?,
            crew_count: row.try_get("crew_count").map_err(decode)?,
            person_count: row.try_get("person_count").map_err(decode)?,
            other_count: row.try_get("other_count").map_err(decode)?,
            generation_ms: row.try_get("generation_ms").map_err(decode)?,
            is_error: row.try_get("is_error").map_err(decode)?,
            error_message: row.try_get("error_message").map_err(decode)?,
        })
    }
}

impl fmt::Debug for PostgresSitemapStatsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresSitemapStatsStore")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

#[async_trait]
impl SitemapStatsStore for PostgresSitemapStatsStore {
    async fn read(&self) -> Result<Option<SitemapStats>> {
        let row = sqlx::query(
            r#"
            SELECT
                last_generation,
                urls_count,
                film_count,
                serie_count,
                attore_count,
                regista_count,
                cast_count,
                crew_count,
                person_count,
                other_count,
                generation_ms,
                is_error,
                error_message
            FROM sitemap_stats
            WHERE id = $1
            "#,
        )
        .bind(STATS_ROW_ID)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            SitemapError::Database(format!("failed to read stats row: {e}"))
        })?;

        row.map(|row| Self::map_row(&row)).transpose()
    }

    async fn record_success(&self, stats: SitemapStats) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sitemap_stats (
                id, last_generation, urls_count, film_count, serie_count,
                attore_count, regista_count, cast_count, crew_count,
                person_count, other_count, generation_ms, is_error,
                error_message
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, FALSE, NULL)
            ON CONFLICT (id) DO UPDATE SET
                last_generation = EXCLUDED.last_generation,
                urls_count = EXCLUDED.urls_count,
                film_count = EXCLUDED.film_count,
                serie_count = EXCLUDED.serie_count,
                attore_count = EXCLUDED.attore_count,
                regista_count = EXCLUDED.regista_count,
                cast_count = EXCLUDED.cast_count,
                crew_count = EXCLUDED.crew_count,
                person_count = EXCLUDED.person_count,
                other_count = EXCLUDED.other_count,
                generation_ms = EXCLUDED.generation_ms,
                is_error = FALSE,
                error_message = NULL
            "#,
        )
        .bind(STATS_ROW_ID)
        .bind(stats.last_generation)
        .bind(stats.urls_count)
        .bind(stats.film_count)
        .bind(stats.serie_count)
        .bind(stats.attore_count)
        .bind(stats.regista_count)
        .bind(stats.cast_count)
        .bind(stats.crew_count)
        .bind(stats.person_count)
        .bind(stats.other_count)
        .bind(stats.generation_ms)
        .execute(self.pool())
        .await
        .map_err(|e| {
            SitemapError::Database(format!("failed to upsert stats row: {e}"))
        })?;

        Ok(())
    }

    async fn record_failure(
        &self,
        message: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        // Partial update on conflict: count columns keep the values of the
        // last successful run.
        sqlx::query(
            r#"
            INSERT INTO sitemap_stats (id, last_generation, is_error, error_message)
            VALUES ($1, $2, TRUE, $3)
            ON CONFLICT (id) DO UPDATE SET
                last_generation = EXCLUDED.last_generation,
                is_error = TRUE,
                error_message = EXCLUDED.error_message
            "#,
        )
        .bind(STATS_ROW_ID)
        .bind(at)
        .bind(message)
        .execute(self.pool())
        .await
        .map_err(|e| {
            SitemapError::Database(format!(
                "failed to record generation failure: {e}"
            ))
        })?;

        Ok(())
    }
}
