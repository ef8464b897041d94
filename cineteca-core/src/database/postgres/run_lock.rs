use std::fmt;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres, Row};
use tokio::sync::Mutex;

use crate::database::ports::lock::RunLock;
use crate::error::{Result, SitemapError};

/// Advisory lock key for the sitemap generation run. Any value works as
/// long as every writer agrees on it.
const SITEMAP_RUN_LOCK_KEY: i64 = 0x6369_6e65_7465_6361;

/// Session-level Postgres advisory lock.
///
/// Advisory locks are bound to the connection that took them, so the
/// connection is checked out of the pool on acquire and pinned until
/// release. Dropping the connection (process death included) releases the
/// lock server-side, which is exactly the crash behavior wanted here.
pub struct PgRunLock {
    pool: PgPool,
    held: Mutex<Option<PoolConnection<Postgres>>>,
}

impl PgRunLock {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            held: Mutex::new(None),
        }
    }
}

impl fmt::Debug for PgRunLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgRunLock")
            .field("key", &SITEMAP_RUN_LOCK_KEY)
            .finish()
    }
}

#[async_trait]
impl RunLock for PgRunLock {
    async fn try_acquire(&self) -> Result<bool> {
        let mut held = self.held.lock().await;
        if held.is_some() {
            return Ok(false);
        }

        let mut conn = self.pool.acquire().await.map_err(|e| {
            SitemapError::Database(format!(
                "failed to acquire connection for run lock: {e}"
            ))
        })?;

        let row = sqlx::query("SELECT pg_try_advisory_lock($1) AS acquired")
            .bind(SITEMAP_RUN_LOCK_KEY)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                SitemapError::Database(format!(
                    "failed to take run lock: {e}"
                ))
            })?;

        let acquired: bool = row.try_get("acquired").map_err(|e| {
            SitemapError::Database(format!(
                "failed to decode run lock result: {e}"
            ))
        })?;

        if acquired {
            *held = Some(conn);
        }
        Ok(acquired)
    }

    async fn release(&self) -> Result<()> {
        let mut held = self.held.lock().await;
        if let Some(mut conn) = held.take() {
            sqlx::query("SELECT pg_advisory_unlock($1)")
                .bind(SITEMAP_RUN_LOCK_KEY)
                .execute(&mut *conn)
                .await
                .map_err(|e| {
                    SitemapError::Database(format!(
                        "failed to release run lock: {e}"
                    ))
                })?;
        }
        Ok(())
    }
}
