use async_trait::async_trait;

use crate::error::Result;

/// Run-level mutual exclusion for the generation pipeline.
///
/// Two concurrent runs would race on the canonical artifact and the stats
/// row, so a run must hold this lock across publish. Denial is not an
/// anomaly; the caller reports it as "run already in progress".
#[async_trait]
pub trait RunLock: Send + Sync {
    /// Attempt to take the lock without waiting. `false` means another run
    /// holds it.
    async fn try_acquire(&self) -> Result<bool>;

    /// Release a previously acquired lock. Releasing a lock that is not
    /// held is a no-op.
    async fn release(&self) -> Result<()>;
}
