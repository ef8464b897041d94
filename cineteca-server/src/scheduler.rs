use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use cineteca_core::SitemapError;
use cineteca_core::sitemap::SitemapGenerator;

/// Spawn the periodic generation job. The first tick is consumed
/// immediately so the service starts serving before the first scheduled
/// run; an operator can always trigger one by hand.
pub fn spawn(
    generator: Arc<SitemapGenerator>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(
            tokio::time::MissedTickBehavior::Delay,
        );
        ticker.tick().await;

        loop {
            ticker.tick().await;
            info!("scheduled sitemap generation starting");
            match generator.run().await {
                Ok(summary) => {
                    info!(
                        urls = summary.url_count,
                        records = summary.record_count,
                        "scheduled sitemap generation finished"
                    );
                }
                Err(SitemapError::RunInProgress) => {
                    info!(
                        "skipping scheduled generation; a run is already active"
                    );
                }
                Err(err) => {
                    error!(error = %err, "scheduled sitemap generation failed");
                }
            }
        }
    })
}
