// Background retention worker: prunes records older than the retention window
// every prune_interval_secs until shutdown.

use std::sync::Arc;
use std::time::Duration;

use crate::history_repo::HistoryRepo;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct RetentionWorkerConfig {
    pub prune_interval_secs: u64,
}

/// Spawns the retention worker. Returns a join handle.
pub fn spawn(
    repo: Arc<HistoryRepo>,
    config: RetentionWorkerConfig,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(repo, config, shutdown_rx).await;
    })
}

#[instrument(skip(repo, shutdown_rx), fields(interval_secs = config.prune_interval_secs))]
async fn run(
    repo: Arc<HistoryRepo>,
    config: RetentionWorkerConfig,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) {
    let mut prune_tick = tokio::time::interval(Duration::from_secs(config.prune_interval_secs));
    prune_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut pruned_total: u64 = 0;

    loop {
        tokio::select! {
            _ = prune_tick.tick() => {
                match repo.prune_old_data().await {
                    Ok(removed) => {
                        pruned_total += removed;
                        if removed > 0 {
                            info!(removed, pruned_total, "old records pruned");
                        }
                    }
                    Err(e) => warn!(error = %e, operation = "prune_old_data", "prune failed"),
                }
            }
            _ = &mut shutdown_rx => {
                debug!("Retention worker shutting down");
                break;
            }
        }
    }
}
