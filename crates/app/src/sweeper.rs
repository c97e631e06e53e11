use chrono::{Duration, Utc};
use engine::Engine;
use tokio::task::JoinHandle;

/// Starts the stale-item sweeper. Runs until the task is aborted.
///
/// The first tick fires immediately, so items left over from a previous
/// run are released at startup.
pub fn start_sweeper(engine: Engine, interval_hours: u64, hold: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = std::time::Duration::from_secs(interval_hours.max(1) * 60 * 60);
        let mut timer = tokio::time::interval(period);
        tracing::info!(
            interval_hours,
            hold_days = hold.num_days(),
            "stale item sweeper started"
        );
        loop {
            timer.tick().await;
            match engine.release_stale_items(Utc::now(), hold).await {
                Ok(report) => tracing::info!(
                    requests = report.requests,
                    items = report.items,
                    "stale items released"
                ),
                Err(err) => tracing::error!("stale item sweep failed: {err}"),
            }
        }
    })
}
