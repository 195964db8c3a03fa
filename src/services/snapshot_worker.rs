use chrono::{DateTime, Utc};
use metrics::counter;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::models::SnapshotPeriod;
use crate::services::analytics::AnalyticsService;

pub const WORKER_NAME: &str = "snapshot-worker";

/// Generates one snapshot per period; returns how many were stored.
pub async fn run_once(analytics: &AnalyticsService, periods: &[SnapshotPeriod], as_of: DateTime<Utc>) -> usize {
    let mut stored = 0;
    for &period in periods {
        match analytics.generate_snapshot(period, as_of, WORKER_NAME).await {
            Ok(_) => stored += 1,
            Err(e) => {
                counter!("woolchain.snapshot.failures", 1, "period" => period.as_str());
                error!(%period, error = %e, "snapshot generation failed");
            }
        }
    }
    stored
}

/// Spawns the periodic snapshot task. The first tick fires immediately.
pub fn start_worker(analytics: AnalyticsService, periods: Vec<SnapshotPeriod>, every: Duration) -> JoinHandle<()> {
    info!(?periods, interval_secs = every.as_secs(), "starting snapshot worker");

    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let stored = run_once(&analytics, &periods, Utc::now()).await;
            info!(stored, requested = periods.len(), "snapshot tick finished");
        }
    })
}
