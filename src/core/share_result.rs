use crate::core::stats::RunStats;
use crate::models::result::RunEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot::Receiver;
use tokio::time::{interval_at, Instant};

/// Publishes a snapshot of the run every `period` until told to stop.
pub(crate) async fn collect_results(
    result_channel: Option<Sender<RunEvent>>,
    should_stop_rx: Receiver<()>,
    stats: Arc<RunStats>,
    period: Duration,
    test_start: Instant,
) {
    let first_tick = match test_start.checked_add(period) {
        Some(at) => at,
        None => {
            tracing::warn!(?period, "report interval out of range, no progress");
            let _ = should_stop_rx.await;
            return;
        }
    };
    let mut interval = interval_at(first_tick, period);
    select! {
        _ = should_stop_rx => {
            tracing::trace!("progress reporter stopped");
        }
        _ = async {
            loop {
                interval.tick().await;
                let result = stats.snapshot(test_start.elapsed()).await;
                let totals = result.check_totals();
                tracing::info!(
                    elapsed_secs = %format!("{:.1}", result.total_duration),
                    vus = result.virtual_users,
                    requests = result.total_requests,
                    rps = %format!("{:.1}", result.rps),
                    checks_passed = totals.passes,
                    checks_failed = totals.fails,
                    p95_ms = result.response_time_95,
                    "progress"
                );
                if let Some(tx) = &result_channel {
                    if tx.send(RunEvent::Progress(result)).await.is_err() {
                        tracing::debug!("progress receiver dropped");
                    }
                }
            }
        } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::{mpsc, oneshot};

    #[tokio::test(start_paused = true)]
    async fn emits_one_snapshot_per_period_until_stopped() {
        let stats = Arc::new(RunStats::new("consultas", "http://localhost:8080/consultas").unwrap());
        let (tx, mut rx) = mpsc::channel(16);
        let (stop_tx, stop_rx) = oneshot::channel();
        let start = Instant::now();
        let handle = tokio::spawn(collect_results(
            Some(tx),
            stop_rx,
            stats,
            Duration::from_secs(1),
            start,
        ));

        tokio::time::sleep(Duration::from_millis(3500)).await;
        stop_tx.send(()).unwrap();
        handle.await.unwrap();

        let mut snapshots = Vec::new();
        while let Some(event) = rx.recv().await {
            match event {
                RunEvent::Progress(r) => snapshots.push(r),
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[0].total_duration, 1.0);
        assert_eq!(snapshots[2].total_duration, 3.0);
    }
}
