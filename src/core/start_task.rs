use crate::core::concurrency_controller::ConcurrencyController;
use crate::core::iteration::run_iteration;
use crate::core::stats::RunStats;
use crate::core::transport::Transport;
use crate::models::api_endpoint::ScheduleEndpoint;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Loops the iteration for one virtual user until the deadline.
///
/// Waits for a permit first. A user whose permit only arrives after the
/// deadline never runs. An iteration in flight when the deadline passes
/// is finished, no new one is started. Returns the iteration count.
pub(crate) async fn start_virtual_user(
    transport: Arc<dyn Transport>,
    controller: Arc<ConcurrencyController>,
    endpoint: Arc<ScheduleEndpoint>,
    stats: Arc<RunStats>,
    think_time: Duration,
    deadline: Instant,
    vu: usize,
) -> u64 {
    let semaphore = controller.get_semaphore();
    let _permit = tokio::select! {
        permit = semaphore.acquire() => match permit {
            Ok(p) => p,
            Err(_) => {
                tracing::warn!(vu, "permit semaphore closed");
                return 0;
            }
        },
        _ = sleep_until(deadline) => return 0,
    };
    stats.vu_started();
    tracing::trace!(vu, "virtual user started");

    let mut iteration = 0u64;
    while Instant::now() < deadline {
        let outcome =
            run_iteration(transport.as_ref(), endpoint.as_ref(), think_time, vu, iteration).await;
        stats.record(&outcome).await;
        iteration += 1;
    }
    tracing::trace!(vu, iterations = iteration, "virtual user finished");
    iteration
}
