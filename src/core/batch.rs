use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::core::concurrency_controller::ConcurrencyController;
use crate::core::share_result;
use crate::core::start_task;
use crate::core::stats::RunStats;
use crate::core::transport::{ReqwestTransport, Transport};
use crate::error::LoadError;
use crate::models::api_endpoint::ScheduleEndpoint;
use crate::models::result::{RunEvent, RunResult};
use crate::models::run_config::RunConfig;

const ENDPOINT_NAME: &str = "consultas";

/// Runs the whole load test against the real endpoint.
pub async fn batch(config: RunConfig) -> Result<RunResult, LoadError> {
    config.validate()?;
    let transport = Arc::new(ReqwestTransport::new(config.request_timeout)?);
    batch_with_transport(config, transport, None).await
}

/// Runs the load test over any transport, optionally streaming progress.
pub async fn batch_with_transport(
    config: RunConfig,
    transport: Arc<dyn Transport>,
    result_channel: Option<mpsc::Sender<RunEvent>>,
) -> Result<RunResult, LoadError> {
    config.validate()?;
    let endpoint = Arc::new(ScheduleEndpoint::new(
        ENDPOINT_NAME,
        config.url.clone(),
        &config.token,
        config.payload.clone(),
    )?);
    let stats = Arc::new(RunStats::new(ENDPOINT_NAME, config.url.clone())?);
    tracing::info!(
        url = %config.url,
        vus = config.virtual_users,
        duration_secs = config.duration.as_secs_f64(),
        think_time_ms = config.think_time.as_millis() as u64,
        ramp = ?config.ramp,
        "starting load test"
    );

    let test_start = Instant::now();
    let test_end = test_start
        .checked_add(config.duration)
        .ok_or_else(|| LoadError::Config("duration is too large".into()))?;

    // permits for the virtual users, released in the background
    let controller = Arc::new(ConcurrencyController::new(
        config.virtual_users,
        config.ramp,
    ));
    let distributor = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move {
            controller.distribute_permits().await;
        }
    });

    let mut handles: Vec<JoinHandle<u64>> = Vec::with_capacity(config.virtual_users);
    for vu in 0..config.virtual_users {
        handles.push(tokio::spawn(start_task::start_virtual_user(
            Arc::clone(&transport),
            Arc::clone(&controller),
            Arc::clone(&endpoint),
            Arc::clone(&stats),
            config.think_time,
            test_end,
            vu,
        )));
    }

    let (stop_tx, stop_rx) = oneshot::channel();
    let reporter = tokio::spawn(share_result::collect_results(
        result_channel,
        stop_rx,
        Arc::clone(&stats),
        config.report_interval,
        test_start,
    ));

    for (vu, task_result) in join_all(handles).await.into_iter().enumerate() {
        match task_result {
            Ok(iterations) => tracing::trace!(vu, iterations, "virtual user joined"),
            Err(e) => tracing::error!(vu, error = %e, "virtual user task failed"),
        }
    }

    let _ = stop_tx.send(());
    if let Err(e) = reporter.await {
        tracing::warn!(error = %e, "progress reporter failed");
    }
    distributor.abort();

    let result = stats.snapshot(test_start.elapsed()).await;
    tracing::info!(
        iterations = result.iterations,
        requests = result.total_requests,
        success_rate = result.success_rate,
        "load test finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::checks::{NO_ERROR, STATUS_200};
    use crate::core::iteration::tests::MockTransport;
    use crate::models::api_endpoint::PayloadSource;
    use crate::models::run_config::RampOption;
    use serde_json::Value;
    use std::collections::HashSet;
    use std::time::Duration;

    fn config(vus: usize, secs: u64) -> RunConfig {
        let mut cfg = RunConfig::new("http://localhost:8080/consultas", "test-token");
        cfg.virtual_users = vus;
        cfg.duration = Duration::from_secs(secs);
        cfg
    }

    #[tokio::test(start_paused = true)]
    async fn every_user_runs_until_the_deadline() {
        let transport = Arc::new(MockTransport::replying(200, r#"{"id":1}"#));
        let result = batch_with_transport(config(5, 1), transport.clone(), None)
            .await
            .unwrap();

        assert_eq!(result.virtual_users, 5);
        assert_eq!(result.iterations, 50);
        assert_eq!(result.total_requests, 50);
        assert_eq!(result.success_rate, 100.0);
        assert_eq!(result.checks.len(), 2);
        assert_eq!(result.checks[STATUS_200].passes, 50);
        assert_eq!(result.checks[NO_ERROR].passes, 50);
        assert_eq!(result.check_totals().total(), 2 * result.iterations);
        assert_eq!(result.total_duration, 1.0);

        let recorded = transport.recorded();
        assert_eq!(recorded.len(), 50);
        let bodies: HashSet<Vec<u8>> = recorded.iter().map(|r| r.body.clone()).collect();
        assert_eq!(bodies.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_server_never_aborts_the_run() {
        let transport = Arc::new(MockTransport::replying(500, r#"{"error":"invalid"}"#));
        let result = batch_with_transport(config(3, 1), transport, None)
            .await
            .unwrap();
        assert_eq!(result.iterations, 30);
        assert_eq!(result.success_rate, 0.0);
        assert_eq!(result.error_rate, 100.0);
        assert_eq!(result.checks[STATUS_200].fails, 30);
        assert_eq!(result.checks[NO_ERROR].fails, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failures_are_counted() {
        let transport = Arc::new(MockTransport::failing("connection refused"));
        let result = batch_with_transport(config(2, 1), transport, None)
            .await
            .unwrap();
        assert_eq!(result.iterations, 20);
        assert_eq!(result.http_errors.len(), 1);
        assert_eq!(result.http_errors[0].count, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn ramp_starts_users_gradually() {
        let transport = Arc::new(MockTransport::replying(200, "{}"));
        let mut cfg = config(4, 2);
        cfg.ramp = Some(RampOption {
            increase_step: 2.0,
            increase_interval_secs: 1,
        });
        let result = batch_with_transport(cfg, transport, None).await.unwrap();
        // two users for 2 s, two more for the last second: 2*20 + 2*10
        assert_eq!(result.virtual_users, 4);
        assert_eq!(result.iterations, 60);
    }

    #[tokio::test(start_paused = true)]
    async fn templated_payload_varies_per_user() {
        let transport = Arc::new(MockTransport::replying(200, "{}"));
        let mut cfg = config(3, 1);
        cfg.think_time = Duration::from_millis(500);
        cfg.payload = PayloadSource::Template(
            r#"{"pacienteId": {{vu}}, "medicoId": 6, "data": "2025-12-12", "hora": "14:00", "valor": 150.0}"#
                .into(),
        );
        batch_with_transport(cfg, transport.clone(), None)
            .await
            .unwrap();
        let patients: HashSet<i64> = transport
            .recorded()
            .iter()
            .map(|r| {
                let body: Value = serde_json::from_slice(&r.body).unwrap();
                body["pacienteId"].as_i64().unwrap()
            })
            .collect();
        assert_eq!(patients, HashSet::from([0, 1, 2]));
    }

    #[tokio::test(start_paused = true)]
    async fn unrenderable_bodies_are_counted_not_sent() {
        let transport = Arc::new(MockTransport::replying(200, "{}"));
        let mut cfg = config(2, 1);
        // only each user's first iteration renders valid JSON
        cfg.payload = PayloadSource::Template(
            r#"{{#if iteration}}oops{{else}}{"pacienteId": 7}{{/if}}"#.into(),
        );
        let result = batch_with_transport(cfg, transport.clone(), None)
            .await
            .unwrap();
        assert_eq!(result.iterations, 20);
        assert_eq!(result.total_requests, 2);
        assert_eq!(result.payload_errors, 18);
        assert!(result.http_errors.is_empty());
        assert_eq!(transport.recorded().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_is_streamed() {
        let transport = Arc::new(MockTransport::replying(200, "{}"));
        let (tx, mut rx) = mpsc::channel(64);
        batch_with_transport(config(2, 3), transport, Some(tx))
            .await
            .unwrap();
        let mut progress = 0;
        while let Some(event) = rx.recv().await {
            if let RunEvent::Progress(r) = event {
                assert!(r.iterations > 0);
                progress += 1;
            }
        }
        assert!(progress >= 2);
    }

    #[tokio::test]
    async fn huge_duration_is_a_config_error() {
        let transport = Arc::new(MockTransport::replying(200, "{}"));
        let mut cfg = config(1, 1);
        cfg.duration = Duration::from_secs(u64::MAX);
        let res = batch_with_transport(cfg, transport.clone(), None).await;
        assert!(matches!(res, Err(LoadError::Config(_))));
        assert!(transport.recorded().is_empty());

        let mut cfg = config(1, 1);
        cfg.report_interval = Duration::from_secs(u64::MAX);
        let res = batch_with_transport(cfg, transport.clone(), None).await;
        assert!(matches!(res, Err(LoadError::Config(_))));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_any_request() {
        let transport = Arc::new(MockTransport::replying(200, "{}"));
        let mut cfg = config(1, 1);
        cfg.token = String::new();
        let res = batch_with_transport(cfg, transport.clone(), None).await;
        assert!(matches!(res, Err(LoadError::Config(_))));
        assert!(transport.recorded().is_empty());
    }
}
