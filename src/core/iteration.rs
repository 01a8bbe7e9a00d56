use crate::core::checks;
use crate::core::transport::Transport;
use crate::models::api_endpoint::ScheduleEndpoint;
use crate::models::response::IterationOutcome;
use std::time::Duration;
use tokio::time::Instant;

/// One iteration of a virtual user: build, send, check, sleep.
///
/// Never fails. A missing response shows up as failed checks plus
/// `transport_error` on the outcome.
pub async fn run_iteration<T>(
    transport: &T,
    endpoint: &ScheduleEndpoint,
    think_time: Duration,
    vu: usize,
    iteration: u64,
) -> IterationOutcome
where
    T: Transport + ?Sized,
{
    let url = endpoint.url.as_str();
    let headers = endpoint.headers();
    let outcome = match endpoint.render_body(vu, iteration) {
        Ok(body) => {
            let start = Instant::now();
            let result = transport.post_json(url, headers, body).await;
            let latency = start.elapsed();
            match result {
                Ok(response) => {
                    tracing::debug!(
                        vu,
                        iteration,
                        status = response.status,
                        latency_ms = latency.as_millis() as u64,
                        body = %response.body,
                        "response received"
                    );
                    IterationOutcome {
                        checks: checks::evaluate(&response),
                        latency,
                        response_bytes: response.size,
                        payload_error: None,
                        transport_error: None,
                    }
                }
                Err(e) => {
                    tracing::debug!(vu, iteration, error = %e, source = %e.source_desc, "request failed");
                    IterationOutcome {
                        checks: checks::all_failed(),
                        latency,
                        response_bytes: 0,
                        payload_error: None,
                        transport_error: Some(e),
                    }
                }
            }
        }
        Err(e) => {
            tracing::warn!(vu, iteration, error = %e, "could not build payload");
            IterationOutcome {
                checks: checks::all_failed(),
                latency: Duration::ZERO,
                response_bytes: 0,
                payload_error: Some(e.to_string()),
                transport_error: None,
            }
        }
    };
    // pause between requests of the same user
    tokio::time::sleep(think_time).await;
    outcome
}
