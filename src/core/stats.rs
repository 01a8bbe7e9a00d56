use crate::error::LoadError;
use crate::models::check_stats::CheckStats;
use crate::models::http_error_stats::HttpErrorStats;
use crate::models::response::IterationOutcome;
use crate::models::result::RunResult;
use histogram::Histogram;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use url::Url;

struct Latency {
    histogram: Histogram,
    max: u64,
    min: u64,
}

/// Counters shared by every virtual user of a run.
pub struct RunStats {
    name: String,
    url: String,
    iterations: AtomicU64,
    total_requests: AtomicU64,
    successful_iterations: AtomicU64,
    total_response_size: AtomicU64,
    payload_errors: AtomicU64,
    concurrent_number: AtomicUsize,
    latency: Mutex<Latency>,
    checks: Mutex<CheckStats>,
    http_errors: Mutex<HttpErrorStats>,
}

impl RunStats {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Result<Self, LoadError> {
        Ok(Self {
            name: name.into(),
            url: url.into(),
            iterations: AtomicU64::new(0),
            total_requests: AtomicU64::new(0),
            successful_iterations: AtomicU64::new(0),
            total_response_size: AtomicU64::new(0),
            payload_errors: AtomicU64::new(0),
            concurrent_number: AtomicUsize::new(0),
            latency: Mutex::new(Latency {
                histogram: Histogram::new(14, 20)?,
                max: 0,
                min: u64::MAX,
            }),
            checks: Mutex::new(CheckStats::new()),
            http_errors: Mutex::new(HttpErrorStats::new()),
        })
    }

    /// A virtual user got its permit and is running.
    pub fn vu_started(&self) {
        self.concurrent_number.fetch_add(1, Ordering::Relaxed);
    }

    pub fn virtual_users(&self) -> usize {
        self.concurrent_number.load(Ordering::SeqCst)
    }

    pub async fn record(&self, outcome: &IterationOutcome) {
        self.iterations.fetch_add(1, Ordering::Relaxed);
        if outcome.all_passed() {
            self.successful_iterations.fetch_add(1, Ordering::Relaxed);
        }
        {
            let mut checks = self.checks.lock().await;
            for check in &outcome.checks {
                checks.record(&check.name, check.passed);
            }
        }
        if !outcome.sent() {
            self.payload_errors.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        match &outcome.transport_error {
            Some(e) => {
                self.http_errors.lock().await.increment(
                    self.name.clone(),
                    self.url.clone(),
                    e.status,
                    e.message.clone(),
                    e.source_desc.clone(),
                );
            }
            None => {
                self.total_response_size
                    .fetch_add(outcome.response_bytes as u64, Ordering::Relaxed);
                let duration = outcome.latency.as_millis() as u64;
                let mut latency = self.latency.lock().await;
                latency.max = latency.max.max(duration);
                latency.min = latency.min.min(duration);
                if let Err(e) = latency.histogram.increment(duration) {
                    tracing::warn!(duration, error = ?e, "response time out of histogram range");
                }
            }
        }
    }

    pub async fn snapshot(&self, elapsed: Duration) -> RunResult {
        let total_duration = elapsed.as_secs_f64();
        let iterations = self.iterations.load(Ordering::SeqCst);
        let total_requests = self.total_requests.load(Ordering::SeqCst);
        let successful = self.successful_iterations.load(Ordering::SeqCst);
        let (success_rate, error_rate) = match iterations {
            0 => (0.0, 0.0),
            n => {
                let rate = successful as f64 / n as f64 * 100.0;
                (rate, 100.0 - rate)
            }
        };
        let (median, p95, p99, max, min) = {
            let latency = self.latency.lock().await;
            let line = |p: f64| match latency.histogram.percentile(p) {
                Ok(bucket) => *bucket.range().start(),
                Err(_) => 0,
            };
            let min = match latency.min {
                u64::MAX => 0,
                m => m,
            };
            (line(50.0), line(95.0), line(99.0), latency.max, min)
        };
        let total_data_kb = self.total_response_size.load(Ordering::SeqCst) as f64 / 1024.0;
        let per_second = |v: f64| match total_duration > 0.0 {
            true => v / total_duration,
            false => 0.0,
        };
        let (host, path) = match Url::parse(&self.url) {
            Ok(u) => (
                u.host_str().unwrap_or("-").to_string(),
                u.path().to_string(),
            ),
            Err(_) => ("-".to_string(), "-".to_string()),
        };
        let timestamp = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(n) => n.as_millis(),
            Err(_) => 0,
        };
        RunResult {
            total_duration,
            iterations,
            total_requests,
            success_rate,
            error_rate,
            checks: self.checks.lock().await.snapshot(),
            http_errors: self.http_errors.lock().await.snapshot(),
            payload_errors: self.payload_errors.load(Ordering::SeqCst),
            median_response_time: median,
            response_time_95: p95,
            response_time_99: p99,
            max_response_time: max,
            min_response_time: min,
            rps: per_second(total_requests as f64),
            total_data_kb,
            throughput_per_second_kb: per_second(total_data_kb),
            virtual_users: self.virtual_users(),
            url: self.url.clone(),
            host,
            path,
            timestamp,
        }
    }
}
