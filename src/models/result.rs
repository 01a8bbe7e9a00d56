use crate::models::check_stats::CheckCounts;
use crate::models::http_error_stats::HttpErrorCount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    // elapsed seconds
    pub total_duration: f64,
    // completed iterations
    pub iterations: u64,
    // requests that got a response or a transport error
    pub total_requests: u64,
    // iterations where every check passed, in percent
    pub success_rate: f64,
    // iterations with at least one failed check, in percent
    pub error_rate: f64,
    pub checks: BTreeMap<String, CheckCounts>,
    pub http_errors: Vec<HttpErrorCount>,
    // iterations whose body failed to render, nothing was sent
    pub payload_errors: u64,
    // response times in ms
    pub median_response_time: u64,
    pub response_time_95: u64,
    pub response_time_99: u64,
    pub max_response_time: u64,
    pub min_response_time: u64,
    pub rps: f64,
    pub total_data_kb: f64,
    pub throughput_per_second_kb: f64,
    // VUs that have started
    pub virtual_users: usize,
    pub url: String,
    pub host: String,
    pub path: String,
    // ms since the epoch
    pub timestamp: u128,
}

impl RunResult {
    /// Passes and failures summed over every check label.
    pub fn check_totals(&self) -> CheckCounts {
        self.checks
            .values()
            .fold(CheckCounts::default(), |acc, c| CheckCounts {
                passes: acc.passes + c.passes,
                fails: acc.fails + c.fails,
            })
    }
}

/// What a streaming run emits.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Periodic snapshot while users are running.
    Progress(RunResult),
    /// Final result, sent once.
    Finished(RunResult),
    /// The run could not start.
    Failed(String),
}
