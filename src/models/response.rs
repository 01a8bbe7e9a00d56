use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What the transport hands back for one POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    /// Bytes received. `new` counts the body only; the reqwest transport
    /// adds the response header bytes.
    pub size: usize,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let size = body.len();
        Self { status, body, size }
    }
}

/// One named check evaluated against one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
}

/// Everything an iteration reports back to the run.
#[derive(Debug, Clone)]
pub struct IterationOutcome {
    pub checks: Vec<CheckResult>,
    pub latency: Duration,
    pub response_bytes: usize,
    /// Set when the body could not be rendered and nothing was sent.
    pub payload_error: Option<String>,
    /// Set when no response was obtained.
    pub transport_error: Option<crate::error::TransportError>,
}

impl IterationOutcome {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn sent(&self) -> bool {
        self.payload_error.is_none()
    }
}
