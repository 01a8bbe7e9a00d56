use crate::error::LoadError;
use crate::models::api_endpoint::PayloadSource;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

pub const DEFAULT_URL: &str = "http://localhost:8080/consultas";
pub const DEFAULT_VIRTUAL_USERS: usize = 200;
pub const DEFAULT_DURATION: Duration = Duration::from_secs(30);
pub const DEFAULT_THINK_TIME: Duration = Duration::from_millis(100);

/// Gradual release of virtual users.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct RampOption {
    /// VUs added per interval, fractions accumulate.
    pub increase_step: f64,
    pub increase_interval_secs: u64,
}

/// Immutable settings for one run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub url: String,
    pub token: String,
    pub virtual_users: usize,
    pub duration: Duration,
    pub think_time: Duration,
    pub request_timeout: Option<Duration>,
    pub ramp: Option<RampOption>,
    pub payload: PayloadSource,
    pub report_interval: Duration,
}

impl RunConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            virtual_users: DEFAULT_VIRTUAL_USERS,
            duration: DEFAULT_DURATION,
            think_time: DEFAULT_THINK_TIME,
            request_timeout: None,
            ramp: None,
            payload: PayloadSource::default(),
            report_interval: Duration::from_secs(1),
        }
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        let url = Url::parse(&self.url)
            .map_err(|e| LoadError::Config(format!("invalid url {:?}: {}", self.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LoadError::Config(format!(
                "unsupported url scheme: {}",
                url.scheme()
            )));
        }
        if self.token.trim().is_empty() {
            return Err(LoadError::Config("bearer token must not be empty".into()));
        }
        if self.virtual_users == 0 {
            return Err(LoadError::Config("vus must be greater than 0".into()));
        }
        if self.duration.is_zero() {
            return Err(LoadError::Config("duration must be greater than 0".into()));
        }
        if self.report_interval.is_zero() {
            return Err(LoadError::Config(
                "report interval must be greater than 0".into(),
            ));
        }
        // deadlines are instants, so both must fit on the clock
        let now = Instant::now();
        if now.checked_add(self.duration).is_none() {
            return Err(LoadError::Config(format!(
                "duration of {}s is too large",
                self.duration.as_secs()
            )));
        }
        if now.checked_add(self.report_interval).is_none() {
            return Err(LoadError::Config(format!(
                "report interval of {}s is too large",
                self.report_interval.as_secs()
            )));
        }
        if let Some(ramp) = self.ramp {
            if !(ramp.increase_step > 0.0) {
                return Err(LoadError::Config("ramp step must be greater than 0".into()));
            }
            if ramp.increase_interval_secs == 0 {
                return Err(LoadError::Config(
                    "ramp interval must be greater than 0".into(),
                ));
            }
        }
        Ok(())
    }
}
