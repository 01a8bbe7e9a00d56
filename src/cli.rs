//! Command line arguments and their translation into a `RunConfig`.
use crate::error::LoadError;
use crate::models::api_endpoint::PayloadSource;
use crate::models::run_config::{RampOption, RunConfig, DEFAULT_URL};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// consultas-load - hammer POST /consultas with concurrent virtual users.
#[derive(Parser, Debug, Clone)]
#[command(name = "consultas-load")]
#[command(version)]
#[command(
    about = "Load test for the appointment scheduling endpoint",
    long_about = r#"Runs a fixed number of virtual users against POST /consultas for a fixed
duration. Every response is checked for status 200 and for the absence of
"error" in its body; results are aggregated and printed at the end.

EXAMPLES:
  CONSULTAS_TOKEN=eyJ... consultas-load
  consultas-load --token eyJ... --vus 50 --duration-secs 10 --json"#
)]
pub struct Cli {
    /// Target endpoint
    #[arg(long, env = "CONSULTAS_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Bearer token sent in the Authorization header
    #[arg(long, env = "CONSULTAS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Number of concurrent virtual users
    #[arg(long, env = "CONSULTAS_VUS", default_value_t = 200)]
    pub vus: usize,

    /// Run duration in seconds
    #[arg(long, env = "CONSULTAS_DURATION_SECS", default_value_t = 30)]
    pub duration_secs: u64,

    /// Pause after each iteration, in milliseconds
    #[arg(long, env = "CONSULTAS_THINK_TIME_MS", default_value_t = 100)]
    pub think_time_ms: u64,

    /// Per-request timeout in seconds, 0 for none
    #[arg(long, env = "CONSULTAS_TIMEOUT_SECS", default_value_t = 0)]
    pub timeout_secs: u64,

    /// Virtual users released per ramp interval (fractions accumulate)
    #[arg(long, env = "CONSULTAS_RAMP_STEP", requires = "ramp_interval_secs")]
    pub ramp_step: Option<f64>,

    /// Seconds between ramp steps
    #[arg(long, env = "CONSULTAS_RAMP_INTERVAL_SECS", requires = "ramp_step")]
    pub ramp_interval_secs: Option<u64>,

    /// Handlebars template for the JSON body; sees {{vu}} and {{iteration}}
    #[arg(long, env = "CONSULTAS_PAYLOAD_TEMPLATE", value_name = "FILE")]
    pub payload_template: Option<PathBuf>,

    /// Seconds between progress lines
    #[arg(long, default_value_t = 1)]
    pub report_interval_secs: u64,

    /// Print the final result as JSON
    #[arg(long)]
    pub json: bool,

    /// Log every request
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn into_config(self) -> Result<RunConfig, LoadError> {
        let payload = match &self.payload_template {
            Some(path) => PayloadSource::Template(std::fs::read_to_string(path)?),
            None => PayloadSource::default(),
        };
        let ramp = match (self.ramp_step, self.ramp_interval_secs) {
            (Some(increase_step), Some(increase_interval_secs)) => Some(RampOption {
                increase_step,
                increase_interval_secs,
            }),
            _ => None,
        };
        let mut config = RunConfig::new(self.url, self.token);
        config.virtual_users = self.vus;
        config.duration = Duration::from_secs(self.duration_secs);
        config.think_time = Duration::from_millis(self.think_time_ms);
        config.request_timeout = match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        config.ramp = ramp;
        config.payload = payload;
        config.report_interval = Duration::from_secs(self.report_interval_secs);
        config.validate()?;
        Ok(config)
    }
}
