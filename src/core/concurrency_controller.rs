use crate::models::run_config::RampOption;
use std::cmp::min;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};

/// Hands out the permits that let virtual users start.
pub struct ConcurrencyController {
    semaphore: Arc<Semaphore>,
    total_permits: usize,
    ramp: Option<RampOption>,
    fractional_accumulator: Mutex<f64>,
}

impl ConcurrencyController {
    pub fn new(total_permits: usize, ramp: Option<RampOption>) -> Self {
        ConcurrencyController {
            semaphore: Arc::new(Semaphore::new(0)),
            total_permits,
            ramp,
            fractional_accumulator: Mutex::new(0.0),
        }
    }

    /// Releases every permit at once, or `increase_step` per interval
    /// when ramping. Returns once all permits are out.
    pub async fn distribute_permits(&self) {
        match &self.ramp {
            Some(ramp) => {
                let mut permits_added = 0usize;
                // a single user starts right away
                if self.total_permits == 1 {
                    self.semaphore.add_permits(1);
                    permits_added += 1;
                }
                {
                    let mut accumulator = self.fractional_accumulator.lock().await;
                    *accumulator += ramp.increase_step;
                    let initial = min(
                        accumulator.floor() as usize,
                        self.total_permits - permits_added,
                    );
                    if initial > 0 {
                        self.semaphore.add_permits(initial);
                        permits_added += initial;
                        *accumulator -= initial as f64;
                    }
                }
                tracing::debug!(permits_added, total = self.total_permits, "ramp started");
                while permits_added < self.total_permits {
                    tokio::time::sleep(Duration::from_secs(ramp.increase_interval_secs)).await;
                    let mut accumulator = self.fractional_accumulator.lock().await;
                    *accumulator += ramp.increase_step;
                    let permits_to_add = min(
                        accumulator.floor() as usize,
                        self.total_permits - permits_added,
                    );
                    if permits_to_add > 0 {
                        self.semaphore.add_permits(permits_to_add);
                        permits_added += permits_to_add;
                        *accumulator -= permits_to_add as f64;
                        tracing::debug!(permits_added, total = self.total_permits, "ramp step");
                    }
                }
            }
            None => {
                self.semaphore.add_permits(self.total_permits);
            }
        }
    }

    pub fn get_semaphore(&self) -> Arc<Semaphore> {
        self.semaphore.clone()
    }
}
