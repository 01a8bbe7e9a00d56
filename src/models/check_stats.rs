use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pass/fail tally for one check label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckCounts {
    pub passes: u64,
    pub fails: u64,
}

impl CheckCounts {
    pub fn total(&self) -> u64 {
        self.passes + self.fails
    }

    // percentage of passes, 0 when nothing ran
    pub fn pass_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.passes as f64 / total as f64 * 100.0,
        }
    }
}

/// Check results aggregated over the run, keyed by label.
#[derive(Debug, Clone, Default)]
pub struct CheckStats {
    pub(crate) checks: BTreeMap<String, CheckCounts>,
}

impl CheckStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &str, passed: bool) {
        let counts = self.checks.entry(name.to_string()).or_default();
        if passed {
            counts.passes += 1;
        } else {
            counts.fails += 1;
        }
    }

    pub fn get(&self, name: &str) -> Option<CheckCounts> {
        self.checks.get(name).copied()
    }

    pub fn snapshot(&self) -> BTreeMap<String, CheckCounts> {
        self.checks.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_passes_and_fails_per_label() {
        let mut stats = CheckStats::new();
        stats.record("status 200", true);
        stats.record("status 200", false);
        stats.record("status 200", true);
        stats.record("sem erro", false);

        let status = stats.get("status 200").unwrap();
        assert_eq!(status, CheckCounts { passes: 2, fails: 1 });
        assert_eq!(stats.get("sem erro").unwrap().fails, 1);
        assert!(stats.get("other").is_none());
    }

    #[test]
    fn pass_rate_handles_empty() {
        assert_eq!(CheckCounts::default().pass_rate(), 0.0);
        let counts = CheckCounts { passes: 3, fails: 1 };
        assert_eq!(counts.pass_rate(), 75.0);
    }
}
