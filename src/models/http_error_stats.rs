use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Eq, PartialEq, Hash, Clone, Serialize, Deserialize)]
pub struct HttpErrKey {
    pub name: String,
    pub code: u16,
    pub msg: String,
    pub url: String,
    pub source: String,
}

/// Transport failures grouped by endpoint, code and message.
#[derive(Debug, Default)]
pub struct HttpErrorStats {
    pub(crate) errors: HashMap<HttpErrKey, u32>,
}

impl HttpErrorStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, name: String, url: String, code: u16, msg: String, source: String) {
        *self
            .errors
            .entry(HttpErrKey {
                name,
                code,
                msg,
                url,
                source,
            })
            .or_insert(0) += 1;
    }

    pub fn total(&self) -> u64 {
        self.errors.values().map(|&n| n as u64).sum()
    }

    /// Errors as a list, most frequent first.
    pub fn snapshot(&self) -> Vec<HttpErrorCount> {
        let mut list: Vec<HttpErrorCount> = self
            .errors
            .iter()
            .map(|(key, &count)| HttpErrorCount {
                key: key.clone(),
                count,
            })
            .collect();
        list.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.msg.cmp(&b.key.msg)));
        list
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpErrorCount {
    #[serde(flatten)]
    pub key: HttpErrKey,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bump(stats: &mut HttpErrorStats, msg: &str) {
        stats.increment(
            "consultas".into(),
            "http://localhost:8080/consultas".into(),
            0,
            msg.into(),
            "-".into(),
        );
    }

    #[test]
    fn identical_errors_are_grouped() {
        let mut stats = HttpErrorStats::new();
        bump(&mut stats, "connection refused");
        bump(&mut stats, "connection refused");
        bump(&mut stats, "timed out");
        assert_eq!(stats.total(), 3);

        let list = stats.snapshot();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].key.msg, "connection refused");
        assert_eq!(list[0].count, 2);
    }
}
