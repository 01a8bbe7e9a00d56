use crate::models::response::{CheckResult, HttpResponse};

pub const STATUS_200: &str = "status 200";
pub const NO_ERROR: &str = "sem erro";

/// Marker whose presence in a body fails the `sem erro` check.
pub const ERROR_MARKER: &str = "error";

/// A named predicate over a response.
pub struct Check {
    pub name: &'static str,
    pub predicate: fn(&HttpResponse) -> bool,
}

fn status_is_200(response: &HttpResponse) -> bool {
    response.status == 200
}

fn body_has_no_error(response: &HttpResponse) -> bool {
    !response.body.contains(ERROR_MARKER)
}

pub const CHECKS: [Check; 2] = [
    Check {
        name: STATUS_200,
        predicate: status_is_200,
    },
    Check {
        name: NO_ERROR,
        predicate: body_has_no_error,
    },
];

/// Runs every check against the same response. No short-circuit.
pub fn evaluate(response: &HttpResponse) -> Vec<CheckResult> {
    CHECKS
        .iter()
        .map(|check| CheckResult {
            name: check.name.to_string(),
            passed: (check.predicate)(response),
        })
        .collect()
}

/// Check results for an iteration that never got a response.
pub fn all_failed() -> Vec<CheckResult> {
    CHECKS
        .iter()
        .map(|check| CheckResult {
            name: check.name.to_string(),
            passed: false,
        })
        .collect()
}
