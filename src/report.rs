//! End-of-run output.
use crate::models::result::RunResult;
use std::fmt::Write;

const LABEL_WIDTH: usize = 32;

fn row(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let dots = LABEL_WIDTH.saturating_sub(label.len());
    let _ = writeln!(out, "     {}{}: {}", label, ".".repeat(dots), value);
}

/// Human readable summary.
pub fn render_summary(result: &RunResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n  POST {}\n", result.url);

    for (name, counts) in &result.checks {
        if counts.fails == 0 {
            let _ = writeln!(out, "     ✓ {}", name);
        } else {
            let _ = writeln!(out, "     ✗ {}", name);
            let _ = writeln!(
                out,
                "      ↳  {:.0}% ✓ {} / ✗ {}",
                counts.pass_rate(),
                counts.passes,
                counts.fails
            );
        }
    }
    out.push('\n');

    let totals = result.check_totals();
    row(
        &mut out,
        "checks",
        format!(
            "{:.2}% ✓ {} ✗ {}",
            totals.pass_rate(),
            totals.passes,
            totals.fails
        ),
    );
    row(
        &mut out,
        "data_received",
        format!(
            "{:.1} kB {:.1} kB/s",
            result.total_data_kb, result.throughput_per_second_kb
        ),
    );
    row(
        &mut out,
        "http_req_duration",
        format!(
            "min={}ms med={}ms p(95)={}ms p(99)={}ms max={}ms",
            result.min_response_time,
            result.median_response_time,
            result.response_time_95,
            result.response_time_99,
            result.max_response_time
        ),
    );
    row(
        &mut out,
        "http_reqs",
        format!("{} {:.2}/s", result.total_requests, result.rps),
    );
    let per_second = match result.total_duration > 0.0 {
        true => result.iterations as f64 / result.total_duration,
        false => 0.0,
    };
    row(
        &mut out,
        "iterations",
        format!("{} {:.2}/s", result.iterations, per_second),
    );
    row(&mut out, "vus", result.virtual_users);
    row(&mut out, "duration", format!("{:.1}s", result.total_duration));

    if result.payload_errors > 0 {
        row(&mut out, "payload_errors", result.payload_errors);
    }

    if !result.http_errors.is_empty() {
        let _ = writeln!(out, "\n     transport errors:");
        for err in &result.http_errors {
            let _ = writeln!(out, "       {} x {}", err.count, err.key.msg);
        }
    }
    out
}

/// Pretty JSON for machines.
pub fn render_json(result: &RunResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}
