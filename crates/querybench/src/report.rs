//! Result reporting.
//!
//! Text output is one `<label>: <elapsed seconds>` line per completed backend,
//! fastest first. Elapsed seconds use the shortest round-trip float form, so
//! one second prints as `1.0`. Totals under 0.1ms print in fixed point
//! (`0.00005`) instead of the float's exponent form.

use std::io::{self, Write};
use std::time::Duration;

use querybench_sql::Value;
use serde::Serialize;

use crate::results::{BenchmarkResults, Phase};
use crate::spec::QuerySpec;

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Render elapsed seconds.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 && secs < 1e-4 {
        // Nanosecond resolution, trailing zeros dropped.
        let fixed = format!("{:.9}", secs);
        return fixed.trim_end_matches('0').to_string();
    }
    format!("{:?}", secs)
}

/// Report lines, fastest first.
pub fn render_lines(results: &BenchmarkResults) -> Vec<String> {
    results
        .sorted()
        .into_iter()
        .map(|r| format!("{}: {}", r.label, format_elapsed(r.elapsed)))
        .collect()
}

/// Write the text report.
pub fn write_text<W: Write>(results: &BenchmarkResults, out: &mut W) -> io::Result<()> {
    for line in render_lines(results) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Write one line per failed backend.
pub fn write_failures<W: Write>(results: &BenchmarkResults, out: &mut W) -> io::Result<()> {
    for failure in results.failures() {
        writeln!(
            out,
            "failed: {} ({}): {}",
            failure.label, failure.phase, failure.error
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    iterations: u64,
    query: JsonQuery<'a>,
    results: Vec<JsonResult<'a>>,
    failures: Vec<JsonFailure>,
}

#[derive(Serialize)]
struct JsonQuery<'a> {
    sql: &'a str,
    params: &'a [Value],
}

#[derive(Serialize)]
struct JsonResult<'a> {
    label: &'a str,
    elapsed_secs: f64,
}

#[derive(Serialize)]
struct JsonFailure {
    label: String,
    phase: Phase,
    error: String,
}

/// Build the JSON report.
pub fn to_json(
    results: &BenchmarkResults,
    spec: &QuerySpec,
    iterations: u64,
) -> serde_json::Result<serde_json::Value> {
    let report = JsonReport {
        iterations,
        query: JsonQuery {
            sql: spec.sql(),
            params: spec.params(),
        },
        results: results
            .sorted()
            .into_iter()
            .map(|r| JsonResult {
                label: &r.label,
                elapsed_secs: r.elapsed.as_secs_f64(),
            })
            .collect(),
        failures: results
            .failures()
            .iter()
            .map(|f| JsonFailure {
                label: f.label.clone(),
                phase: f.phase,
                error: f.error.to_string(),
            })
            .collect(),
    };
    serde_json::to_value(report)
}

/// Write the JSON report.
pub fn write_json<W: Write>(
    results: &BenchmarkResults,
    spec: &QuerySpec,
    iterations: u64,
    out: &mut W,
) -> io::Result<()> {
    let report = to_json(results, spec, iterations)?;
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}
