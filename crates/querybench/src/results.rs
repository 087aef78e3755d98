//! Recorded timings and failures.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::Error;

/// Elapsed time of one completed backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkResult {
    pub label: String,
    pub elapsed: Duration,
}

/// Lifecycle phase in which a backend failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Timing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => f.write_str("setup"),
            Phase::Timing => f.write_str("timing"),
        }
    }
}

/// A backend excluded from the results.
#[derive(Debug)]
pub struct BackendFailure {
    pub label: String,
    pub phase: Phase,
    pub error: Error,
}

/// Results of a harness run, owned by the caller of the runner.
///
/// Labels are unique: recording a label twice replaces the earlier duration
/// and keeps its original position.
#[derive(Debug, Default)]
pub struct BenchmarkResults {
    entries: Vec<BenchmarkResult>,
    failures: Vec<BackendFailure>,
}

impl BenchmarkResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the elapsed time for `label`.
    pub fn record(&mut self, label: impl Into<String>, elapsed: Duration) {
        let label = label.into();
        match self.entries.iter_mut().find(|e| e.label == label) {
            Some(entry) => entry.elapsed = elapsed,
            None => self.entries.push(BenchmarkResult { label, elapsed }),
        }
    }

    /// Record a failed backend.
    pub fn record_failure(&mut self, label: impl Into<String>, phase: Phase, error: Error) {
        self.failures.push(BackendFailure {
            label: label.into(),
            phase,
            error,
        });
    }

    /// Elapsed time for `label`, if it completed.
    pub fn get(&self, label: &str) -> Option<Duration> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.elapsed)
    }

    /// Completed backends in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &BenchmarkResult> {
        self.entries.iter()
    }

    /// Completed backends, fastest first. Ties keep insertion order.
    pub fn sorted(&self) -> Vec<&BenchmarkResult> {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.elapsed);
        sorted
    }

    pub fn failures(&self) -> &[BackendFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when backends ran and none of them completed.
    pub fn all_failed(&self) -> bool {
        self.entries.is_empty() && !self.failures.is_empty()
    }
}
