//! Sequential benchmark runner.
//!
//! Each backend moves through
//! `NotStarted -> Setup -> Timing -> TornDown -> Recorded`, or ends in
//! `Failed` when setup or the timed loop errors. Backends run strictly one
//! after another so no two share the database at once.

use std::time::Duration;

use crate::backends::Backend;
use crate::error::Error;
use crate::results::{BenchmarkResults, Phase};
use crate::spec::QuerySpec;

/// Default number of queries issued per backend.
pub const DEFAULT_ITERATIONS: u64 = 50_000;

/// Per-backend lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    NotStarted,
    Setup,
    Timing,
    TornDown,
    Recorded,
    Failed,
}

/// Drives backends through setup, the timed loop and teardown.
#[derive(Debug)]
pub struct Runner<'a> {
    spec: &'a QuerySpec,
    iterations: u64,
    timeout: Option<Duration>,
}

impl<'a> Runner<'a> {
    pub fn new(spec: &'a QuerySpec, iterations: u64) -> Self {
        Self {
            spec,
            iterations,
            timeout: None,
        }
    }

    /// Fail a backend whose timed loop runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Run every backend in order and collect the results.
    pub async fn run_all(&self, backends: Vec<Box<dyn Backend>>) -> BenchmarkResults {
        let mut results = BenchmarkResults::new();
        for mut backend in backends {
            self.run_backend(backend.as_mut(), &mut results).await;
        }
        results
    }

    /// Run one backend, recording its elapsed time or its failure.
    pub async fn run_backend(
        &self,
        backend: &mut dyn Backend,
        results: &mut BenchmarkResults,
    ) -> BackendState {
        let label = backend.label().to_string();
        let mut state = BackendState::NotStarted;

        transition(&label, &mut state, BackendState::Setup);
        if let Err(error) = backend.setup().await {
            teardown(backend, &label).await;
            return fail(&label, &mut state, Phase::Setup, error, results);
        }

        transition(&label, &mut state, BackendState::Timing);
        let timed = match self.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, backend.run(self.spec, self.iterations)).await {
                    Ok(timed) => timed,
                    Err(_) => Err(Error::Timeout(limit)),
                }
            }
            None => backend.run(self.spec, self.iterations).await,
        };

        teardown(backend, &label).await;

        match timed {
            Ok(elapsed) => {
                transition(&label, &mut state, BackendState::TornDown);
                tracing::info!(
                    backend = %label,
                    iterations = self.iterations,
                    elapsed_secs = elapsed.as_secs_f64(),
                    "backend completed"
                );
                results.record(label.as_str(), elapsed);
                transition(&label, &mut state, BackendState::Recorded);
                state
            }
            Err(error) => fail(&label, &mut state, Phase::Timing, error, results),
        }
    }
}

fn transition(label: &str, state: &mut BackendState, next: BackendState) {
    tracing::debug!(backend = %label, from = ?*state, to = ?next, "backend state");
    *state = next;
}

fn fail(
    label: &str,
    state: &mut BackendState,
    phase: Phase,
    error: Error,
    results: &mut BenchmarkResults,
) -> BackendState {
    tracing::error!(backend = %label, %phase, error = %error, "backend failed");
    transition(label, state, BackendState::Failed);
    results.record_failure(label, phase, error);
    *state
}

/// Release a backend's resources. Errors are logged and never escalated.
async fn teardown(backend: &mut dyn Backend, label: &str) {
    if let Err(error) = backend.teardown().await {
        tracing::warn!(backend = %label, error = %error, "teardown failed");
    }
}
