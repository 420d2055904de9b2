//! Restart layering for the local-search engine.
//!
//! The engine itself never retries: reaching the step budget surfaces as
//! `None`. Callers that want restarts layer them on top of the
//! restart-capable state machine, and this module ships the common policies.

use crate::solver::{csp::Assignment, sls::SlsSolver, stats::SlsStats, value::Value};

/// Decides whether a fresh run is worth starting after an exhausted one.
pub trait RestartPolicy {
    /// `runs_completed` counts the exhausted runs so far; `stats` accumulates
    /// over all of them.
    fn should_restart(&self, runs_completed: u64, stats: &SlsStats) -> bool;
}

/// Never restarts: one exhausted run means failure.
pub struct NoRestartPolicy;

impl RestartPolicy for NoRestartPolicy {
    fn should_restart(&self, _runs_completed: u64, _stats: &SlsStats) -> bool {
        false
    }
}

/// Restarts until a fixed number of runs have been tried.
pub struct RestartAfterNRuns {
    pub max_runs: u64,
}

impl RestartPolicy for RestartAfterNRuns {
    fn should_restart(&self, runs_completed: u64, _stats: &SlsStats) -> bool {
        runs_completed < self.max_runs
    }
}

/// Runs the local-search engine repeatedly, drawing a fresh assignment per
/// run, until it solves the problem or the policy declines another run.
pub struct RestartingSls<'a, V: Value> {
    solver: SlsSolver<'a, V>,
    policy: Box<dyn RestartPolicy>,
}

impl<'a, V: Value> RestartingSls<'a, V> {
    pub fn new(solver: SlsSolver<'a, V>, policy: Box<dyn RestartPolicy>) -> Self {
        Self { solver, policy }
    }

    pub fn run(
        &mut self,
        max_steps: u64,
        prob_best: f64,
        prob_any_conflict: f64,
    ) -> Option<Assignment<V>> {
        let mut runs_completed = 0;
        loop {
            self.solver.restart();
            if self
                .solver
                .search(max_steps, prob_best, prob_any_conflict)
                .is_some()
            {
                return Some(self.solver.assignment().clone());
            }
            runs_completed += 1;
            if !self.policy.should_restart(runs_completed, self.solver.stats()) {
                return None;
            }
        }
    }

    pub fn solver(&self) -> &SlsSolver<'a, V> {
        &self.solver
    }
}
