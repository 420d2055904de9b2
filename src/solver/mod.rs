pub mod csp;
pub mod domain;
pub mod heuristics;
pub mod observer;
pub mod propagation;
pub mod queue;
pub mod search;
pub mod sls;
pub mod stats;
pub mod value;
pub mod work_list;

#[cfg(test)]
pub(crate) mod testutil;

use crate::solver::{
    csp::{Assignment, Csp},
    domain::Domains,
    propagation::{Propagation, Propagator},
    search::SplittingSolver,
    sls::SlsSolver,
    value::Value,
};

/// Prunes the problem's initial domains to an arc-consistent fixpoint.
///
/// Returns the reduced domains and whether they are consistent; `false` means
/// some domain was wiped out and the problem has no solution.
pub fn arc_consistency<V: Value>(csp: &Csp<V>) -> (Domains<V>, bool) {
    let mut propagator = Propagator::new(csp);
    let Propagation {
        domains,
        consistent,
    } = propagator.make_arc_consistent(csp.domains(), None);
    (domains, consistent)
}

/// Finds the first solution by arc consistency and domain splitting, or
/// `None` if the problem has none.
pub fn solve<V: Value>(csp: &Csp<V>) -> Option<Assignment<V>> {
    SplittingSolver::new(csp).solve().0
}

/// Attacks the problem with stochastic local search for at most `max_steps`
/// repair steps. Exhausting the budget yields `None`; unlike [`solve`], that
/// is not a proof of unsatisfiability.
pub fn sls_solve<V: Value>(
    csp: &Csp<V>,
    max_steps: u64,
    prob_best: f64,
    prob_any_conflict: f64,
) -> Option<Assignment<V>> {
    let mut solver = SlsSolver::new(csp);
    solver
        .search(max_steps, prob_best, prob_any_conflict)
        .map(|_| solver.assignment().clone())
}

/// [`sls_solve`] with a fixed seed, for reproducible runs.
pub fn sls_solve_seeded<V: Value>(
    csp: &Csp<V>,
    max_steps: u64,
    prob_best: f64,
    prob_any_conflict: f64,
    seed: u64,
) -> Option<Assignment<V>> {
    let mut solver = SlsSolver::seeded(csp, seed);
    solver
        .search(max_steps, prob_best, prob_any_conflict)
        .map(|_| solver.assignment().clone())
}
